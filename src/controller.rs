use std::ops::RangeInclusive;

use crate::{
    api::GameService,
    error::{
        SubmitError,
        ValidationError,
    },
    stats::{
        SessionSummary,
        summarize,
    },
    types::{
        CoinSide,
        CoinflipOutcome,
        DashboardState,
        JackpotState,
    },
    wallet::WalletSession,
};


/// Tickets purchasable in a single jackpot join.
pub const TICKET_COUNT_RANGE: RangeInclusive<u32> = 1..=100;

/// Everything the display layer reads. Replaced wholesale on each poll
/// delivery; a failed poll never touches it, so the last good state stays on
/// screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub jackpot: Option<JackpotState>,
    pub history: Vec<CoinflipOutcome>,
}

/// Composing caller that owns the view state, validates mutating actions
/// locally before any network call, and folds the history into display
/// metrics on demand.
pub struct DashboardController<S, W> {
    service: S,
    wallet: W,
    state: ViewState,
}

impl<S, W> DashboardController<S, W>
where
    S: GameService,
    W: WalletSession,
{
    pub fn new(service: S, wallet: W) -> Self {
        Self {
            service,
            wallet,
            state: ViewState::default(),
        }
    }

    pub fn jackpot(&self) -> Option<&JackpotState> {
        self.state.jackpot.as_ref()
    }

    /// Wager history, newest first, as last delivered or submitted.
    pub fn history(&self) -> &[CoinflipOutcome] {
        &self.state.history
    }

    pub fn session_summary(&self) -> SessionSummary {
        summarize(&self.state.history)
    }

    /// Applies a poll delivery, replacing pool state and history atomically.
    pub fn apply_update(&mut self, update: DashboardState) {
        self.state.jackpot = Some(update.jackpot);
        self.state.history = update.history;
    }

    /// Buys tickets into the jackpot pool. Rejected locally when no wallet is
    /// connected or the ticket count is out of range; on success the cached
    /// pool state is replaced with the service's updated one.
    pub async fn join_jackpot(&mut self, ticket_count: u32) -> Result<JackpotState, SubmitError> {
        let address = self.require_wallet()?;
        validate_ticket_count(ticket_count)?;
        let updated = self.service.join_jackpot(&address, ticket_count).await?;
        self.state.jackpot = Some(updated.clone());
        Ok(updated)
    }

    /// Places a coinflip wager. Rejected locally when no wallet is connected
    /// or the amount is not a positive finite number. No optimistic update:
    /// the resolved outcome is prepended to the history only once the service
    /// confirms it.
    pub async fn place_coinflip(
        &mut self,
        bet_amount: f64,
        choice: CoinSide,
    ) -> Result<CoinflipOutcome, SubmitError> {
        let address = self.require_wallet()?;
        validate_bet_amount(bet_amount)?;
        let outcome = self
            .service
            .create_coinflip(&address, bet_amount, choice)
            .await?;
        self.state.history.insert(0, outcome.clone());
        Ok(outcome)
    }

    fn require_wallet(&self) -> Result<String, ValidationError> {
        self.wallet
            .current_address()
            .ok_or(ValidationError::NotConnected)
    }
}

fn validate_ticket_count(ticket_count: u32) -> Result<(), ValidationError> {
    if TICKET_COUNT_RANGE.contains(&ticket_count) {
        Ok(())
    } else {
        Err(ValidationError::TicketCountOutOfRange(ticket_count))
    }
}

fn validate_bet_amount(bet_amount: f64) -> Result<(), ValidationError> {
    if bet_amount.is_finite() && bet_amount > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidBetAmount(bet_amount))
    }
}
