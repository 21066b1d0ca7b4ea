use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Active,
    Drawing,
    Completed,
}

/// One resolved (or pending) coinflip wager as recorded by the game service.
/// The service returns histories newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinflipOutcome {
    pub player_address: String,
    pub bet_amount: f64,
    pub choice: CoinSide,
    #[serde(default)]
    pub result: Option<CoinSide>,
    pub won: bool,
    /// Amount returned to the player. Present only on wins; a missing value
    /// on a winning record counts as zero.
    #[serde(default)]
    pub payout: Option<f64>,
    #[serde(default)]
    pub tx_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: WagerStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JackpotEntry {
    pub player_address: String,
    pub ticket_count: u32,
    pub total_deposit: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JackpotState {
    pub current_pot: f64,
    pub total_players: u32,
    pub total_tickets: u32,
    pub entries: Vec<JackpotEntry>,
    pub next_draw_at: DateTime<Utc>,
    pub status: PoolStatus,
}

impl JackpotState {
    /// Seconds remaining until the scheduled draw, clamped at zero once the
    /// draw time has passed.
    pub fn seconds_until_draw(&self, now: DateTime<Utc>) -> i64 {
        (self.next_draw_at - now).num_seconds().max(0)
    }
}

/// Bundle delivered on every successful poll: the shared pool state plus the
/// connected address's wager history (empty when no wallet is connected).
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardState {
    pub jackpot: JackpotState,
    pub history: Vec<CoinflipOutcome>,
}
