use crate::types::CoinflipOutcome;

/// Derived view of a wager history. Recomputed from scratch on every history
/// change and never cached across mutations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub total_games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate_percent: f64,
    pub total_won: f64,
    pub total_lost: f64,
    pub net_profit: f64,
    pub best_streak: usize,
}

/// Folds a wager history (newest first, as served by the remote source) into
/// a [`SessionSummary`].
///
/// The streak fold walks the slice in reverse index order so it scans true
/// chronological order and finds the longest run of consecutive wins anywhere
/// in the session, not just the most recent run.
pub fn summarize(history: &[CoinflipOutcome]) -> SessionSummary {
    let total_games = history.len();
    let wins = history.iter().filter(|game| game.won).count();
    let losses = total_games - wins;
    let total_won: f64 = history
        .iter()
        .filter(|game| game.won)
        .map(|game| game.payout.unwrap_or(0.0))
        .sum();
    let total_lost: f64 = history
        .iter()
        .filter(|game| !game.won)
        .map(|game| game.bet_amount)
        .sum();
    let win_rate_percent = if total_games == 0 {
        0.0
    } else {
        (wins as f64 / total_games as f64) * 100.0
    };

    let mut best_streak = 0usize;
    let mut current = 0usize;
    for game in history.iter().rev() {
        if game.won {
            current += 1;
            best_streak = best_streak.max(current);
        } else {
            current = 0;
        }
    }

    SessionSummary {
        total_games,
        wins,
        losses,
        win_rate_percent,
        total_won,
        total_lost,
        net_profit: total_won - total_lost,
        best_streak,
    }
}
