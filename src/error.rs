use reqwest::StatusCode;
use thiserror::Error;

/// Locally detectable bad input. Raised before any network call and never
/// sent to the remote service.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("no wallet is connected")]
    NotConnected,
    #[error("bet amount must be a positive number, got {0}")]
    InvalidBetAmount(f64),
    #[error("ticket count {0} is outside the allowed range 1..=100")]
    TicketCountOutOfRange(u32),
}

/// A read from the remote service failed. Absorbed by the poll loop and
/// retried on the next scheduled tick; last-good state is preserved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("service responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("service reported failure: {0}")]
    Rejected(String),
    #[error("service response was missing its payload")]
    MissingPayload,
    #[error("invalid payload from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A mutating call (jackpot join, coinflip wager) failed. Surfaced once per
/// attempt to the caller of that action; the poll loop is unaffected.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] FetchError),
}
