use std::fmt;

use serde::{
    Deserialize,
    Serialize,
    de::DeserializeOwned,
};

use crate::{
    error::FetchError,
    types::{
        CoinSide,
        CoinflipOutcome,
        JackpotState,
    },
};

/// Seam between the core and the remote game service. Everything the
/// controller and the poller need is expressed here so both can be exercised
/// against fakes.
pub trait GameService: Send + Sync {
    fn jackpot_state(&self) -> impl Future<Output = Result<JackpotState, FetchError>> + Send;

    fn join_jackpot(
        &self,
        address: &str,
        ticket_count: u32,
    ) -> impl Future<Output = Result<JackpotState, FetchError>> + Send;

    fn create_coinflip(
        &self,
        address: &str,
        bet_amount: f64,
        choice: CoinSide,
    ) -> impl Future<Output = Result<CoinflipOutcome, FetchError>> + Send;

    fn coinflip_history(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Vec<CoinflipOutcome>, FetchError>> + Send;
}

/// HTTP client for the game backend. Every endpoint wraps its payload in a
/// success/data/error envelope; anything other than `success: true` with a
/// payload is a [`FetchError`], never a panic.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { base_url, http })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        Self::decode_envelope(url, res).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        Self::decode_envelope(url, res).await
    }

    async fn decode_envelope<T: DeserializeOwned>(
        url: String,
        res: reqwest::Response,
    ) -> Result<T, FetchError> {
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(FetchError::Status { status, body });
        }
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|source| FetchError::Decode { url, source })?;
        envelope.into_payload()
    }
}

impl GameService for ApiClient {
    async fn jackpot_state(&self) -> Result<JackpotState, FetchError> {
        self.get("/games/jackpot/state").await
    }

    async fn join_jackpot(
        &self,
        address: &str,
        ticket_count: u32,
    ) -> Result<JackpotState, FetchError> {
        self.post(
            "/games/jackpot/join",
            &JoinJackpotRequest {
                player_address: address,
                ticket_count,
            },
        )
        .await
    }

    async fn create_coinflip(
        &self,
        address: &str,
        bet_amount: f64,
        choice: CoinSide,
    ) -> Result<CoinflipOutcome, FetchError> {
        self.post(
            "/games/coinflip/create",
            &CreateCoinflipRequest {
                player_address: address,
                bet_amount,
                choice,
            },
        )
        .await
    }

    async fn coinflip_history(&self, address: &str) -> Result<Vec<CoinflipOutcome>, FetchError> {
        self.get(&format!("/games/coinflip/history/{address}")).await
    }
}

impl fmt::Display for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_payload(self) -> Result<T, FetchError> {
        if !self.success {
            let message = self
                .error
                .unwrap_or_else(|| "unspecified service error".to_string());
            return Err(FetchError::Rejected(message));
        }
        self.data.ok_or(FetchError::MissingPayload)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinJackpotRequest<'a> {
    player_address: &'a str,
    ticket_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCoinflipRequest<'a> {
    player_address: &'a str,
    bet_amount: f64,
    choice: CoinSide,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FetchError,
        types::{
            PoolStatus,
            WagerStatus,
        },
    };

    fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, FetchError> {
        let envelope: Envelope<T> = serde_json::from_str(raw).unwrap();
        envelope.into_payload()
    }

    #[test]
    fn into_payload__success_with_data__returns_payload() {
        let value: u32 = parse(r#"{"success":true,"data":7}"#).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn into_payload__failure_envelope__reports_service_error() {
        let err = parse::<u32>(r#"{"success":false,"error":"pool is drawing"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Rejected(message) if message == "pool is drawing"));
    }

    #[test]
    fn into_payload__failure_without_message__uses_default() {
        let err = parse::<u32>(r#"{"success":false}"#).unwrap_err();
        assert!(matches!(err, FetchError::Rejected(_)));
    }

    #[test]
    fn into_payload__success_without_data__is_missing_payload() {
        let err = parse::<u32>(r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingPayload));
    }

    #[test]
    fn envelope__coinflip_outcome__decodes_camel_case_payload() {
        let raw = r#"{
            "success": true,
            "data": {
                "playerAddress": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
                "betAmount": 0.25,
                "choice": "heads",
                "result": "tails",
                "won": false,
                "txSignature": "5KtP3qartTZZ",
                "createdAt": "2024-05-01T12:00:00.000Z",
                "status": "completed"
            }
        }"#;

        let outcome: CoinflipOutcome = parse(raw).unwrap();

        assert_eq!(outcome.bet_amount, 0.25);
        assert_eq!(outcome.choice, CoinSide::Heads);
        assert_eq!(outcome.result, Some(CoinSide::Tails));
        assert!(!outcome.won);
        assert_eq!(outcome.payout, None);
        assert_eq!(outcome.status, WagerStatus::Completed);
    }

    #[test]
    fn envelope__jackpot_state__decodes_camel_case_payload() {
        let raw = r#"{
            "success": true,
            "data": {
                "currentPot": 42.5,
                "totalPlayers": 3,
                "totalTickets": 17,
                "entries": [
                    {"playerAddress": "abc", "ticketCount": 10, "totalDeposit": 1.0},
                    {"playerAddress": "def", "ticketCount": 7, "totalDeposit": 0.7}
                ],
                "nextDrawAt": "2024-05-01T12:30:00.000Z",
                "status": "active"
            }
        }"#;

        let state: JackpotState = parse(raw).unwrap();

        assert_eq!(state.current_pot, 42.5);
        assert_eq!(state.total_tickets, 17);
        assert_eq!(state.entries.len(), 2);
        assert_eq!(state.status, PoolStatus::Active);
    }
}
