use std::{
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use casino_client::{
    api::ApiClient,
    controller::DashboardController,
    error::FetchError,
    poll::{
        DEFAULT_POLL_INTERVAL,
        DashboardFetcher,
        StatePoller,
        UpdateSink,
    },
    types::DashboardState,
    wallet::{
        StaticWallet,
        WalletSession,
    },
};
use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(version, about = "Dashboard client for the jackpot and coinflip games", long_about = None)]
struct Args {
    /// Base URL of the game service API
    #[arg(long, default_value = "http://localhost:8080/api")]
    api_url: Url,

    /// Player address used to scope wager history; omit to watch the shared
    /// pool only
    #[arg(long)]
    address: Option<String>,

    /// Poll cadence in seconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    interval_secs: u64,
}

/// Applies each poll delivery to the shared controller and logs what a
/// display layer would render.
struct LoggingSink {
    controller: Arc<Mutex<DashboardController<ApiClient, StaticWallet>>>,
}

impl UpdateSink<DashboardState> for LoggingSink {
    fn on_update(&self, state: DashboardState) {
        let Ok(mut controller) = self.controller.lock() else {
            return;
        };
        controller.apply_update(state);
        if let Some(pool) = controller.jackpot() {
            tracing::info!(
                pot = pool.current_pot,
                players = pool.total_players,
                tickets = pool.total_tickets,
                draw_in_secs = pool.seconds_until_draw(Utc::now()),
                "jackpot pool"
            );
        }
        let summary = controller.session_summary();
        tracing::info!(
            total_games = summary.total_games,
            wins = summary.wins,
            losses = summary.losses,
            win_rate = summary.win_rate_percent,
            best_streak = summary.best_streak,
            net_profit = summary.net_profit,
            "session summary"
        );
    }

    fn on_error(&self, err: FetchError) {
        tracing::warn!(%err, "poll failed; keeping last known state");
    }
}

async fn handle_interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => tracing::info!("received interrupt, shutting down"),
        Err(_) => tracing::warn!("interrupt handler failed, shutting down anyway"),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = Args::parse();

    let client =
        ApiClient::new(args.api_url.as_str()).wrap_err("building game service client")?;
    let wallet = match &args.address {
        Some(address) => StaticWallet::connected(address.clone()),
        None => StaticWallet::disconnected(),
    };
    if !wallet.is_connected() {
        tracing::info!("no wallet address supplied; watching shared pool state only");
    }

    let controller = Arc::new(Mutex::new(DashboardController::new(
        client.clone(),
        wallet,
    )));
    let sink = LoggingSink { controller };

    let mut poller = StatePoller::new(
        DashboardFetcher::new(client),
        sink,
        Duration::from_secs(args.interval_secs),
    )
    .with_address(args.address.clone());

    tracing::info!(
        api = %args.api_url,
        interval_secs = args.interval_secs,
        "starting dashboard poll loop"
    );
    poller.start();

    handle_interrupt().await;
    poller.stop();
    Ok(())
}
