use std::{
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{
        self,
        MissedTickBehavior,
    },
};
use tracing::debug;

use crate::{
    api::GameService,
    error::FetchError,
    types::DashboardState,
};


/// Cadence used when the caller does not override the interval. Matches the
/// dashboard's 5-second refresh.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Injected fetch operation the poller drives. `address` is the identity the
/// state should be scoped to, when one is connected.
pub trait StateFetcher {
    type State;

    fn fetch_state(
        &self,
        address: Option<&str>,
    ) -> impl Future<Output = Result<Self::State, FetchError>> + Send;
}

/// Subscriber for poll deliveries. A failed poll is reported once via
/// `on_error` and never clears previously delivered state.
pub trait UpdateSink<S> {
    fn on_update(&self, state: S);
    fn on_error(&self, err: FetchError);
}

enum PollCommand {
    Refetch(Option<String>),
    Shutdown,
}

/// Repeating fetch loop against the remote state source.
///
/// One worker task per started poller. Fetches are awaited inline and missed
/// ticks are skipped, so at most one request is ever in flight. `stop` marks
/// the poller inert before signalling the worker: an in-flight fetch that
/// resolves afterwards is discarded, not delivered.
pub struct StatePoller<F, U>
where
    F: StateFetcher,
{
    fetcher: Arc<F>,
    sink: Arc<U>,
    interval: Duration,
    address: Option<String>,
    active: Arc<AtomicBool>,
    cmd_tx: Option<mpsc::UnboundedSender<PollCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl<F, U> StatePoller<F, U>
where
    F: StateFetcher + Send + Sync + 'static,
    F::State: Send + 'static,
    U: UpdateSink<F::State> + Send + Sync + 'static,
{
    pub fn new(fetcher: F, sink: U, interval: Duration) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(sink),
            interval,
            address: None,
            active: Arc::new(AtomicBool::new(false)),
            cmd_tx: None,
            handle: None,
        }
    }

    /// Address the fetches are scoped to before the poller starts. Once
    /// running, use [`StatePoller::set_address`].
    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    /// Spawns the poll worker. The first fetch fires immediately. Calling
    /// start on a running poller is a no-op.
    pub fn start(&mut self) {
        if self.cmd_tx.is_some() {
            return;
        }
        // Fresh flag per start so a worker from a previous run that is still
        // winding down cannot observe the restart.
        let active = Arc::new(AtomicBool::new(true));
        self.active = active.clone();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        self.cmd_tx = Some(cmd_tx);
        self.handle = Some(tokio::spawn(poll_worker(
            self.fetcher.clone(),
            self.sink.clone(),
            self.interval,
            self.address.clone(),
            active,
            cmd_rx,
        )));
    }

    /// Stops the loop. After this returns no further fetch is issued and no
    /// delivery reaches the sink, including from a fetch already in flight.
    /// Calling stop on a stopped poller is a no-op.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(cmd_tx) = self.cmd_tx.take() {
            let _ = cmd_tx.send(PollCommand::Shutdown);
        }
        self.handle.take();
    }

    /// Changes the identity the fetches are scoped to. When running, the
    /// worker refetches immediately and the regular cadence restarts from
    /// that point. Setting the current address again is a no-op.
    pub fn set_address(&mut self, address: Option<String>) {
        if self.address == address {
            return;
        }
        self.address = address.clone();
        if let Some(cmd_tx) = &self.cmd_tx {
            let _ = cmd_tx.send(PollCommand::Refetch(address));
        }
    }

    pub fn is_running(&self) -> bool {
        self.cmd_tx.is_some()
    }
}

impl<F, U> Drop for StatePoller<F, U>
where
    F: StateFetcher,
{
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(cmd_tx) = self.cmd_tx.take() {
            let _ = cmd_tx.send(PollCommand::Shutdown);
        }
    }
}

async fn poll_worker<F, U>(
    fetcher: Arc<F>,
    sink: Arc<U>,
    interval: Duration,
    mut address: Option<String>,
    active: Arc<AtomicBool>,
    mut cmd_rx: mpsc::UnboundedReceiver<PollCommand>,
) where
    F: StateFetcher,
    U: UpdateSink<F::State>,
{
    let mut ticker = time::interval(interval);
    // Ticks that come due while a fetch is outstanding are dropped, not
    // queued, so a slow remote never builds a request backlog.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !poll_once(&*fetcher, &*sink, address.as_deref(), &active).await {
                    break;
                }
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(PollCommand::Refetch(next)) => {
                    address = next;
                    let alive = poll_once(&*fetcher, &*sink, address.as_deref(), &active).await;
                    // The out-of-band fetch restarts the interval phase
                    // instead of double-firing on the old schedule.
                    ticker.reset();
                    if !alive {
                        break;
                    }
                }
                Some(PollCommand::Shutdown) | None => break,
            }
        }
    }
}

/// Runs one fetch and delivers the result. Returns false once the poller has
/// been stopped, in which case any fetched state is discarded.
async fn poll_once<F, U>(
    fetcher: &F,
    sink: &U,
    address: Option<&str>,
    active: &AtomicBool,
) -> bool
where
    F: StateFetcher,
    U: UpdateSink<F::State>,
{
    if !active.load(Ordering::SeqCst) {
        return false;
    }
    let fetched = fetcher.fetch_state(address).await;
    // A stop that raced the fetch wins: drop the result on the floor.
    if !active.load(Ordering::SeqCst) {
        return false;
    }
    match fetched {
        Ok(state) => sink.on_update(state),
        Err(err) => {
            debug!(%err, "state poll failed; retrying on next tick");
            sink.on_error(err);
        }
    }
    true
}

/// Production fetcher: bundles the shared pool state with the connected
/// address's wager history, loading both concurrently the way the dashboard
/// does.
pub struct DashboardFetcher<S> {
    service: S,
}

impl<S> DashboardFetcher<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S> StateFetcher for DashboardFetcher<S>
where
    S: GameService,
{
    type State = DashboardState;

    async fn fetch_state(&self, address: Option<&str>) -> Result<DashboardState, FetchError> {
        match address {
            Some(address) => {
                let (jackpot, history) = tokio::try_join!(
                    self.service.jackpot_state(),
                    self.service.coinflip_history(address),
                )?;
                Ok(DashboardState { jackpot, history })
            }
            None => {
                let jackpot = self.service.jackpot_state().await?;
                Ok(DashboardState {
                    jackpot,
                    history: Vec::new(),
                })
            }
        }
    }
}
