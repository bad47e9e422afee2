// src/check/client.rs
use super::api::CheckApi;
use super::callbacks::CheckCallbacks;
use super::error::CheckError;
use super::types::{AdResult, CheckRequest, CheckResponse, CheckStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    Idle,
    Started,
    Completed,
    Errored,
}

/// Runs one campaign check at a time against the dashboard: start, poll the
/// status endpoint until a terminal state, and report through callbacks.
pub struct CheckClient {
    api: Arc<dyn CheckApi>,
    request: CheckRequest,
    callbacks: Arc<CheckCallbacks>,
    poll_interval: Duration,
    state: Arc<Mutex<ClientState>>,
}

struct ClientState {
    phase: CheckPhase,
    check_id: Option<String>,
    poller: Option<Poller>,
    /// Bumped by every `start` and `stop`; responses tagged with an older
    /// generation belong to a cancelled check and are dropped.
    generation: u64,
}

struct Poller {
    shutdown_tx: watch::Sender<bool>,
    _task: JoinHandle<()>,
}

impl Poller {
    fn cancel(self) {
        let _ = self.shutdown_tx.send(true);
    }
}

enum Outcome {
    Success(Vec<AdResult>),
    Failure(CheckError),
}

impl CheckClient {
    pub fn new(api: Arc<dyn CheckApi>, request: CheckRequest, callbacks: CheckCallbacks) -> Self {
        Self {
            api,
            request,
            callbacks: Arc::new(callbacks),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: Arc::new(Mutex::new(ClientState {
                phase: CheckPhase::Idle,
                check_id: None,
                poller: None,
                generation: 0,
            })),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn request(&self) -> &CheckRequest {
        &self.request
    }

    pub fn phase(&self) -> CheckPhase {
        lock(&self.state).phase
    }

    pub fn check_id(&self) -> Option<String> {
        lock(&self.state).check_id.clone()
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.state).poller.is_some()
    }

    /// Begin a check. Returns once the start request has been answered;
    /// when the server runs the check asynchronously, polling continues in
    /// the background and the outcome arrives through the callbacks.
    ///
    /// A check already in progress on this client is cancelled first and
    /// finishes with `on_error(Cancelled)` then `on_complete`.
    pub async fn start(&self) {
        let (generation, superseded) = {
            let mut state = lock(&self.state);
            let superseded = cancel_active(&mut state);
            state.phase = CheckPhase::Started;
            (state.generation, superseded)
        };
        if superseded {
            report_cancelled(&self.callbacks);
        }

        self.callbacks.started();
        info!(
            "Starting check for campaign {} ({})",
            self.request.campaign_id, self.request.period
        );

        let response = self.api.start_check(&self.request).await;

        match response {
            Ok(CheckResponse {
                status: CheckStatus::Started,
                check_id: Some(check_id),
                ..
            }) if !check_id.is_empty() => self.begin_polling(generation, check_id),
            Ok(CheckResponse {
                status: CheckStatus::Completed,
                results: Some(results),
                ..
            }) => {
                finish(
                    &self.state,
                    &self.callbacks,
                    generation,
                    Outcome::Success(results),
                );
            }
            Ok(response) => {
                let error = match response.error {
                    Some(message) => CheckError::Rejected(message),
                    None => CheckError::Protocol(format!(
                        "unknown error starting check (status {:?})",
                        response.status
                    )),
                };
                finish(&self.state, &self.callbacks, generation, Outcome::Failure(error));
            }
            Err(error) => {
                finish(&self.state, &self.callbacks, generation, Outcome::Failure(error));
            }
        }
    }

    /// Cancel the active check, if any. A cancelled check finishes with
    /// `on_error(Cancelled)` then `on_complete`; later responses for it are
    /// ignored. Calling this with nothing running does nothing.
    pub fn stop(&self) {
        let cancelled = {
            let mut state = lock(&self.state);
            let cancelled = cancel_active(&mut state);
            if cancelled {
                state.phase = CheckPhase::Idle;
            }
            cancelled
        };
        if cancelled {
            report_cancelled(&self.callbacks);
        }
    }

    fn begin_polling(&self, generation: u64, check_id: String) {
        let mut state = lock(&self.state);
        if state.generation != generation {
            debug!("Discarding start response for superseded check {}", check_id);
            return;
        }

        info!("Check {} started, polling every {:?}", check_id, self.poll_interval);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            self.api.clone(),
            self.state.clone(),
            self.callbacks.clone(),
            self.poll_interval,
            generation,
            check_id.clone(),
            shutdown_rx,
        ));

        state.check_id = Some(check_id);
        state.poller = Some(Poller {
            shutdown_tx,
            _task: task,
        });
    }
}

impl Drop for CheckClient {
    fn drop(&mut self) {
        if let Some(poller) = lock(&self.state).poller.take() {
            poller.cancel();
        }
    }
}

async fn poll_loop(
    api: Arc<dyn CheckApi>,
    state: Arc<Mutex<ClientState>>,
    callbacks: Arc<CheckCallbacks>,
    poll_interval: Duration,
    generation: u64,
    check_id: String,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_after(poll_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_rx.changed() => break,
        }
        if *shutdown_rx.borrow() {
            break;
        }

        let outcome = match api.check_status(&check_id).await {
            Ok(response) => match response.status {
                CheckStatus::Completed => match response.results {
                    Some(results) => Outcome::Success(results),
                    None => Outcome::Failure(CheckError::Protocol(
                        "completed check carried no results".to_string(),
                    )),
                },
                CheckStatus::Error => Outcome::Failure(CheckError::Rejected(
                    response
                        .error
                        .unwrap_or_else(|| "check failed on the server".to_string()),
                )),
                other => {
                    debug!("Check {} still pending ({:?})", check_id, other);
                    continue;
                }
            },
            Err(error) => Outcome::Failure(error),
        };

        finish(&state, &callbacks, generation, outcome);
        break;
    }
}

/// Move a live check to its terminal state and fire its callbacks. The
/// poller is released before any callback runs.
fn finish(
    state: &Mutex<ClientState>,
    callbacks: &CheckCallbacks,
    generation: u64,
    outcome: Outcome,
) {
    {
        let mut state = lock(state);
        if state.generation != generation {
            debug!("Discarding outcome of superseded check");
            return;
        }
        if let Some(poller) = state.poller.take() {
            poller.cancel();
        }
        state.check_id = None;
        state.phase = match outcome {
            Outcome::Success(_) => CheckPhase::Completed,
            Outcome::Failure(_) => CheckPhase::Errored,
        };
    }

    match outcome {
        Outcome::Success(results) => {
            info!("Check completed with {} results", results.len());
            callbacks.succeeded(&results);
        }
        Outcome::Failure(error) => {
            error!("Campaign check failed: {}", error);
            callbacks.failed(&error);
        }
    }
    callbacks.completed();
}

/// Invalidate the current check and release its poller. Returns whether a
/// check was still running and so still owes its terminal callbacks.
fn cancel_active(state: &mut ClientState) -> bool {
    state.generation += 1;
    if let Some(poller) = state.poller.take() {
        debug!("Polling stopped for check {:?}", state.check_id);
        poller.cancel();
    }
    state.check_id = None;
    state.phase == CheckPhase::Started
}

fn report_cancelled(callbacks: &CheckCallbacks) {
    info!("Campaign check cancelled");
    callbacks.failed(&CheckError::Cancelled);
    callbacks.completed();
}

/// An interval whose first tick lands one period from now, like a browser
/// `setInterval`.
fn interval_after(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn lock(state: &Mutex<ClientState>) -> MutexGuard<'_, ClientState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
