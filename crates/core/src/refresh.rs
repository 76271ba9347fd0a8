//! Periodic refresh with stale-data fallback.
//!
//! A [`RefreshController`] owns one data source. It fetches once on
//! [`RefreshController::start`], again on every interval tick, and on demand
//! through [`RefreshController::refetch_now`]. At most one fetch is in flight
//! per controller; triggers that land while one is outstanding are coalesced
//! into it. A restart while a stopped cycle is still running queues a fresh
//! fetch behind it.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::state::FetchState;
use crate::util::{now_ms, now_utc, timer_period};

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send + 'static>>;
type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// Fetch-cycle bookkeeping. Triggers, completions and `stop()` all go
/// through one lock so they observe a single order.
#[derive(Debug, Default)]
struct Cycle {
    /// Bumped by `stop()` and drop; results from older generations are discarded.
    generation: u64,
    /// Generation of the outstanding fetch.
    running: Option<u64>,
    /// A trigger landed while a discarded fetch was still outstanding.
    rerun: bool,
}

struct Shared<T> {
    name: String,
    fetch: FetchFn<T>,
    state: watch::Sender<FetchState<T>>,
    cycle: Mutex<Cycle>,
}

impl<T> Shared<T> {
    fn cycle(&self) -> MutexGuard<'_, Cycle> {
        self.cycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Invalidates the current generation so outstanding and queued fetches
    /// never land.
    fn retire(&self) {
        let mut cycle = self.cycle();
        cycle.generation += 1;
        cycle.rerun = false;
        if cycle.running.is_some() {
            self.state.send_if_modified(|st| std::mem::replace(&mut st.is_loading, false));
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Shared<T> {
    /// Starts a fetch cycle unless one is already outstanding. With
    /// `expected` set, the trigger only fires under that generation.
    fn trigger(self: &Arc<Self>, expected: Option<u64>) -> bool {
        let mut cycle = self.cycle();
        if expected.is_some_and(|g| g != cycle.generation) {
            tracing::trace!(source = %self.name, "tick from a stopped schedule ignored");
            return false;
        }

        match cycle.running {
            Some(running) if running == cycle.generation || cycle.rerun => {
                tracing::trace!(source = %self.name, "fetch already in flight; coalesced");
                false
            }
            Some(_) => {
                // Picked up by the discarded cycle when it returns.
                cycle.rerun = true;
                self.state.send_modify(FetchState::begin);
                true
            }
            None => {
                let generation = cycle.generation;
                cycle.running = Some(generation);
                self.state.send_modify(FetchState::begin);
                self.spawn_cycle(generation);
                true
            }
        }
    }

    fn spawn_cycle(self: &Arc<Self>, generation: u64) {
        let shared = Arc::clone(self);
        tokio::spawn(async move { shared.run_cycle(generation).await });
    }

    async fn run_cycle(self: Arc<Self>, generation: u64) {
        let started_ms = now_ms();
        tracing::debug!(source = %self.name, "fetch started");

        // The fetch runs in its own task so a panicking adapter becomes an error.
        let outcome = match tokio::spawn((self.fetch)()).await {
            Ok(res) => res,
            Err(e) => Err(format!("fetch task failed: {e}")),
        };
        let elapsed_ms = now_ms() - started_ms;

        let mut cycle = self.cycle();
        if cycle.generation != generation {
            if cycle.rerun {
                cycle.rerun = false;
                let current = cycle.generation;
                cycle.running = Some(current);
                tracing::debug!(source = %self.name, "stale fetch result discarded; fetching again");
                self.spawn_cycle(current);
            } else {
                cycle.running = None;
                tracing::debug!(source = %self.name, "controller stopped; discarding fetch result");
                self.state
                    .send_if_modified(|st| std::mem::replace(&mut st.is_loading, false));
            }
            return;
        }

        cycle.running = None;
        match outcome {
            Ok(value) => {
                tracing::debug!(source = %self.name, elapsed_ms, "fetch succeeded");
                let at = now_utc();
                self.state.send_modify(move |st| st.succeed(value, at));
            }
            Err(message) => {
                tracing::warn!(source = %self.name, elapsed_ms, error = %message, "fetch failed");
                self.state.send_modify(move |st| st.fail(message));
            }
        }
    }
}

/// Owns a single data source's [`FetchState`] and its refresh schedule.
pub struct RefreshController<T> {
    shared: Arc<Shared<T>>,
    interval_ms: i64,
    enabled: bool,
    started: bool,
    timer: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> RefreshController<T> {
    /// Creates a stopped controller.
    ///
    /// `fetch` is the provider adapter. `interval_ms <= 0` disables the
    /// recurring schedule; the controller then only fetches on `start()` and
    /// `refetch_now()`. A disabled controller never fetches.
    pub fn new<F, Fut, E>(name: impl Into<String>, fetch: F, interval_ms: i64, enabled: bool) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + 'static,
    {
        let fetch: FetchFn<T> = Arc::new(move || -> FetchFuture<T> {
            let fut = fetch();
            Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
        });
        let (state, _) = watch::channel(FetchState::default());

        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                fetch,
                state,
                cycle: Mutex::new(Cycle::default()),
            }),
            interval_ms,
            enabled,
            started: false,
            timer: None,
        }
    }

    /// Name used in log events.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Whether the controller was constructed enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `start()` has been called without a matching `stop()`.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Fetches immediately, then every interval. No-op when disabled or
    /// already started.
    pub fn start(&mut self) {
        if !self.enabled || self.started {
            return;
        }
        self.started = true;
        tracing::info!(source = %self.shared.name, interval_ms = self.interval_ms, "refresh started");

        self.shared.trigger(None);

        if let Some(period) = timer_period(self.interval_ms) {
            let generation = self.shared.cycle().generation;
            let shared = Arc::clone(&self.shared);
            self.timer = Some(tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    shared.trigger(Some(generation));
                }
            }));
        }
    }

    /// Cancels the schedule. A fetch already in flight is left to finish but
    /// its result is dropped.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.shared.retire();
        tracing::info!(source = %self.shared.name, "refresh stopped");
    }

    /// Fetches now without touching the schedule. Returns `false` when the
    /// request was coalesced into an outstanding fetch or the controller is
    /// disabled.
    pub fn refetch_now(&self) -> bool {
        if !self.enabled {
            return false;
        }
        self.shared.trigger(None)
    }

    /// Current snapshot.
    pub fn state(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }
}

impl<T> Drop for RefreshController<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.shared.retire();
    }
}
