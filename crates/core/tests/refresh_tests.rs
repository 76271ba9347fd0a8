//! Refresh controller behaviour under a paused tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;
use wallboard_core::{FetchError, FetchStatus, RefreshController};

/// Fetch function that replays a fixed list of outcomes and counts calls.
#[derive(Clone)]
struct Script {
    outcomes: Arc<Mutex<VecDeque<Result<u32, String>>>>,
    calls: Arc<AtomicUsize>,
    latency: Duration,
}

impl Script {
    fn new(outcomes: Vec<Result<u32, &str>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(
                outcomes
                    .into_iter()
                    .map(|o| o.map_err(str::to_string))
                    .collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
        }
    }

    fn with_latency(mut self, ms: u64) -> Self {
        self.latency = Duration::from_millis(ms);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn controller(&self, interval_ms: i64, enabled: bool) -> RefreshController<u32> {
        let script = self.clone();
        RefreshController::new(
            "test",
            move || {
                let script = script.clone();
                async move {
                    script.calls.fetch_add(1, Ordering::SeqCst);
                    if !script.latency.is_zero() {
                        sleep(script.latency).await;
                    }
                    let next = script.outcomes.lock().unwrap().pop_front();
                    next.unwrap_or(Err("script exhausted".into()))
                }
            },
            interval_ms,
            enabled,
        )
    }
}

async fn advance(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_new_controller_is_empty() {
    let script = Script::new(vec![]);
    let ctl = script.controller(1000, true);
    let st = ctl.state();
    assert_eq!(st.value, None);
    assert!(!st.is_loading);
    assert_eq!(st.error, None);
    assert_eq!(st.last_updated, None);
    assert_eq!(st.status(), FetchStatus::Empty);
    assert_eq!(script.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_fetches_once_before_first_interval() {
    let script = Script::new(vec![Ok(1), Ok(2)]);
    let mut ctl = script.controller(1000, true);
    ctl.start();

    advance(999).await;
    assert_eq!(script.calls(), 1);
    assert_eq!(ctl.state().value, Some(1));
    assert!(ctl.state().last_updated.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_alternating_outcomes_keep_last_good_value() {
    let script = Script::new(vec![Ok(1), Err("boom"), Ok(2)]);
    let mut ctl = script.controller(1000, true);
    ctl.start();

    advance(10).await;
    let st = ctl.state();
    assert_eq!(st.value, Some(1));
    assert_eq!(st.error, None);
    let first_update = st.last_updated;

    advance(1000).await;
    let st = ctl.state();
    assert_eq!(st.value, Some(1));
    assert_eq!(st.error.as_deref(), Some("boom"));
    assert_eq!(st.last_updated, first_update);
    assert_eq!(st.status(), FetchStatus::Stale);

    advance(1000).await;
    let st = ctl.state();
    assert_eq!(st.value, Some(2));
    assert_eq!(st.error, None);
    assert_eq!(st.status(), FetchStatus::Ready);
    assert_eq!(script.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failures_then_success_clears_error() {
    let script = Script::new(vec![Err("a"), Err("b"), Err("c"), Ok(9)]);
    let mut ctl = script.controller(0, true);
    ctl.start();
    advance(1).await;
    assert_eq!(ctl.state().status(), FetchStatus::Failed);

    for _ in 0..3 {
        assert!(ctl.refetch_now());
        advance(1).await;
    }

    let st = ctl.state();
    assert_eq!(st.value, Some(9));
    assert_eq!(st.error, None);
    assert_eq!(script.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_successes_then_failure_keeps_last_success() {
    let script = Script::new(vec![Ok(1), Ok(2), Ok(3), Err("down")]);
    let mut ctl = script.controller(0, true);
    ctl.start();
    advance(1).await;
    for _ in 0..3 {
        ctl.refetch_now();
        advance(1).await;
    }

    let st = ctl.state();
    assert_eq!(st.value, Some(3));
    assert_eq!(st.error.as_deref(), Some("down"));
}

#[tokio::test(start_paused = true)]
async fn test_double_start_keeps_single_schedule() {
    let script = Script::new(vec![Ok(1), Ok(2), Ok(3), Ok(4), Ok(5)]);
    let mut ctl = script.controller(1000, true);
    ctl.start();
    ctl.start();

    advance(2500).await;
    assert_eq!(script.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_manual_only_mode_never_ticks() {
    let script = Script::new(vec![Ok(1), Ok(2)]);
    let mut ctl = script.controller(0, true);
    ctl.start();

    advance(60_000).await;
    assert_eq!(script.calls(), 1);

    assert!(ctl.refetch_now());
    advance(1).await;
    assert_eq!(ctl.state().value, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_controller_never_fetches() {
    let script = Script::new(vec![Ok(1)]);
    let mut ctl = script.controller(1000, false);
    ctl.start();
    assert!(!ctl.refetch_now());

    advance(5000).await;
    assert_eq!(script.calls(), 0);
    assert_eq!(ctl.state().status(), FetchStatus::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_spans_the_fetch() {
    let script = Script::new(vec![Ok(1)]).with_latency(200);
    let mut ctl = script.controller(0, true);
    ctl.start();

    advance(100).await;
    let st = ctl.state();
    assert!(st.is_loading);
    assert_eq!(st.status(), FetchStatus::Loading);

    advance(200).await;
    assert!(!ctl.state().is_loading);
    assert_eq!(ctl.state().value, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_triggers_coalesce_into_in_flight_fetch() {
    let script = Script::new(vec![Ok(1), Ok(2)]).with_latency(500);
    let mut ctl = script.controller(0, true);
    ctl.start();

    advance(10).await;
    assert!(!ctl.refetch_now());
    assert!(!ctl.refetch_now());

    advance(600).await;
    assert_eq!(script.calls(), 1);
    assert_eq!(ctl.state().value, Some(1));

    assert!(ctl.refetch_now());
    advance(600).await;
    assert_eq!(script.calls(), 2);
    assert_eq!(ctl.state().value, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_during_slow_fetch_are_skipped() {
    let script = Script::new(vec![Ok(1), Ok(2), Ok(3)]).with_latency(1500);
    let mut ctl = script.controller(1000, true);
    ctl.start();

    // Tick at 1000 lands while the first fetch is outstanding.
    advance(1600).await;
    assert_eq!(script.calls(), 1);
    assert_eq!(ctl.state().value, Some(1));

    advance(500).await;
    assert_eq!(script.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_discards_in_flight_result() {
    let script = Script::new(vec![Ok(1)]).with_latency(500);
    let mut ctl = script.controller(1000, true);
    ctl.start();

    advance(100).await;
    assert!(ctl.state().is_loading);
    ctl.stop();
    assert!(!ctl.state().is_loading);

    advance(5000).await;
    let st = ctl.state();
    assert_eq!(st.value, None);
    assert_eq!(st.last_updated, None);
    assert_eq!(script.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_during_discarded_fetch_fetches_again() {
    let script = Script::new(vec![Ok(1), Ok(2)]).with_latency(500);
    let mut ctl = script.controller(0, true);
    ctl.start();

    advance(100).await;
    ctl.stop();
    ctl.start();
    assert!(ctl.state().is_loading);
    assert!(!ctl.refetch_now());

    advance(5000).await;
    let st = ctl.state();
    assert_eq!(script.calls(), 2);
    assert_eq!(st.value, Some(2));
    assert!(!st.is_loading);
    assert!(st.last_updated.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_restart_with_schedule_does_not_wait_a_period() {
    let script = Script::new(vec![Ok(1), Ok(2), Ok(3)]).with_latency(500);
    let mut ctl = script.controller(10_000, true);
    ctl.start();

    advance(100).await;
    ctl.stop();
    ctl.start();

    advance(1500).await;
    assert_eq!(script.calls(), 2);
    assert_eq!(ctl.state().value, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_stop_after_restart_drops_queued_fetch() {
    let script = Script::new(vec![Ok(1), Ok(2)]).with_latency(500);
    let mut ctl = script.controller(0, true);
    ctl.start();

    advance(100).await;
    ctl.stop();
    ctl.start();
    ctl.stop();
    assert!(!ctl.state().is_loading);

    advance(5000).await;
    let st = ctl.state();
    assert_eq!(script.calls(), 1);
    assert_eq!(st.value, None);
    assert!(!st.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_cancels_schedule() {
    let script = Script::new(vec![Ok(1), Ok(2), Ok(3)]);
    let mut ctl = script.controller(1000, true);
    ctl.start();
    advance(10).await;
    drop(ctl);

    advance(5000).await;
    assert_eq!(script.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_message_lands_in_state() {
    let mut ctl = RefreshController::<u32>::new(
        "network",
        || async {
            Err(FetchError::Status {
                status: 503,
                message: "Network monitoring not available".into(),
            })
        },
        0,
        true,
    );
    ctl.start();
    advance(1).await;

    let st = ctl.state();
    assert_eq!(st.value, None);
    assert_eq!(
        st.error.as_deref(),
        Some("Network monitoring not available (HTTP 503)")
    );
}

#[tokio::test(start_paused = true)]
async fn test_panicking_fetch_becomes_error() {
    let mut ctl = RefreshController::<u32>::new(
        "panics",
        || async {
            if true {
                panic!("adapter bug");
            }
            Ok::<u32, String>(0)
        },
        0,
        true,
    );
    ctl.start();
    advance(1).await;

    let st = ctl.state();
    assert!(!st.is_loading);
    assert!(st.error.unwrap().contains("fetch task failed"));
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_updates() {
    let script = Script::new(vec![Ok(5)]).with_latency(50);
    let mut ctl = script.controller(0, true);
    let mut rx = ctl.subscribe();
    ctl.start();

    let st = rx
        .wait_for(|st| st.value.is_some())
        .await
        .expect("controller alive")
        .clone();
    assert_eq!(st.value, Some(5));
    assert!(!st.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_interval_still_fetches_on_start() {
    let script = Script::new(vec![Ok(1)]);
    let mut ctl = script.controller(i64::MAX, true);
    ctl.start();

    advance(60_000).await;
    assert_eq!(script.calls(), 1);
    assert_eq!(ctl.state().value, Some(1));
}
