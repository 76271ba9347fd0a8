use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Returns current unix epoch milliseconds.
pub fn now_ms() -> i64 {
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    dur.as_millis() as i64
}

/// Returns the current wall-clock time in UTC.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Longest timer period; larger intervals would overflow the tokio clock.
const MAX_PERIOD: Duration = Duration::from_secs(365 * 86_400);

/// Timer period for `interval_ms`, `None` when the schedule is manual-only.
pub(crate) fn timer_period(interval_ms: i64) -> Option<Duration> {
    (interval_ms > 0).then(|| Duration::from_millis(interval_ms as u64).min(MAX_PERIOD))
}
