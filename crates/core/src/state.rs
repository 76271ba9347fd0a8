use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of one data source as seen by the renderer.
///
/// `value` is only ever replaced by a successful fetch. A failed fetch touches
/// `error` and `is_loading` and nothing else, so stale data stays on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    /// Last successfully fetched payload.
    pub value: Option<T>,
    /// True while a fetch is outstanding.
    pub is_loading: bool,
    /// Message from the most recent failed attempt, cleared on success.
    pub error: Option<String>,
    /// Time of the most recent successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
            error: None,
            last_updated: None,
        }
    }
}

/// Display classification of a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing fetched yet and nothing in progress.
    Empty,
    /// A fetch is outstanding and the last attempt did not fail.
    Loading,
    /// A value is present and the last attempt succeeded.
    Ready,
    /// The last attempt failed but an older value is still shown.
    Stale,
    /// The last attempt failed and there is no value to fall back to.
    Failed,
}

impl<T> FetchState<T> {
    /// Classifies this snapshot for display.
    pub fn status(&self) -> FetchStatus {
        match (&self.value, &self.error) {
            (Some(_), Some(_)) => FetchStatus::Stale,
            (None, Some(_)) => FetchStatus::Failed,
            _ if self.is_loading => FetchStatus::Loading,
            (Some(_), None) => FetchStatus::Ready,
            (None, None) => FetchStatus::Empty,
        }
    }

    /// Records the start of a fetch cycle.
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
    }

    /// Applies a successful fetch result.
    pub(crate) fn succeed(&mut self, value: T, at: DateTime<Utc>) {
        self.value = Some(value);
        self.error = None;
        self.last_updated = Some(at);
        self.is_loading = false;
    }

    /// Applies a failed fetch, keeping `value` and `last_updated`.
    pub(crate) fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
    }
}
