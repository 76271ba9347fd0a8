#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and refresh machinery for the wallboard dashboard.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod refresh;
pub mod rotation;
pub mod state;

mod util;

pub use error::FetchError;
pub use refresh::RefreshController;
pub use rotation::{RotationSequencer, RotationState};
pub use state::{FetchState, FetchStatus};
pub use util::{now_ms, now_utc};
