//! # Media Relay
//!
//! Runs a long-lived media extraction on a background task while the
//! foreground polls for progress. Progress events travel over an
//! unbounded FIFO channel, the single terminal outcome over a oneshot
//! channel; the consumer drains both non-blockingly and never hangs on
//! a crashed worker. Includes the yt-dlp invocation plans and the
//! fallback resolution of the downloaded artifact on disk.

mod error;
mod fetch;
mod relay;
mod resolve;
mod types;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use fetch::{probe_title, DownloadPlan, FormatChoice, YtDlpJob};
pub use relay::{poll_to_completion, spawn_relay, ExtractionJob, ProgressSink, Relay, RelayHandle};
pub use resolve::{resolve_artifact, resolve_output, sanitize_title};
pub use types::{MediaInfo, OperationOutcome, ProgressEvent};

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, Error>;
