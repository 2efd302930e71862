use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One progress tick from the background operation. Transient, ordered
/// by emission time, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    Downloading {
        downloaded_bytes: u64,
        #[serde(default)]
        total_bytes: Option<u64>,
        #[serde(default)]
        filename: Option<String>,
    },
    Finished {
        #[serde(default)]
        filename: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ProgressEvent {
    /// Percentage clamped to [0, 100]. Only available when both byte
    /// counts are known; callers fall back to textual status otherwise.
    pub fn percent(&self) -> Option<u8> {
        match self {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes: Some(total),
                ..
            } if *total > 0 => Some((downloaded_bytes * 100 / total).min(100) as u8),
            ProgressEvent::Finished { .. } => Some(100),
            _ => None,
        }
    }
}

/// Metadata returned by a successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub ext: String,
    /// Output path reported by the extractor, when it names one
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Terminal result of one background operation. Exactly one is
/// produced per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationOutcome {
    Finished(MediaInfo),
    Error { message: String },
}

impl OperationOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, OperationOutcome::Error { .. })
    }
}
