use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("An operation is already in flight")]
    Busy,

    #[error("No operation in flight")]
    NotStarted,

    #[error("Tool not found on PATH: {0}")]
    ToolMissing(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
