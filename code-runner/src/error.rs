use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Toolchain missing: {0}")]
    ToolchainMissing(String),

    #[error("Failed to launch process: {0}")]
    Launch(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
