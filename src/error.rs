use thiserror::Error;

/// Errors that can end (or prevent) an acquisition session.
#[derive(Error, Debug)]
pub enum DaqError {
    /// Rejected before any thread is spawned.
    #[error("invalid config: {0}")]
    Config(String),

    /// Device read failed; the session transitions to Failed.
    #[error("hardware read failed: {0}")]
    Hardware(String),

    /// Output file could not be created or appended to.
    #[error("file write failed: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl DaqError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn hardware(msg: impl Into<String>) -> Self {
        Self::Hardware(msg.into())
    }
}
