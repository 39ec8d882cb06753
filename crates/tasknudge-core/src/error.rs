use thiserror::Error;

/// Top-level error type for tasknudge.
#[derive(Debug, Error)]
pub enum NudgeError {
    /// Error from the task source (fetch, update, decode).
    #[error("task source error: {0}")]
    TaskSource(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
