use thiserror::Error;

/// Top-level error type for Mr. Weather.
#[derive(Debug, Error)]
pub enum MrWeatherError {
    /// Lookup of a row that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reminder index outside `0..count`.
    #[error("index {index} out of range (count: {count})")]
    OutOfRange { index: i64, count: i64 },

    /// Insert of a primary key that is already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Storage error (statement, connection, or migration failure).
    #[error("store error: {0}")]
    Store(String),

    /// Error from a data provider (weather, text, image).
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a delivery channel.
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
