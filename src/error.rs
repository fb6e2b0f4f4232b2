//! Error types for the puzzle bot.

/// Top-level error type for puzzle resolution, delivery, and scheduling.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Used-puzzle ledger read/append error.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Image download error.
    #[error("image error: {0}")]
    Image(String),

    /// Schedule definition error (malformed time of day).
    #[error("schedule error: {0}")]
    Schedule(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BotError>;
