use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    InvalidScore(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported database url: {0}")]
    UnsupportedUrl(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether this error was caused by bad caller input rather than the store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidScore(_) | Self::InvalidInput(_))
    }
}
