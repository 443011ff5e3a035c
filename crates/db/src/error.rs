#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Saved progress could not be read back and has been discarded.
    #[error("Saved progress is corrupt and was cleared: {0}")]
    Corrupt(String),
}
