use pav_codec::CodecError;
use pav_core::edit::ValidationError;
use pav_core::error::CoreError;
use pav_core::record::AssetId;
use pav_db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("An import is already in progress")]
    ImportInProgress,

    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Retryable: the previous records stay loaded.
    #[error("Failed to read or parse the file. Please ensure it is a valid .xlsx or .csv file.")]
    Decode(#[source] CodecError),

    /// Saving or loading progress failed; in-memory state is unaffected.
    #[error("Failed to save or load progress: {0}")]
    Persistence(#[from] StoreError),

    #[error("Failed to write export: {0}")]
    Export(#[source] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<CoreError> for SessionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(id) => Self::NotFound(id),
            CoreError::Validation(e) => Self::Validation(e),
        }
    }
}
