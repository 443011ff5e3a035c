use crate::edit::ValidationError;
use crate::record::AssetId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}
