use thiserror::Error;

use crate::store::StoreError;
use crate::uploads::UploadError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<models::ModelError> for ServiceError {
    fn from(e: models::ModelError) -> Self {
        match e {
            models::ModelError::Validation(msg) => Self::Validation(msg),
        }
    }
}
