pub mod identity;
pub mod validation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Access denied: {0}")]
    AccessError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
