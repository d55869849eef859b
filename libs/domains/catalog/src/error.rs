use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: i32,
        requested: i64,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Only storage failures may succeed on a later attempt; every other
    /// variant is determined by the persisted state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Internal(_))
    }
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        CatalogError::Internal(format!("Database error: {}", err))
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(err: validator::ValidationErrors) -> Self {
        CatalogError::InvalidArgument(err.to_string())
    }
}
