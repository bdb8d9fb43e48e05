use thiserror::Error;

/// Error types for the store module
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;
