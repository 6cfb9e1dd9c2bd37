use thiserror::Error;
use uuid::Uuid;

/// Error types for the recurring transaction engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A template id did not resolve where the caller required one.
    #[error("Recurring transaction template {0} not found")]
    TemplateNotFound(Uuid),
}

/// Type alias for Result with EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
