use model::entities::admission::AdmissionStatus;
use thiserror::Error;

/// Error types for the admission workflow
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// The admission id does not resolve to a record. No writes happened.
    #[error("Admission {0} not found")]
    NotFound(i32),

    /// The admission was already approved or rejected. Approving twice
    /// would provision a duplicate account, so the guard fails instead.
    #[error("Admission already processed (status: {0:?})")]
    AlreadyProcessed(AdmissionStatus),

    /// The generated username lost a race against a concurrent approval.
    /// The transaction was rolled back; the caller may retry.
    #[error("Username '{0}' was taken by a concurrent approval")]
    Conflict(String),

    /// A required deployment setting is missing. Fails before any write.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from password hashing
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Type alias for Result with AdmissionError
pub type Result<T> = std::result::Result<T, AdmissionError>;
