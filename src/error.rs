//! Error types for the expense ledger

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why the normalizer refused a classification response.
///
/// Every variant is local and non-fatal: the ledger is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Incomplete record: missing `{0}`")]
    IncompleteRecord(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl Rejection {
    /// Stable machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MalformedResponse(_) => "MalformedResponse",
            Rejection::IncompleteRecord(_) => "IncompleteRecord",
            Rejection::InvalidAmount(_) => "InvalidAmount",
            Rejection::UnknownCategory(_) => "UnknownCategory",
            Rejection::UnknownTransactionType(_) => "UnknownTransactionType",
            Rejection::InvalidDate(_) => "InvalidDate",
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Record rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Classification service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Classification service error: {0}")]
    ServiceError(String),

    #[error("An extraction is already in progress")]
    Busy,

    #[error("Completion for submission {0} arrived after it was settled")]
    StaleSubmission(uuid::Uuid),

    #[error("Utterance is empty")]
    EmptyUtterance,

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LedgerError {
    /// True for failures that originate from the external classification call
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::ServiceUnavailable(_)
                | LedgerError::ServiceError(_)
                | LedgerError::HttpError(_)
        )
    }
}
