use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseEngineError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Term is not positive, or expiration does not follow commencement.
    #[error("Invalid lease term: {0}")]
    InvalidTerm(String),

    /// No usable rate for the lease-term bucket. Recoverable: the caller is
    /// expected to ask for a manual rate instead of proceeding with zero.
    #[error("No discount rate resolved for bucket {bucket}: {reason}")]
    RateNotResolved { bucket: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LeaseEngineError {
    /// True when the caller can recover by supplying a rate manually.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LeaseEngineError::RateNotResolved { .. })
    }
}

impl From<serde_json::Error> for LeaseEngineError {
    fn from(e: serde_json::Error) -> Self {
        LeaseEngineError::SerializationError(e.to_string())
    }
}
