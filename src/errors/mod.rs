//! # Error Handling
//!
//! Error types for the vanish secret service, defined with `thiserror`.
//! The taxonomy separates caller mistakes (`Validation`), terminal misses
//! (`NotFound`, `Exhausted`), retryable backend faults (`Store`), and
//! cipher failures (`Encryption`).

/// Custom result type for vanish operations
pub type Result<T> = std::result::Result<T, VanishError>;

/// Main error type for the vanish secret service
#[derive(thiserror::Error, Debug)]
pub enum VanishError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed create input, surfaced before any store interaction
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Unknown capability token; a miss, not an exceptional condition
    #[error("Secret not found: {id}")]
    NotFound { id: String },

    /// View budget spent or record expired; terminal, never retried
    #[error("Secret expired or no remaining views: {id}")]
    Exhausted { id: String },

    /// Transport or backend fault talking to the secret store
    #[error("Secret store unavailable: {context}")]
    Store {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Key derivation or cipher failure
    #[error("Encryption error: {context}")]
    Encryption { context: String },
}

impl VanishError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an exhausted error
    pub fn exhausted<S: Into<String>>(id: S) -> Self {
        Self::Exhausted { id: id.into() }
    }

    /// Create a store error without an underlying source
    pub fn store<S: Into<String>>(context: S) -> Self {
        Self::Store { context: context.into(), source: None }
    }

    /// Create a store error wrapping a backend failure
    pub fn store_with_source<S: Into<String>>(
        context: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Store { context: context.into(), source: Some(source) }
    }

    /// Create an encryption error
    pub fn encryption<S: Into<String>>(context: S) -> Self {
        Self::Encryption { context: context.into() }
    }

    /// Check if this error should be retried by the caller.
    ///
    /// Only backend faults are retryable; exhaustion and validation
    /// failures are definitive.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VanishError::Store { .. })
    }
}

impl From<sqlx::Error> for VanishError {
    fn from(error: sqlx::Error) -> Self {
        Self::Store {
            context: "database operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<validator::ValidationErrors> for VanishError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(message)
    }
}
