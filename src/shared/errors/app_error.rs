use std::fmt;
use thiserror::Error;

/// The four error kinds that cross the service boundary.
///
/// Everything the core raises is classified into one of these; the REST layer
/// maps them onto HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    UniqueConstraint,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotFound => "not found",
            ErrorKind::UniqueConstraint => "unique constraint",
            ErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unique constraint violated: {0}")]
    UniqueConstraint(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("Broker error: {0}")]
    BrokerError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// An error annotated with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Classify this error for callers outside the core.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::UniqueConstraint(_) => ErrorKind::UniqueConstraint,
            AppError::Operation { source, .. } => source.kind(),
            _ => ErrorKind::Unknown,
        }
    }

    /// Prefix the error with the name of the operation it came from.
    pub fn within(self, operation: impl Into<String>) -> Self {
        AppError::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every operation wrapper removed.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self.root(), AppError::CircuitOpen)
    }
}

/// Adds operation context to a fallible result.
pub trait ResultExt<T> {
    fn within(self, operation: &str) -> AppResult<T>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn within(self, operation: &str) -> AppResult<T> {
        self.map_err(|e| AppError::within(e.into(), operation))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout("Request timeout".to_string())
        } else if err.is_connect() {
            AppError::ExternalServiceError("Failed to connect to source site".to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                404 => AppError::ExternalServiceError(format!("Source page not found: {}", err)),
                _ => AppError::ExternalServiceError(format!("HTTP {}: {}", status, err)),
            }
        } else {
            AppError::ExternalServiceError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for AppError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        AppError::InternalError(format!("Scheduler error: {}", err))
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
