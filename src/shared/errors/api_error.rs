use super::app_error::{AppError, ErrorKind};
use thiserror::Error;

/// Error returned across the service boundary: the kind plus a message.
///
/// Internal detail (which repository, which operation) stays in the message;
/// callers branch on `kind` only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status the REST layer answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::UniqueConstraint => 409,
            ErrorKind::Unknown => 500,
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err.kind {
            ErrorKind::InvalidInput => AppError::InvalidInput(err.message),
            ErrorKind::NotFound => AppError::NotFound(err.message),
            ErrorKind::UniqueConstraint => AppError::UniqueConstraint(err.message),
            ErrorKind::Unknown => AppError::InternalError(err.message),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
