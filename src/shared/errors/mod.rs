mod api_error;
mod app_error;

pub use api_error::{ServiceError, ServiceResult};
pub use app_error::{AppError, AppResult, ErrorKind, ResultExt};
