use http::StatusCode;
use service_core::operation_error::OperationError;
use thiserror::Error;

use crate::account::StoreError;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User Already exists")]
    Conflict,

    #[error("User Not Found")]
    NotFound,

    #[error("Password does not match")]
    BadRequest,

    /// Store failures are passed through as they are.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OperationError for AccountError {
    fn status(&self) -> StatusCode {
        match self {
            // Kept at 404 for compatibility with existing clients, although 409 would describe it.
            Self::Conflict => StatusCode::NOT_FOUND,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
