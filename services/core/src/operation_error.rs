use std::error::Error;

use http::StatusCode;
use serde::Serialize;

/// Trait to be implemented by errors returned by the different operations of services.
///
/// The outer transport (HTTP, RPC) is expected to turn the pair of [`OperationError::status`] and
/// the error's `Display` output into a response, see [`ErrorBody`].
pub trait OperationError: Error {
    /// HTTP status corresponding to this error.
    fn status(&self) -> StatusCode;

    /// Whether the failure originates in infrastructure rather than in the caller's input.
    fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }

    fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status().as_u16(),
            message: self.to_string(),
        }
    }
}

/// Wire shape of an operation failure.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}
