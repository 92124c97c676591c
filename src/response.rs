//! The envelope every media route answers with.
use crate::error::{Error, Result};

use serde::Serialize;

/// Discriminated result of a route.
///
/// Errors never cross the route boundary: a failure becomes
/// `{"success": false, "message": "..."}` with a status code derived from the
/// error's [`kind`](crate::error::Error::kind).
///
/// ```rust
/// use media_transfer::ApiResponse;
///
/// let resp = ApiResponse::ok("uploaded", 42);
/// let json = serde_json::to_value(&resp).unwrap();
///
/// assert_eq!(json["success"], true);
/// assert_eq!(json["data"], 42);
/// assert_eq!(resp.status_code(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the route succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Payload of a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    status: u16,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn ok<M: Into<String>>(message: M, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: 200,
        }
    }

    /// A failed response describing `error`.
    pub fn from_error(error: &Error) -> Self {
        let kind = error.kind();
        // Internals of server-side failures stay in the logs.
        let message = if kind.is_client_error() {
            error.to_string()
        } else {
            format!("{kind} error")
        };
        Self {
            success: false,
            message,
            data: None,
            status: kind.status_code(),
        }
    }

    /// Build the response from the outcome of a route.
    pub fn from_result<M: Into<String>>(message: M, result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(message, data),
            Err(e) => {
                if e.kind().is_client_error() {
                    debug!(error = %e, kind = %e.kind(), "request rejected");
                } else {
                    warn!(error = %e, kind = %e.kind(), "request failed");
                }
                Self::from_error(&e)
            }
        }
    }

    /// HTTP status code the route should answer with.
    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Whether the route succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Serialize the response body as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from_dyn)
    }
}

impl<T> From<Result<T>> for ApiResponse<T> {
    fn from(value: Result<T>) -> Self {
        Self::from_result("ok", value)
    }
}
