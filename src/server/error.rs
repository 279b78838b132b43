use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::foundation::error::CitizenError;

/// A [`CitizenError`] on its way out as a plain-text response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Default mapping: bad input is 400, an unknown token is 400, the rest
    /// is 500.
    pub fn from_citizen(err: CitizenError) -> Self {
        Self::with_chain_status(err, StatusCode::BAD_REQUEST)
    }

    /// Like [`Self::from_citizen`] but with a route-specific status for
    /// tokens that resolve on neither contract.
    pub fn with_chain_status(err: CitizenError, chain_status: StatusCode) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            CitizenError::Chain(_) => chain_status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CitizenError> for ApiError {
    fn from(err: CitizenError) -> Self {
        Self::from_citizen(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        } else {
            warn!(status = %self.status, message = %self.message, "request rejected");
        }
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(CitizenError::validation("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CitizenError::metadata("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CitizenError::chain("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::with_chain_status(CitizenError::chain("x"), StatusCode::NOT_FOUND).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CitizenError::fetch("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
