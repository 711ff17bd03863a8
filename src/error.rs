use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Translation not found: {0}")]
    NotFound(i32),

    #[error("Translation {0} is already finalized")]
    AlreadyFinalized(i32),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GatewayError> for ServerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownModel(_) | GatewayError::MissingApiKey => {
                ServerError::Configuration(err.to_string())
            }
            GatewayError::Upstream(message) => ServerError::Upstream(message),
            GatewayError::Network(e) => ServerError::Upstream(e.to_string()),
            GatewayError::MalformedResponse(_) => ServerError::Upstream(err.to_string()),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::AlreadyFinalized(_) => StatusCode::CONFLICT,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Configuration(_) => StatusCode::BAD_REQUEST,
            ServerError::Upstream(_) => StatusCode::BAD_REQUEST,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller. Storage failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Database(_) | ServerError::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServerError::NotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::AlreadyFinalized(1).status(), StatusCode::CONFLICT);
        assert_eq!(
            ServerError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Upstream("quota".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Database(DbErr::Custom("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_details_are_not_exposed() {
        let err = ServerError::Database(DbErr::Custom("no such table: translations".into()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ServerError::Upstream("Rate limit exceeded".into());
        assert_eq!(err.public_message(), "Rate limit exceeded");
    }

    #[test]
    fn test_gateway_error_conversion() {
        let err: ServerError = GatewayError::UnknownModel("gpt-x".into()).into();
        assert!(matches!(err, ServerError::Configuration(_)));
        assert!(err.to_string().contains("gpt-x"));

        let err: ServerError = GatewayError::Upstream("No credits".into()).into();
        assert_eq!(err.public_message(), "No credits");
    }
}
