use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use formscout::{ExtractError, UserAction};
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// Every failure carries a suggested next step for the user, so clients can
/// fall back to manual entry.
pub enum AppError {
    /// Errors originating from an extraction.
    Extract(ExtractError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Extract(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

fn status_for(err: &ExtractError) -> StatusCode {
    match err {
        ExtractError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        ExtractError::FormNotPublic { .. } => StatusCode::FORBIDDEN,
        ExtractError::AllProxiesExhausted { .. } => StatusCode::BAD_GATEWAY,
        ExtractError::ExtractionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ExtractError::MissingFetcher | ExtractError::ClientBuild(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message, action) = match self {
            AppError::Extract(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    warn!("ExtractError: {:?}", err);
                }
                (status, err.to_string(), err.user_action())
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                    UserAction::RetryOrEnterManually,
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "action": action,
        }));

        (status_code, body).into_response()
    }
}
