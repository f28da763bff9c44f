use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors raised while enforcing plan limits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid plan overrides: {0}")]
    InvalidOverrides(String),

    #[error("Seat limit reached: {0}")]
    SeatLimitReached(String),

    #[error("Agent limit reached: {0}")]
    AgentLimitReached(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Feature not included: {0}")]
    FeatureNotIncluded(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for failed requests.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl LimitsError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidOverrides(_) => StatusCode::BAD_REQUEST,
            Self::SeatLimitReached(_) | Self::AgentLimitReached(_) | Self::FeatureNotIncluded(_) => {
                StatusCode::FORBIDDEN
            }
            Self::QuotaExceeded(_) => StatusCode::PAYMENT_REQUIRED,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a plan denial rather than a failure.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::SeatLimitReached(_)
                | Self::AgentLimitReached(_)
                | Self::QuotaExceeded(_)
                | Self::FeatureNotIncluded(_)
                | Self::RateLimited(_)
        )
    }

    /// Message safe to show to clients.
    ///
    /// Denial reasons are meant for end users and pass through unchanged.
    /// Internal details stay in the server log.
    fn safe_message(&self) -> String {
        match self {
            Self::SeatLimitReached(reason)
            | Self::AgentLimitReached(reason)
            | Self::QuotaExceeded(reason)
            | Self::FeatureNotIncluded(reason)
            | Self::RateLimited(reason) => reason.clone(),
            Self::NotFound(_) | Self::InvalidOverrides(_) => self.to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for LimitsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for limit checks
pub type Result<T> = std::result::Result<T, LimitsError>;

impl From<serde_json::Error> for LimitsError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            LimitsError::InvalidOverrides(err.to_string())
        } else {
            LimitsError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}
