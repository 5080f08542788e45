use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Why a statement against the data store did not complete.
#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error(transparent)]
    Database(#[from] libsql::Error),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("subscription {0} not found")]
    NotFound(Uuid),
    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreFailure,
    },
}

pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

impl SubscriptionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SubscriptionError::Validation(message.into())
    }

    pub fn store(operation: &'static str, source: impl Into<StoreFailure>) -> Self {
        SubscriptionError::Store {
            operation,
            source: source.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubscriptionError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SubscriptionError::NotFound(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SubscriptionError::Validation(_) => "validation_error",
            SubscriptionError::NotFound(_) => "not_found",
            SubscriptionError::Store { .. } => "store_error",
        }
    }
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_per_kind() {
        assert_eq!(
            SubscriptionError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SubscriptionError::NotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SubscriptionError::store("list", StoreFailure::TimedOut(Duration::from_secs(1)))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_carries_context() {
        let err = SubscriptionError::store(
            "get_summary",
            StoreFailure::TimedOut(Duration::from_millis(250)),
        );
        assert_eq!(err.to_string(), "get_summary failed: timed out after 250ms");

        let id = Uuid::new_v4();
        assert_eq!(
            SubscriptionError::NotFound(id).to_string(),
            format!("subscription {id} not found")
        );
    }

    #[test]
    fn into_response_uses_status_code() {
        let response = SubscriptionError::validation("invalid user_id").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = SubscriptionError::NotFound(Uuid::nil()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
