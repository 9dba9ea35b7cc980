use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::storage::StoreError;
use crate::users::dto::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Login '{0}' is already taken")]
    DuplicateLogin(String),
    #[error("User {0} not found")]
    NotFound(i64),
    #[error("Storage unavailable")]
    StorageUnavailable(#[source] sqlx::Error),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateLogin(login) => Self::DuplicateLogin(login),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::InvalidData(reason) => Self::Validation(reason),
            StoreError::Backend(source) => Self::StorageUnavailable(source),
        }
    }
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateLogin(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        if let Self::StorageUnavailable(source) = &self {
            error!(error = %source, "storage failure");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
