//! Error types for the Local Library server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

/// Main application error type.
///
/// Form validation failures are not represented here: they are recovered by
/// the controllers, which re-render the form (see [`crate::validation::Invalid`]).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error details handed to the error page boundary.
///
/// Attached as a response extension; `api::error_page` renders it with the
/// configured renderer, hiding `detail` outside development mode.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Store(_) => "Database error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        };

        let page = ErrorPage {
            status,
            message,
            detail: format!("{:?}", self),
        };

        let mut response = (status, page.message.clone()).into_response();
        response.extensions_mut().insert(page);
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
