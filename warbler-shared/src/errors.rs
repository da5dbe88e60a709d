use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Application-level error for route handlers.
///
/// This is a server-rendered app: anything that reaches this type renders as a
/// plain error page. Expected conditions (bad credentials, duplicate username,
/// missing session) are handled at the route boundary and never become an
/// `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_page("Not found", msg)),
            AppError::Database(DieselError::NotFound) => (
                StatusCode::NOT_FOUND,
                error_page("Not found", "The requested resource does not exist."),
            ),
            AppError::Validation(msg) => {
                tracing::debug!(error = %msg, "request rejected by validation");
                (StatusCode::BAD_REQUEST, error_page("Invalid request", msg))
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_page("Something went wrong", "An internal error occurred."),
                )
            }
        };

        (status, Html(body)).into_response()
    }
}

fn error_page(title: &str, detail: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Home</a></p></body></html>"
    )
}

/// True when a diesel error is a unique-constraint violation, e.g. a duplicate
/// username or email at signup. Routes translate this into in-page feedback.
pub fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

pub type AppResult<T> = Result<T, AppError>;
