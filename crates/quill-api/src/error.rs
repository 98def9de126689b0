use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::error;

/// Request-level failure taxonomy.
///
/// `Validation` and `Auth` are recovered by the originating handler, which
/// re-renders its form with the message. Everything that reaches
/// `IntoResponse` here terminates the request directly.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad form input: empty field, taken username.
    #[error("{0}")]
    Validation(String),
    /// Bad credentials at login.
    #[error("{0}")]
    Auth(String),
    /// No session where one is required. Recovered by redirecting to login.
    #[error("authentication required")]
    AuthRequired,
    /// Authenticated, but not the post's author.
    #[error("forbidden")]
    Forbidden,
    #[error("no such post")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) | AppError::Auth(msg) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::AuthRequired => Redirect::to("/auth/login").into_response(),
            AppError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Internal(e) => {
                error!("internal error: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Run a blocking database closure off the async runtime.
pub async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "blocking task join error: {e}"
        ))),
    }
}
