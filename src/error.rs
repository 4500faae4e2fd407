use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    /// Client-facing failure: the message is safe to return as-is.
    Msg(StatusCode, &'static str),
    /// Server-side failure: the cause is logged, only `public` reaches the client.
    Internal {
        public: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    #[must_use]
    pub const fn bad_request(msg: &'static str) -> Self {
        Self::Msg(StatusCode::BAD_REQUEST, msg)
    }

    pub fn internal(public: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            public,
            cause: cause.into(),
        }
    }
}

/* ---- Fallbacks so `?` works on framework errors ---- */

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        // Oversized bodies and malformed multipart are the client's fault.
        tracing::warn!(error = %e, "rejected multipart body");
        Self::Msg(e.status(), "Invalid multipart request")
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Msg(code, msg) => (code, Json(ErrBody { error: msg })).into_response(),
            Self::Internal { public, cause } => {
                tracing::error!("{public}: {cause:#}");
                let body = Json(ErrBody { error: public });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
