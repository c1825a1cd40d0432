use crate::json::JsonResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not create directory {path}: {source}")]
    Directory {
        path: String,
        source: std::io::Error,
    },

    #[error("the uploaded file is too big")]
    PayloadTooLarge,

    #[error("unsupported file type: {detected}")]
    UnsupportedFileType { detected: String },

    #[error("no file provided in request")]
    NoFileProvided,

    #[error("file not found")]
    NotFound,

    #[error("body contains badly-formed JSON (at line {line}, column {column})")]
    MalformedJson { line: usize, column: usize },

    #[error("body contains badly-formed JSON: unexpected end of input")]
    TruncatedJson,

    #[error("body contains an incorrect JSON type{}", field_suffix(.field, .line, .column))]
    TypeMismatch {
        field: Option<String>,
        line: usize,
        column: usize,
    },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("body contains unknown key \"{field}\"")]
    UnknownField { field: String },

    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Not produced by this crate's own decoder; Rust's typed API cannot hand
    /// it an invalid destination. Route layers that decode reflectively can
    /// still report through the shared taxonomy.
    #[error("invalid decode target")]
    InvalidTarget,

    #[error("body must only contain a single JSON value")]
    MultipleJsonValues,

    #[error("error decoding JSON: {0}")]
    Decode(String),

    #[error("empty string not permitted")]
    EmptySlugInput,

    #[error("slug is zero length after removing characters")]
    UnusableSlugInput,

    #[error("remote call failed: {0}")]
    Remote(#[from] reqwest::Error),
}

fn field_suffix(field: &Option<String>, line: &usize, column: &usize) -> String {
    match field {
        Some(f) => format!(" for field \"{}\"", f),
        None => format!(" (at line {}, column {})", line, column),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Directory { path, source } => {
                tracing::error!("Failed to create directory {}: {}", path, source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Remote(e) => {
                tracing::error!("Remote call failed: {}", e);
                StatusCode::BAD_GATEWAY
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge | AppError::BodyTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => StatusCode::BAD_REQUEST,
        };

        // Never leak IO or upstream detail to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Storage error".to_string()
        } else if status == StatusCode::BAD_GATEWAY {
            "Remote call failed".to_string()
        } else {
            self.to_string()
        };

        (status, Json(JsonResponse::failure(message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
