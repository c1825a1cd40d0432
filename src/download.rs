use crate::constants::SNIFF_LEN;
use crate::error::{AppError, Result};
use crate::sniff::detect_content_type;
use axum::{
    body::Bytes,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use std::path::Path;
use tokio::fs;

/// Build a download response for a file on disk, forcing the browser to save
/// it as `display_name` instead of rendering it inline.
///
/// The Content-Type comes from sniffing the file itself, never from the
/// display name. A missing file maps to [`AppError::NotFound`]; other read
/// failures propagate as IO errors.
pub async fn download_static_file(
    path: impl AsRef<Path>,
    display_name: &str,
) -> Result<Response> {
    let path = path.as_ref();
    let data = fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound
        } else {
            AppError::Io(e)
        }
    })?;

    let content_type = detect_content_type(&data[..data.len().min(SNIFF_LEN)]);

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_type.parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = format!("attachment; filename=\"{}\"", display_name).parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    tracing::debug!(
        "Serving {:?} as attachment {:?} ({} bytes)",
        path,
        display_name,
        data.len()
    );

    Ok((headers, Bytes::from(data)).into_response())
}
