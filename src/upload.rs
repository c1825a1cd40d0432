//! Multipart file upload handling.
//!
//! Every file part in a request is validated by content sniffing against the
//! configured allow-list, optionally renamed, and written under the target
//! directory. The size budget is enforced while the body is parsed, before
//! anything reaches disk. Files are then processed in the order the parser
//! yielded them; the first failure aborts the call, and files already written
//! stay on disk (the caller decides whether to clean up).

use crate::config::UploadConfig;
use crate::constants::{RANDOM_NAME_LEN, SNIFF_LEN};
use crate::error::AppError;
use crate::random::random_string;
use crate::sniff::detect_content_type;
use axum::extract::Multipart;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Metadata for one fully stored file.
///
/// Only constructed after the file passed the allow-list check and all of its
/// bytes were written.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    /// Name the file was stored under (generated, or the original when
    /// renaming is off)
    pub new_file_name: String,
    /// Name the client submitted
    pub original_file_name: String,
    /// Bytes written to disk
    pub file_size: u64,
}

/// Upload failure carrying the files that were already written.
///
/// The handler does not roll back earlier files when a later one fails, so a
/// non-empty `saved` list means a partial upload sits on disk.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct UploadError {
    pub saved: Vec<UploadedFile>,
    #[source]
    pub source: AppError,
}

impl UploadError {
    fn new(saved: Vec<UploadedFile>, source: AppError) -> Self {
        Self { saved, source }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        self.source.into_response()
    }
}

/// Store every file part of `multipart` under `upload_dir`.
///
/// The whole body is parsed against the size budget first, so an over-budget
/// request stores zero files and never buffers past the ceiling. Validation
/// and writing then run per file in parser order.
///
/// With `rename` set (the usual choice), each file is stored under a
/// 12-character random name plus the original extension; otherwise the
/// original name is reused verbatim and a same-named existing file is
/// silently overwritten.
///
/// On failure the returned [`UploadError`] carries the records for files
/// written before the failure.
pub async fn upload_files(
    mut multipart: Multipart,
    upload_dir: impl AsRef<Path>,
    config: &UploadConfig,
    rename: bool,
) -> Result<Vec<UploadedFile>, UploadError> {
    let upload_dir = upload_dir.as_ref();
    let mut saved: Vec<UploadedFile> = Vec::new();

    ensure_dir(upload_dir)
        .await
        .map_err(|e| UploadError::new(Vec::new(), e))?;

    let parts = read_parts(&mut multipart, config.effective_max_size())
        .await
        .map_err(|e| UploadError::new(Vec::new(), e))?;

    for part in parts {
        let FilePart {
            original_file_name,
            data,
        } = part;

        // Sniff from the buffered head; the write below starts from byte 0,
        // so sniffing consumes nothing
        let detected = detect_content_type(&data[..data.len().min(SNIFF_LEN)]);
        if !config.accepts(detected) {
            tracing::info!(
                "Rejected upload {:?}: sniffed type {} not in allow-list",
                original_file_name,
                detected
            );
            return Err(UploadError::new(
                saved,
                AppError::UnsupportedFileType {
                    detected: detected.to_string(),
                },
            ));
        }

        let new_file_name = if rename {
            format!(
                "{}{}",
                random_string(RANDOM_NAME_LEN),
                file_extension(&original_file_name)
            )
        } else {
            original_file_name.clone()
        };

        let dest = upload_dir.join(&new_file_name);
        if let Err(e) = write_file(&dest, &data).await {
            return Err(UploadError::new(saved, AppError::Io(e)));
        }

        tracing::info!(
            "Stored {:?} as {:?} ({} bytes, {})",
            original_file_name,
            new_file_name,
            data.len(),
            detected
        );

        saved.push(UploadedFile {
            new_file_name,
            original_file_name,
            file_size: data.len() as u64,
        });
    }

    Ok(saved)
}

/// Store exactly one file from `multipart`; see [`upload_files`].
///
/// Fails with [`AppError::NoFileProvided`] when the request carries no file
/// part at all.
pub async fn upload_one_file(
    multipart: Multipart,
    upload_dir: impl AsRef<Path>,
    config: &UploadConfig,
    rename: bool,
) -> Result<UploadedFile, UploadError> {
    let mut files = upload_files(multipart, upload_dir, config, rename).await?;
    if files.is_empty() {
        return Err(UploadError::new(Vec::new(), AppError::NoFileProvided));
    }
    Ok(files.remove(0))
}

/// One buffered file part, not yet validated or written.
struct FilePart {
    original_file_name: String,
    data: Vec<u8>,
}

/// Drain every file part of the body, charging each chunk against `max_size`
/// as it arrives. Aborts the moment the running total would pass the budget,
/// so memory held here never exceeds the ceiling.
async fn read_parts(multipart: &mut Multipart, max_size: u64) -> Result<Vec<FilePart>, AppError> {
    let mut parts: Vec<FilePart> = Vec::new();
    let mut remaining = max_size;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                // Covers body-limit trips inside the parser as well as
                // malformed multipart encoding
                tracing::warn!("Multipart parse failed: {}", e);
                return Err(AppError::PayloadTooLarge);
            }
        };

        // Plain form fields carry no file name; only file parts are stored
        let original_file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut data: Vec<u8> = Vec::new();
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if chunk.len() as u64 > remaining {
                        return Err(AppError::PayloadTooLarge);
                    }
                    remaining -= chunk.len() as u64;
                    data.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read file part: {}", e);
                    return Err(AppError::PayloadTooLarge);
                }
            }
        }

        parts.push(FilePart {
            original_file_name,
            data,
        });
    }

    Ok(parts)
}

/// Create `path` and any missing ancestors (mode 0755 on unix). Idempotent.
pub async fn ensure_dir(path: impl AsRef<Path>) -> Result<(), AppError> {
    let path = path.as_ref();
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder.create(path).await.map_err(|e| AppError::Directory {
        path: path.display().to_string(),
        source: e,
    })
}

async fn write_file(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(dest).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

/// Extension of `name` including the leading dot, case preserved; empty when
/// the name has none
fn file_extension(name: &str) -> String {
    match Path::new(name).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}
