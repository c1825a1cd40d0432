//! boxkit: small helpers for HTTP-facing services built on axum.
//!
//! Each module is an independent utility; there is no shared pipeline or
//! state between them:
//!
//! - [`upload`] — multipart file uploads with content-sniffed validation,
//!   optional renaming, and partial-failure reporting
//! - [`json`] — JSON body decoding with structured error translation, the
//!   response envelope, and JSON push to a remote endpoint
//! - [`random`] — cryptographically seeded random name generation
//! - [`slug`] — URL-safe slug generation
//! - [`download`] — static file download response shaping
//! - [`sniff`] — MIME detection from leading bytes
//!
//! Configuration lives in [`config`]; size ceilings default to 1 GiB for
//! uploads and 1 MiB for JSON bodies when left unset.

pub mod config;
pub mod constants;
pub mod download;
pub mod error;
pub mod json;
pub mod random;
pub mod slug;
pub mod sniff;
pub mod upload;

pub use config::{DecodeConfig, UploadConfig};
pub use download::download_static_file;
pub use error::{AppError, Result};
pub use json::{error_json, push_json, read_json, write_json, JsonResponse};
pub use random::random_string;
pub use slug::slugify;
pub use sniff::detect_content_type;
pub use upload::{ensure_dir, upload_files, upload_one_file, UploadError, UploadedFile};
