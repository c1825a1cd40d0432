use crate::constants::{MAX_JSON_SIZE, MAX_UPLOAD_SIZE};
use std::env;

/// Settings for the multipart upload handler.
///
/// `None` / empty fields mean "use the default": a 1 GiB ceiling and an
/// unrestricted allow-list. Defaults are resolved at call entry; the config
/// itself is never mutated by a call.
#[derive(Debug, Clone, Default)]
pub struct UploadConfig {
    /// Maximum accepted total request size in bytes
    pub max_upload_size: Option<u64>,
    /// Sniffed MIME types accepted for upload; empty allows any type
    pub allowed_types: Vec<String>,
}

impl UploadConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            max_upload_size: match env::var("MAX_UPLOAD_SIZE") {
                Ok(v) => Some(v.parse()?),
                Err(_) => None,
            },
            allowed_types: env::var("ALLOWED_FILE_TYPES")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn effective_max_size(&self) -> u64 {
        self.max_upload_size.unwrap_or(MAX_UPLOAD_SIZE)
    }

    /// Allow-list check: case-insensitive, empty list accepts everything
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.allowed_types.is_empty()
            || self
                .allowed_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

/// Settings for the JSON payload decoder.
#[derive(Debug, Clone, Default)]
pub struct DecodeConfig {
    /// Maximum accepted body size in bytes (1 MiB when unset)
    pub max_body_size: Option<usize>,
    /// Permit fields in the payload that the target shape does not declare
    pub allow_unknown_fields: bool,
}

impl DecodeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            max_body_size: match env::var("MAX_JSON_SIZE") {
                Ok(v) => Some(v.parse()?),
                Err(_) => None,
            },
            allow_unknown_fields: env::var("ALLOW_UNKNOWN_FIELDS")
                .map(|v| v.parse().unwrap_or(false))
                .unwrap_or(false),
        })
    }

    pub fn effective_max_size(&self) -> usize {
        self.max_body_size.unwrap_or(MAX_JSON_SIZE)
    }
}
