//! Application-wide constants.
//! All magic numbers and default ceilings live here.

/// Default maximum upload size in bytes (1 GiB), applied when a config leaves it unset
pub const MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Default maximum JSON body size in bytes (1 MiB)
pub const MAX_JSON_SIZE: usize = 1024 * 1024;

/// How many leading bytes content sniffing looks at
pub const SNIFF_LEN: usize = 512;

/// Length of generated stored file names (before the extension)
pub const RANDOM_NAME_LEN: usize = 12;

/// 64-symbol alphabet for generated names. Every symbol is safe in a Linux
/// file name, and 64 keeps per-character sampling uniform.
pub const RANDOM_STRING_SOURCE: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+";
