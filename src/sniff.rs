//! Content-type sniffing over the leading bytes of a file.
//!
//! Clients lie about file names and Content-Type headers, so the upload
//! handler trusts magic bytes instead. The table below follows the WHATWG
//! MIME-sniffing signatures for the formats a file host actually sees;
//! anything unrecognized falls back to a binary-vs-text scan.

use crate::constants::SNIFF_LEN;

/// Detect the MIME type of `data` from at most its first 512 bytes.
///
/// Always returns a valid MIME type; `application/octet-stream` when nothing
/// more specific fits. Text results carry a charset parameter, so allow-lists
/// for plain text should list `text/plain; charset=utf-8`.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some(mime) = match_signature(data) {
        return mime;
    }
    if let Some(mime) = match_html(data) {
        return mime;
    }

    // 0x00-0x08, 0x0B, 0x0E-0x1A and 0x1C-0x1F never appear in text
    let binary = data.iter().any(|&b| {
        b <= 0x08 || b == 0x0B || (0x0E..=0x1A).contains(&b) || (0x1C..=0x1F).contains(&b)
    });
    if binary {
        "application/octet-stream"
    } else {
        "text/plain; charset=utf-8"
    }
}

fn match_signature(data: &[u8]) -> Option<&'static str> {
    let exact: &[(&[u8], &'static str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
        (b"%PDF-", "application/pdf"),
        (b"%!PS-Adobe-", "application/postscript"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b\x08", "application/x-gzip"),
        (b"Rar!\x1a\x07", "application/x-rar-compressed"),
        (b"\x00asm", "application/wasm"),
        (b"OggS", "application/ogg"),
        (b"ID3", "audio/mpeg"),
        (b"\xff\xfb", "audio/mpeg"),
        (b"fLaC", "audio/flac"),
        (b"\x1a\x45\xdf\xa3", "video/webm"),
        (b"\xef\xbb\xbf", "text/plain; charset=utf-8"),
        (b"\xfe\xff", "text/plain; charset=utf-16be"),
        (b"\xff\xfe", "text/plain; charset=utf-16le"),
    ];

    for (magic, mime) in exact {
        if data.starts_with(magic) {
            return Some(mime);
        }
    }

    // RIFF containers carry the real format at offset 8
    if data.starts_with(b"RIFF") && data.len() >= 12 {
        return match &data[8..12] {
            b"WEBP" => Some("image/webp"),
            b"WAVE" => Some("audio/wave"),
            b"AVI " => Some("video/avi"),
            _ => None,
        };
    }

    // ISO BMFF: the ftyp box sits at offset 4
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return Some("video/mp4");
    }

    None
}

fn match_html(data: &[u8]) -> Option<&'static str> {
    let trimmed = trim_ascii_start(data);

    let html_prefixes: &[&[u8]] = &[
        b"<!DOCTYPE HTML",
        b"<HTML",
        b"<HEAD",
        b"<BODY",
        b"<SCRIPT",
        b"<IFRAME",
        b"<DIV",
        b"<P>",
        b"<!--",
    ];
    for prefix in html_prefixes {
        if starts_with_ignore_case(trimmed, prefix) {
            return Some("text/html; charset=utf-8");
        }
    }

    if trimmed.starts_with(b"<?xml") {
        return Some("text/xml; charset=utf-8");
    }

    None
}

fn trim_ascii_start(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len()
        && data
            .iter()
            .zip(prefix)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}
