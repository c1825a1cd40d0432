//! JSON body decoding with structured error translation, plus the response
//! envelope and outbound JSON push helpers.
//!
//! [`read_json`] enforces a size ceiling, a single-top-level-value rule, and
//! (by default) rejection of unknown fields, and folds every serde failure
//! into one [`AppError`] category so route layers can render a stable,
//! human-readable message instead of a raw parser error.

use crate::config::DecodeConfig;
use crate::error::AppError;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::error::Category;

/// Response envelope the route layer sends for both errors and payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonResponse {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Decode `body` into `T`, translating every failure into one [`AppError`]
/// category.
///
/// The body must hold exactly one JSON value; trailing content fails with
/// [`AppError::MultipleJsonValues`]. Unknown fields are rejected unless
/// `config.allow_unknown_fields` is set.
pub fn read_json<T: DeserializeOwned>(body: &[u8], config: &DecodeConfig) -> Result<T, AppError> {
    let limit = config.effective_max_size();
    let oversize = body.len() > limit;

    // Decode inside the limit window. Mirrors a size-limited reader: errors
    // the decoder hits before consuming past the limit (bad syntax, wrong
    // types, unknown keys) are reported as themselves; the size verdict only
    // lands when the decode runs off the window or completes inside it.
    let window = &body[..body.len().min(limit)];
    if !oversize && window.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::EmptyBody);
    }

    let mut de = serde_json::Deserializer::from_slice(window);
    let mut track = serde_path_to_error::Track::new();
    let mut unknown_field: Option<String> = None;

    let result: Result<T, serde_json::Error> = {
        let tracked = serde_path_to_error::Deserializer::new(&mut de, &mut track);
        if config.allow_unknown_fields {
            T::deserialize(tracked)
        } else {
            serde_ignored::deserialize(tracked, |path| {
                if unknown_field.is_none() {
                    unknown_field = Some(path.to_string());
                }
            })
        }
    };

    let value = match result {
        Ok(value) => value,
        Err(e) => {
            return Err(match classify(e, track.path().to_string()) {
                // The window cut the value short; the full body has more bytes
                AppError::TruncatedJson if oversize => AppError::BodyTooLarge { limit },
                err => err,
            });
        }
    };

    if let Some(field) = unknown_field {
        return Err(AppError::UnknownField { field });
    }

    if oversize {
        // The value fits the window but the body does not fit the limit
        return Err(AppError::BodyTooLarge { limit });
    }

    // Exactly one value: anything left after the first decode is an error
    if de.end().is_err() {
        return Err(AppError::MultipleJsonValues);
    }

    Ok(value)
}

/// Fold a serde_json failure into the decoder's error taxonomy. `path` is the
/// field path recorded up to the failure point ("." when at the root).
fn classify(e: serde_json::Error, path: String) -> AppError {
    let line = e.line();
    let column = e.column();
    match e.classify() {
        Category::Syntax => AppError::MalformedJson { line, column },
        Category::Eof => AppError::TruncatedJson,
        Category::Data => {
            let message = e.to_string();
            if message.starts_with("invalid type") || message.starts_with("invalid value") {
                let field = match path.as_str() {
                    "" | "." => None,
                    p => Some(p.to_string()),
                };
                AppError::TypeMismatch {
                    field,
                    line,
                    column,
                }
            } else if let Some(field) = unknown_field_name(&message) {
                // Targets with deny_unknown_fields report through serde
                // rather than through serde_ignored
                AppError::UnknownField { field }
            } else {
                AppError::Decode(message)
            }
        }
        Category::Io => AppError::Decode(e.to_string()),
    }
}

fn unknown_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Serialize `payload` into a response with `status` and any extra `headers`.
pub fn write_json<T: Serialize>(status: StatusCode, payload: &T, headers: HeaderMap) -> Response {
    let mut response = (status, Json(payload)).into_response();
    response.headers_mut().extend(headers);
    response
}

/// Render `err` as a [`JsonResponse`] failure body. Defaults to 400 when no
/// status is given.
pub fn error_json(err: &AppError, status: Option<StatusCode>) -> Response {
    let status = status.unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(JsonResponse::failure(err.to_string()))).into_response()
}

/// POST `payload` as JSON to `url`.
///
/// Pass a client to reuse connection pools; `None` builds a one-shot client.
/// Returns the raw response so callers can inspect status and body; non-2xx
/// statuses are not treated as errors here.
pub async fn push_json<T: Serialize>(
    url: &str,
    payload: &T,
    client: Option<&reqwest::Client>,
) -> Result<reqwest::Response, AppError> {
    let one_shot;
    let client = match client {
        Some(client) => client,
        None => {
            one_shot = reqwest::Client::new();
            &one_shot
        }
    };

    let response = client.post(url).json(payload).send().await?;
    tracing::info!("Pushed JSON to {}: {}", url, response.status());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u64,
    }

    fn config() -> DecodeConfig {
        DecodeConfig::default()
    }

    #[test]
    fn decodes_a_well_formed_body() {
        let body = br#"{"name": "kibble", "count": 3}"#;
        let sample: Sample = read_json(body, &config()).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "kibble".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn empty_and_whitespace_bodies() {
        for body in [&b""[..], b"   \n\t "] {
            let err = read_json::<Sample>(body, &config()).unwrap_err();
            assert!(matches!(err, AppError::EmptyBody), "got {:?}", err);
        }
    }

    #[test]
    fn malformed_syntax_reports_position() {
        let err = read_json::<Sample>(br#"{"name": dog}"#, &config()).unwrap_err();
        match err {
            AppError::MalformedJson { line, column } => {
                assert_eq!(line, 1);
                assert!(column > 0);
            }
            other => panic!("expected MalformedJson, got {:?}", other),
        }
    }

    #[test]
    fn truncated_body() {
        let err = read_json::<Sample>(br#"{"name": "kibble", "co"#, &config()).unwrap_err();
        assert!(matches!(err, AppError::TruncatedJson), "got {:?}", err);
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let err = read_json::<Sample>(br#"{"name": "kibble", "count": "three"}"#, &config())
            .unwrap_err();
        match err {
            AppError::TypeMismatch { field, .. } => assert_eq!(field.as_deref(), Some("count")),
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn type_mismatch_at_the_root_has_no_field() {
        let err = read_json::<Sample>(b"42", &config()).unwrap_err();
        match err {
            AppError::TypeMismatch { field, .. } => assert_eq!(field, None),
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_rejected_by_default() {
        let body = br#"{"name": "kibble", "count": 3, "sneaky": true}"#;
        let err = read_json::<Sample>(body, &config()).unwrap_err();
        match err {
            AppError::UnknownField { field } => assert_eq!(field, "sneaky"),
            other => panic!("expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_allowed_when_configured() {
        let body = br#"{"name": "kibble", "count": 3, "sneaky": true}"#;
        let config = DecodeConfig {
            allow_unknown_fields: true,
            ..Default::default()
        };
        let sample: Sample = read_json(body, &config).unwrap();
        assert_eq!(sample.count, 3);
    }

    #[test]
    fn two_concatenated_values() {
        let err = read_json::<serde_json::Value>(br#"{"a":1}{"b":2}"#, &config()).unwrap_err();
        assert!(matches!(err, AppError::MultipleJsonValues), "got {:?}", err);
    }

    #[test]
    fn trailing_garbage_counts_as_a_second_value() {
        let err =
            read_json::<Sample>(br#"{"name": "kibble", "count": 3} extra"#, &config()).unwrap_err();
        assert!(matches!(err, AppError::MultipleJsonValues), "got {:?}", err);
    }

    #[test]
    fn oversize_body() {
        let config = DecodeConfig {
            max_body_size: Some(8),
            ..Default::default()
        };
        let err = read_json::<Sample>(br#"{"name": "kibble", "count": 3}"#, &config).unwrap_err();
        assert!(
            matches!(err, AppError::BodyTooLarge { limit: 8 }),
            "got {:?}",
            err
        );
    }

    #[test]
    fn oversize_body_with_bad_syntax_inside_the_limit() {
        let config = DecodeConfig {
            max_body_size: Some(16),
            ..Default::default()
        };
        // The syntax error sits at column 10, well inside the 16-byte window
        let err = read_json::<Sample>(br#"{"name": dog, "count": 3}"#, &config).unwrap_err();
        assert!(matches!(err, AppError::MalformedJson { .. }), "got {:?}", err);
    }

    #[test]
    fn oversize_body_with_a_complete_value_inside_the_limit() {
        let config = DecodeConfig {
            max_body_size: Some(10),
            ..Default::default()
        };
        let err = read_json::<serde_json::Value>(br#"{"a":1}  {"b":2}"#, &config).unwrap_err();
        assert!(
            matches!(err, AppError::BodyTooLarge { limit: 10 }),
            "got {:?}",
            err
        );
    }

    /// Headers done and the declared content-length received
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let header_end = match text.find("\r\n\r\n") {
            Some(pos) => pos,
            None => return false,
        };
        let content_length = text
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    #[tokio::test]
    async fn push_json_posts_the_payload_as_json() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // One-request server that captures what arrived on the wire
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/json\r\n\
                      content-length: 2\r\n\r\n{}",
                )
                .await
                .unwrap();
            String::from_utf8(request).unwrap()
        });

        let payload = JsonResponse::success("ping", None);
        let response = push_json(&format!("http://{}/hook", addr), &payload, None)
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let request = server.await.unwrap();
        assert!(
            request.starts_with("POST /hook HTTP/1.1\r\n"),
            "got {:?}",
            request
        );
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"error":false,"message":"ping"}"#));
    }

    #[tokio::test]
    async fn write_json_sets_status_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "no-store".parse().unwrap());

        let payload = JsonResponse::success("created", None);
        let response = write_json(StatusCode::CREATED, &payload, headers);

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let echoed: JsonResponse = serde_json::from_slice(&body).unwrap();
        assert!(!echoed.error);
        assert_eq!(echoed.message, "created");
    }

    #[tokio::test]
    async fn error_json_defaults_to_bad_request() {
        let response = error_json(&AppError::EmptyBody, None);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let envelope: JsonResponse = serde_json::from_slice(&body).unwrap();
        assert!(envelope.error);
        assert_eq!(envelope.message, "body must not be empty");
    }
}
