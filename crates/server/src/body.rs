//! The Body Reader.
//!
//! Collects the chunks of a POST body in arrival order, decodes the result as UTF-8 and
//! parses it according to the declared `Content-Type`. Only form-encoded and JSON bodies
//! are understood.

use std::collections::HashMap;
use std::fmt::Display;
use std::pin::pin;

use bytes::{Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Response, StatusCode};
use http_body::Body;
use http_body_util::BodyExt;
use mime::Mime;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::emit::emit_json;

/// Largest request body the reader buffers.
pub const MAX_BODY_SIZE: usize = 256 * 1024;

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Form(HashMap<String, String>),
    Json(serde_json::Value),
}

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read request body: {reason}")]
    Transport { reason: String },

    #[error("unsupported content type: {content_type:?}")]
    UnsupportedContentType { content_type: Option<String> },

    #[error("malformed {kind} body: {reason}")]
    MalformedBody { kind: &'static str, reason: String },

    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

#[derive(Serialize)]
struct ErrorMessage {
    error: &'static str,
}

impl BodyError {
    pub fn transport(reason: impl ToString) -> Self {
        Self::Transport { reason: reason.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BodyError::Transport { .. } | BodyError::UnsupportedContentType { .. } => StatusCode::BAD_REQUEST,
            BodyError::MalformedBody { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            BodyError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// The response sent in place of the handler's.
    pub fn to_response(&self, method: &Method) -> Response<Bytes> {
        match self {
            BodyError::Transport { .. } => {
                let mut response = Response::new(Bytes::new());
                *response.status_mut() = self.status();
                response
            }
            BodyError::UnsupportedContentType { .. } => {
                emit_json(method, self.status(), &ErrorMessage { error: "invalid data format" })
            }
            BodyError::MalformedBody { .. } => emit_json(method, self.status(), &ErrorMessage { error: "malformed request body" }),
            BodyError::TooLarge { .. } => emit_json(method, self.status(), &ErrorMessage { error: "request body too large" }),
        }
    }
}

/// Reads `body` to its end and parses it according to the `Content-Type` in `headers`.
///
/// Bodies larger than [`MAX_BODY_SIZE`] are refused.
pub async fn read_body<B>(headers: &HeaderMap, body: B) -> Result<ParsedBody, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    read_body_with_limit(headers, body, MAX_BODY_SIZE).await
}

/// [`read_body`] with a custom size limit in bytes.
pub async fn read_body_with_limit<B>(headers: &HeaderMap, body: B, limit: usize) -> Result<ParsedBody, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    // a declared Content-Length is enough to refuse without reading
    if body.size_hint().lower() > limit as u64 {
        warn!(declared = body.size_hint().lower(), limit, "request body too large");
        return Err(BodyError::TooLarge { limit });
    }

    let mut body = pin!(body);
    let mut buffer = BytesMut::new();
    let mut chunks: usize = 0;

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(BodyError::transport)?;
        if let Ok(data) = frame.into_data() {
            if buffer.len() + data.len() > limit {
                warn!(received = buffer.len() + data.len(), limit, "request body too large");
                return Err(BodyError::TooLarge { limit });
            }
            chunks += 1;
            buffer.extend_from_slice(&data);
        }
    }

    debug!(chunks, size = buffer.len(), "request body received");
    let text = String::from_utf8_lossy(&buffer);
    parse_body(headers, &text)
}

/// Parses a complete body according to the `Content-Type` in `headers`.
pub fn parse_body(headers: &HeaderMap, text: &str) -> Result<ParsedBody, BodyError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
    let mime = content_type.and_then(|value| value.parse::<Mime>().ok());

    match mime.as_ref().map(Mime::essence_str) {
        Some(essence) if essence == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            serde_urlencoded::from_str::<Vec<(String, String)>>(text)
                .map(|pairs| ParsedBody::Form(pairs.into_iter().collect()))
                .map_err(|e| BodyError::MalformedBody { kind: "form", reason: e.to_string() })
        }
        Some(essence) if essence == mime::APPLICATION_JSON.essence_str() => serde_json::from_str(text)
            .map(ParsedBody::Json)
            .map_err(|e| BodyError::MalformedBody { kind: "json", reason: e.to_string() }),
        _ => {
            warn!(content_type, "unsupported request body content type");
            Err(BodyError::UnsupportedContentType { content_type: content_type.map(str::to_owned) })
        }
    }
}
