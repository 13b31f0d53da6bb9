//! Response serialization.
//!
//! Responses are fully buffered, so a response is written in one go: status line,
//! header fields, blank line, body. A `Content-Length` already present on the response
//! is kept as is, which lets a HEAD response announce the length of a body it does not
//! carry. Otherwise the length of the body is used.

use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderValue, Response, Version, header};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::SendError;

/// Initial buffer size reserved for the status line and headers
const INIT_HEADER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response<Bytes>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut parts, body) = response.into_parts();

        if parts.version != Version::HTTP_11 {
            error!(http_version = ?parts.version, "unsupported http version");
            return Err(SendError::invalid_head(format!("unsupported http version {:?}", parts.version)));
        }

        if !parts.headers.contains_key(header::CONTENT_LENGTH) {
            parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        dst.reserve(INIT_HEADER_SIZE + body.len());
        dst.put_slice(b"HTTP/1.1 ");
        dst.put_slice(parts.status.as_str().as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(parts.status.canonical_reason().unwrap_or("").as_bytes());
        dst.put_slice(b"\r\n");

        for (name, value) in parts.headers.iter() {
            dst.put_slice(name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        dst.put_slice(&body);

        Ok(())
    }
}
