//! Request head decoding.
//!
//! Parses the request line and header fields with `httparse`, builds an
//! `http::Request<()>` from them and works out how the payload is framed.
//!
//! Limits: at most [`MAX_HEADER_NUM`] header fields and [`MAX_HEADER_BYTES`] bytes of head.
//! Only HTTP/1.0 and HTTP/1.1 are accepted.

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Request};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
pub(crate) const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
pub(crate) const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request heads.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let body_offset = match req.parse(src) {
            Ok(Status::Complete(body_offset)) => body_offset,
            Ok(Status::Partial) => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
            Err(httparse::Error::TooManyHeaders) => return Err(ParseError::too_many_headers(MAX_HEADER_NUM)),
            Err(e) => return Err(ParseError::invalid_header(e)),
        };

        trace!(head_size = body_offset, "parsed request head");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let version = match req.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            other => return Err(ParseError::InvalidVersion(other)),
        };

        let mut builder = Request::builder()
            .method(req.method.ok_or(ParseError::InvalidMethod)?)
            .uri(req.path.ok_or(ParseError::InvalidUri)?)
            .version(version);

        if let Some(header_map) = builder.headers_mut() {
            header_map.reserve(req.headers.len());
            for header in req.headers.iter() {
                let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
                let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
                header_map.append(name, value);
            }
        }

        let request = builder.body(()).map_err(|e| match e {
            e if e.is::<http::method::InvalidMethod>() => ParseError::InvalidMethod,
            e if e.is::<http::uri::InvalidUri>() => ParseError::InvalidUri,
            e => ParseError::invalid_header(e),
        })?;

        let header = RequestHeader::from(request);
        let payload_size = parse_payload(&header)?;

        // the head is fully consumed, the payload decoder takes over from here
        let _ = src.split_to(body_offset);

        Ok(Some((header, payload_size)))
    }
}

/// Works out how the request payload is framed, following RFC 9112 section 6.
fn parse_payload(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    let te_header = header.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = header.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_empty()),

        (Some(te_value), None) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::new_chunked())
            } else {
                Err(ParseError::unsupported_transfer_encoding(String::from_utf8_lossy(te_value.as_bytes())))
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value is not visible ascii"))?;

            let length = cl_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            // bodies on GET/HEAD are legal but meaningless here, they are still framed so the
            // connection stays in sync
            if !header.need_body() && length > 0 {
                trace!(length, method = %header.method(), "request without body semantics carries a payload");
            }

            Ok(PayloadSize::new_length(length))
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers"))
        }
    }
}

/// Chunked must be the final transfer coding when present.
fn is_chunked(header_value: &HeaderValue) -> bool {
    header_value
        .as_bytes()
        .rsplit(|b| *b == b',')
        .next()
        .is_some_and(|last| last.trim_ascii().eq_ignore_ascii_case(b"chunked"))
}
