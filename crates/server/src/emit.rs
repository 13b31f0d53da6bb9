//! Response emitters.
//!
//! Every response carries a `Content-Type` and a `Content-Length` equal to the byte
//! length of the body. A HEAD request gets the same headers with no body.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Method, Response, StatusCode};
use serde::Serialize;
use tracing::error;

pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const TEXT_XML: &str = "text/xml";

/// Serializes `payload` as a JSON response.
pub fn emit_json<T>(method: &Method, status: StatusCode, payload: &T) -> Response<Bytes>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(payload) {
        Ok(body) => emit(method, status, APPLICATION_JSON, Bytes::from(body)),
        Err(e) => {
            error!(cause = %e, "failed to serialize json payload");
            let mut response = Response::new(Bytes::new());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Sends `xml` verbatim as a `text/xml` response.
pub fn emit_xml(method: &Method, status: StatusCode, xml: &'static str) -> Response<Bytes> {
    emit(method, status, TEXT_XML, Bytes::from_static(xml.as_bytes()))
}

pub(crate) fn emit(method: &Method, status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Bytes> {
    let content_length = HeaderValue::from(body.len());
    let body = if method == Method::HEAD { Bytes::new() } else { body };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CONTENT_LENGTH, content_length);
    response
}
