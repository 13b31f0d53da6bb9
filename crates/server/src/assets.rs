//! Embedded static pages.

use bytes::Bytes;
use http::{Method, Response, StatusCode};

use crate::emit::emit;

const INDEX_HTML: &str = include_str!("../static/index.html");
const STYLE_CSS: &str = include_str!("../static/style.css");

pub fn index(method: &Method) -> Response<Bytes> {
    emit(method, StatusCode::OK, "text/html", Bytes::from_static(INDEX_HTML.as_bytes()))
}

pub fn stylesheet(method: &Method) -> Response<Bytes> {
    emit(method, StatusCode::OK, "text/css", Bytes::from_static(STYLE_CSS.as_bytes()))
}
