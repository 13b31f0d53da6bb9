//! A small asynchronous HTTP/1.1 server core built on tokio.
//!
//! The crate turns a byte stream into a sequence of requests and writes buffered
//! responses back:
//!
//! - [`codec`]: request decoding (heads, `Content-Length` and chunked payloads) and
//!   response encoding
//! - [`protocol`]: request heads, payload items, the streaming [`protocol::body::ReqBody`]
//!   and the error types
//! - [`connection`]: the per-connection loop with keep-alive, `Expect: 100-continue`
//!   and an idle read timeout
//! - [`handler`]: the [`handler::Handler`] trait applications implement
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use canned_http::connection::HttpConnection;
//! use canned_http::handler::make_handler;
//! use canned_http::protocol::ParseError;
//! use canned_http::protocol::body::ReqBody;
//! use http::{Request, Response};
//! use http_body_util::BodyExt;
//! use tokio::net::TcpListener;
//!
//! async fn echo(request: Request<ReqBody>) -> Result<Response<Bytes>, ParseError> {
//!     let body = request.into_body().collect().await?.to_bytes();
//!     Ok(Response::new(body))
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await?;
//!     let handler = Arc::new(make_handler(echo));
//!
//!     loop {
//!         let (stream, _) = listener.accept().await?;
//!         let handler = Arc::clone(&handler);
//!         tokio::spawn(async move {
//!             let (reader, writer) = stream.into_split();
//!             let _ = HttpConnection::new(reader, writer).process(handler).await;
//!         });
//!     }
//! }
//! ```
//!
//! # Limitations
//!
//! - HTTP/1.1 only, HTTP/1.0 requests are answered and the connection closed
//! - Responses are fully buffered
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
