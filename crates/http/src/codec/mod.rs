//! `tokio_util` codecs for HTTP/1.1.
//!
//! - [`RequestDecoder`]: request heads and their payload chunks
//! - [`ResponseEncoder`]: buffered responses
//!
//! ```no_run
//! use canned_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /success HTTP/1.1\r\n\r\n");
//! let head = decoder.decode(&mut buffer);
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
