//! Per-connection request loop.
//!
//! [`HttpConnection`] reads requests off a byte stream, streams each payload to the
//! [`Handler`](crate::handler::Handler) while it runs, writes the response and then
//! either waits for the next request or closes.

mod http_connection;

pub use http_connection::HttpConnection;
