//! Request head parsing.
//!
//! [`HeaderDecoder`] turns the raw request line and header fields into a
//! [`RequestHeader`](crate::protocol::RequestHeader) and decides how the payload that
//! follows is framed.

mod header_decoder;

pub use header_decoder::HeaderDecoder;
