//! Request payload decoding.
//!
//! - [`LengthDecoder`](length_decoder::LengthDecoder): `Content-Length` framed payloads
//! - [`ChunkedDecoder`](chunked_decoder::ChunkedDecoder): `Transfer-Encoding: chunked` payloads
//! - [`PayloadDecoder`]: picks one of the above, or none, from the [`PayloadSize`](crate::protocol::PayloadSize)

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;

pub use payload_decoder::PayloadDecoder;
