//! Streaming request bodies.
//!
//! The connection owns the decoded frame stream, so a request body is split in two
//! halves joined by a bounded channel:
//!
//! - [`ReqBody`]: the consumer half, an `http_body::Body` handed to the handler
//! - [`ReqBodySender`]: the producer half, which pulls payload chunks off the frame
//!   stream and forwards them in arrival order
//!
//! Whatever the handler leaves unread is drained by [`ReqBodySender::skip_body`] so the
//! next request on a keep-alive connection starts on a clean frame boundary.

mod req_body;

pub use req_body::ReqBody;
pub use req_body::ReqBodySender;
