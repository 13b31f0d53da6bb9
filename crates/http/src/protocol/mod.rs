//! Protocol types shared by the codec, the connection and request handlers.
//!
//! - [`Message`], [`PayloadItem`], [`PayloadSize`]: what the request decoder yields
//! - [`RequestHeader`]: a parsed request head
//! - [`body::ReqBody`]: the streaming request body handed to handlers
//! - [`HttpError`], [`ParseError`], [`SendError`]: error types of this layer

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
