//! Streaming request decoder.
//!
//! Yields one [`Message::Header`] per request followed by its payload as
//! [`Message::Payload`] items, the last of which is always [`PayloadItem::Eof`].

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP requests that handles both heads and payloads.
///
/// `payload_decoder` is `None` while waiting for a request head and `Some` until the
/// payload of that request has reached EOF.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    fn wrap_payload(&mut self, item: Option<PayloadItem>) -> Option<Message<(RequestHeader, PayloadSize)>> {
        if item.as_ref().is_some_and(PayloadItem::is_eof) {
            self.payload_decoder = None;
        }
        item.map(Message::Payload)
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            return Ok(self.wrap_payload(item));
        }

        let message = self.header_decoder.decode(src)?.map(|(header, payload_size)| {
            self.payload_decoder = Some(payload_size.into());
            Message::Header((header, payload_size))
        });

        Ok(message)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode_eof(src)?;
            return Ok(self.wrap_payload(item));
        }

        match self.header_decoder.decode(src)? {
            Some(head) => {
                self.payload_decoder = Some(head.1.into());
                Ok(Some(Message::Header(head)))
            }
            None if src.is_empty() => Ok(None),
            None => Err(ParseError::invalid_header("connection closed in the middle of a request head")),
        }
    }
}
