//! Decoder for payloads framed by a `Content-Length` header.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Hands out whatever bytes are buffered, up to the remaining content length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// bytes still expected
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.remaining, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.remaining -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::invalid_body(format!("connection closed with {} body bytes missing", self.remaining))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_content_length() {
        let mut buffer = BytesMut::from(&b"{\"a\":1}GET / HTTP/1.1\r\n"[..]);

        let mut decoder = LengthDecoder::new(7);
        let payload = decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(payload.as_bytes().unwrap().as_ref(), b"{\"a\":1}");
        assert_eq!(&buffer[..], b"GET / HTTP/1.1\r\n");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn partial_payload_is_streamed() {
        let mut buffer = BytesMut::from(&b"valid="[..]);
        let mut decoder = LengthDecoder::new(10);

        assert_eq!(decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap().as_ref(), b"valid=");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"true");
        assert_eq!(decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap().as_ref(), b"true");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn truncated_payload_fails_at_eof() {
        let mut buffer = BytesMut::new();
        let mut decoder = LengthDecoder::new(3);
        assert!(decoder.decode_eof(&mut buffer).is_err());
    }
}
