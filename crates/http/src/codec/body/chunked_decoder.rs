//! Decoder for `Transfer-Encoding: chunked` payloads, see
//! [RFC 9112 section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! Chunk extensions and trailer fields are read and discarded.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    /// bytes left in the current chunk, or the size being parsed
    remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    Size,
    SizeLws,
    Extension,
    SizeLf,
    Body,
    BodyCr,
    BodyLf,
    Trailer,
    TrailerLf,
    EndCr,
    EndLf,
    End,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: ChunkedState::Size, remaining: 0 }
    }

    /// Advances the state machine by one framing byte.
    fn step(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        use ChunkedState::*;

        let next = match (self.state, byte) {
            (Size, b'\t' | b' ') | (SizeLws, b'\t' | b' ') => SizeLws,
            (Size | SizeLws, b';') => Extension,
            (Size | SizeLws | Extension, b'\r') => SizeLf,
            (Size, b) => {
                let digit = hex_value(b).ok_or(ParseError::invalid_chunk("invalid chunk size"))?;
                self.remaining = self
                    .remaining
                    .checked_mul(16)
                    .and_then(|size| size.checked_add(digit))
                    .ok_or(ParseError::invalid_chunk("chunk size overflow"))?;
                Size
            }
            (SizeLws, _) => return Err(ParseError::invalid_chunk("invalid chunk size linear white space")),
            (Extension, b'\n') => return Err(ParseError::invalid_chunk("chunk extension contains newline")),
            (Extension, _) => Extension,
            (SizeLf, b'\n') if self.remaining == 0 => EndCr,
            (SizeLf, b'\n') => Body,
            (SizeLf, _) => return Err(ParseError::invalid_chunk("invalid chunk size LF")),
            (BodyCr, b'\r') => BodyLf,
            (BodyCr, _) => return Err(ParseError::invalid_chunk("invalid chunk body CR")),
            (BodyLf, b'\n') => Size,
            (BodyLf, _) => return Err(ParseError::invalid_chunk("invalid chunk body LF")),
            (EndCr, b'\r') => EndLf,
            (EndCr, _) => Trailer,
            (Trailer, b'\r') => TrailerLf,
            (Trailer, _) => Trailer,
            (TrailerLf, b'\n') => EndCr,
            (TrailerLf, _) => return Err(ParseError::invalid_chunk("invalid trailer LF")),
            (EndLf, b'\n') => End,
            (EndLf, _) => return Err(ParseError::invalid_chunk("invalid chunk end LF")),
            (state @ (Body | End), _) => state,
        };

        Ok(next)
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                ChunkedState::End => {
                    trace!("finished reading chunked data");
                    return Ok(Some(PayloadItem::Eof));
                }

                _ if src.is_empty() => return Ok(None),

                ChunkedState::Body => {
                    let len = cmp::min(self.remaining, src.len() as u64) as usize;
                    let bytes = src.split_to(len).freeze();
                    self.remaining -= len as u64;
                    if self.remaining == 0 {
                        self.state = ChunkedState::BodyCr;
                    }

                    trace!(len, "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                _ => {
                    let byte = src.get_u8();
                    self.state = self.step(byte)?;
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::invalid_chunk("connection closed in the middle of a chunked body")),
        }
    }
}

fn hex_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some(u64::from(b - b'0')),
        b'a'..=b'f' => Some(u64::from(b - b'a' + 10)),
        b'A'..=b'F' => Some(u64::from(b - b'A' + 10)),
        _ => None,
    }
}
