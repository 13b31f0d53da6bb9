use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{SinkExt, Stream, StreamExt};
use http_body::{Body, Frame, SizeHint};
use tracing::{error, info};

use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

/// Capacity of the channel between the frame stream and the handler.
const BODY_CHANNEL_CAPACITY: usize = 8;

type BodyItem = Result<PayloadItem, ParseError>;

/// Consumer half of a request body.
///
/// Yields data frames in the order the chunks arrived on the connection, then `None`
/// once the decoder reported the end of the payload. A transport failure surfaces as a
/// single `Err` frame.
#[derive(Debug)]
pub struct ReqBody {
    receiver: mpsc::Receiver<BodyItem>,
    payload_size: PayloadSize,
    finished: bool,
}

impl ReqBody {
    /// Creates the body halves for a request whose payload is read from `payload_stream`.
    pub fn body_channel<S>(payload_stream: &mut S, payload_size: PayloadSize) -> (ReqBody, ReqBodySender<'_, S>)
    where
        S: Stream + Unpin,
    {
        let (sender, receiver) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        let req_body = ReqBody { receiver, payload_size, finished: false };
        let body_sender = ReqBodySender { payload_stream, sender, eof: false, failed: false };
        (req_body, body_sender)
    }

    /// A body that is already at its end.
    pub fn empty() -> Self {
        let (_sender, receiver) = mpsc::channel(0);
        ReqBody { receiver, payload_size: PayloadSize::Empty, finished: true }
    }

    pub fn payload_size(&self) -> PayloadSize {
        self.payload_size
    }
}

impl Body for ReqBody {
    type Data = Bytes;
    type Error = ParseError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.receiver.poll_next_unpin(cx)) {
            Some(Ok(PayloadItem::Chunk(bytes))) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
            Some(Ok(PayloadItem::Eof)) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Some(Err(e)) => {
                this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
            None => {
                this.finished = true;
                Poll::Ready(Some(Err(ParseError::invalid_body("request body closed before eof"))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished
    }

    fn size_hint(&self) -> SizeHint {
        match self.payload_size {
            PayloadSize::Length(length) => SizeHint::with_exact(length),
            PayloadSize::Chunked => SizeHint::new(),
            PayloadSize::Empty => SizeHint::with_exact(0),
        }
    }
}

/// Producer half of a request body, borrowing the connection's frame stream.
#[derive(Debug)]
pub struct ReqBodySender<'conn, S>
where
    S: Stream + Unpin,
{
    payload_stream: &'conn mut S,
    sender: mpsc::Sender<BodyItem>,
    eof: bool,
    failed: bool,
}

impl<S> ReqBodySender<'_, S>
where
    S: Stream<Item = Result<Message<(RequestHeader, PayloadSize)>, ParseError>> + Unpin,
{
    /// Forwards payload chunks to the [`ReqBody`] until EOF.
    ///
    /// Returns early with `Ok` when the handler dropped its body; the remaining payload is
    /// then left for [`skip_body`](Self::skip_body). A transport error is forwarded to the
    /// body and also returned.
    pub async fn send_body(&mut self) -> Result<(), ParseError> {
        while !self.eof {
            match self.read_item().await {
                Ok(payload_item) => {
                    self.eof = payload_item.is_eof();
                    if self.sender.send(Ok(payload_item)).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    self.failed = true;
                    let reason = e.to_string();
                    error!(cause = %reason, "failed to read request body");
                    let _ = self.sender.send(Err(e)).await;
                    return Err(ParseError::invalid_body(reason));
                }
            }
        }

        Ok(())
    }

    /// Drains whatever part of the payload the handler did not consume.
    pub async fn skip_body(&mut self) -> Result<(), ParseError> {
        if self.failed {
            return Err(ParseError::invalid_body("request body is broken, connection can't be reused"));
        }

        let mut skipped: usize = 0;
        while !self.eof {
            let payload_item = self.read_item().await.inspect_err(|_| self.failed = true)?;
            self.eof = payload_item.is_eof();
            if let Some(bytes) = payload_item.as_bytes() {
                skipped += bytes.len();
            }
        }

        if skipped > 0 {
            info!(size = skipped, "skip request body");
        }
        Ok(())
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    async fn read_item(&mut self) -> Result<PayloadItem, ParseError> {
        match self.payload_stream.next().await {
            Some(Ok(Message::Payload(payload_item))) => Ok(payload_item),
            Some(Ok(Message::Header(_))) => {
                error!("received header while reading request body");
                Err(ParseError::invalid_body("received header while reading request body"))
            }
            Some(Err(e)) => Err(e),
            None => Err(ParseError::invalid_body("connection closed before request body completed")),
        }
    }
}
