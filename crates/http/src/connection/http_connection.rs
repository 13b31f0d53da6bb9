use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::header::EXPECT;
use http::{Response, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::body::ReqBody;
use crate::protocol::{HttpError, Message, ParseError, PayloadSize, RequestHeader, SendError};

/// Read buffer capacity, also the largest head the decoder accepts.
const READ_BUFFER_SIZE: usize = 8 * 1024;

const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// An HTTP/1.1 connection over a split byte stream.
///
/// Requests are served one after the other. While the handler runs, the request payload is
/// streamed into its [`ReqBody`]; whatever the handler leaves unread is drained afterwards so
/// the next request starts on a clean boundary.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    read_timeout: Option<Duration>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            read_timeout: None,
        }
    }

    /// Closes the connection when no request head arrives within `read_timeout`.
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Serves requests until the peer goes away, asks to close, or sends something unreadable.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            let next = match self.read_timeout {
                Some(read_timeout) => match timeout(read_timeout, self.framed_read.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        info!(timeout = ?read_timeout, "connection idle, shutting down");
                        return Ok(());
                    }
                },
                None => self.framed_read.next().await,
            };

            match next {
                Some(Ok(Message::Header((header, payload_size)))) => {
                    let keep_alive = self.do_process(header, payload_size, handler.as_ref()).await?;
                    if !keep_alive {
                        self.framed_write.close().await?;
                        return Ok(());
                    }
                }

                Some(Ok(Message::Payload(_))) => {
                    error!("received payload while waiting for a request head");
                    self.framed_write.send(bare_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(ParseError::invalid_body("payload without a request head").into());
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't decode next request");
                    self.framed_write.send(bare_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(e.into());
                }

                None => {
                    info!("peer closed the connection");
                    return Ok(());
                }
            }
        }
    }

    /// Serves one request, returning whether the connection may be reused.
    async fn do_process<H>(&mut self, header: RequestHeader, payload_size: PayloadSize, handler: &H) -> Result<bool, HttpError>
    where
        H: Handler,
    {
        let keep_alive = header.keep_alive();

        if expects_continue(&header) && !payload_size.is_empty() {
            let writer = self.framed_write.get_mut();
            writer.write_all(CONTINUE_RESPONSE).await.map_err(SendError::io)?;
            writer.flush().await.map_err(SendError::io)?;
            info!("sent 100 continue");
        }

        let (req_body, mut body_sender) = ReqBody::body_channel(&mut self.framed_read, payload_size);
        let request = header.body(req_body);

        // the handler and the body sender run together, the handler may wait on chunks the
        // sender has not forwarded yet
        let response_result = {
            let handler_future = handler.call(request);
            let body_future = body_sender.send_body();
            tokio::pin!(handler_future, body_future);

            let mut body_done = false;
            loop {
                select! {
                    biased;
                    response = &mut handler_future => break response,
                    _ = &mut body_future, if !body_done => body_done = true,
                }
            }
        };

        if let Err(e) = body_sender.skip_body().await {
            error!(cause = %e, "request body unreadable, closing connection");
            self.framed_write.send(bare_response(StatusCode::BAD_REQUEST)).await?;
            return Err(e.into());
        }

        self.send_response(response_result).await?;
        Ok(keep_alive)
    }

    async fn send_response<E>(&mut self, response_result: Result<Response<Bytes>, E>) -> Result<(), HttpError>
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let response = match response_result {
            Ok(response) => response,
            Err(e) => {
                let cause: Box<dyn Error + Send + Sync> = e.into();
                error!(%cause, "handler failed");
                bare_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        self.framed_write.send(response).await?;
        Ok(())
    }
}

fn expects_continue(header: &RequestHeader) -> bool {
    header.headers().get(EXPECT).is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"100-continue"))
}

fn bare_response(status: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use http::Request;
    use http_body_util::BodyExt;
    use indoc::indoc;
    use std::io;
    use tokio::io::{AsyncReadExt, DuplexStream};

    async fn echo(request: Request<ReqBody>) -> Result<Response<Bytes>, ParseError> {
        let body = request.into_body().collect().await?.to_bytes();
        Ok(Response::new(body))
    }

    async fn refuse(_request: Request<ReqBody>) -> Result<Response<Bytes>, io::Error> {
        Err(io::Error::other("handler refused"))
    }

    fn serve<H: Handler<Error: Send> + 'static>(handler: H, read_timeout: Option<Duration>) -> (DuplexStream, tokio::task::JoinHandle<Result<(), HttpError>>) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let task = tokio::spawn(async move {
            let (reader, writer) = tokio::io::split(server);
            HttpConnection::new(reader, writer).with_read_timeout(read_timeout).process(Arc::new(handler)).await
        });
        (client, task)
    }

    async fn exchange(client: &mut DuplexStream, request: &str) -> String {
        client.write_all(request.as_bytes()).await.unwrap();
        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        output
    }

    #[tokio::test]
    async fn keep_alive_serves_pipelined_requests() {
        let (mut client, task) = serve(make_handler(echo), None);

        let request = indoc! {"
            POST /success HTTP/1.1
            Content-Length: 3

            oneGET /success HTTP/1.1
            Connection: close

        "};
        let output = exchange(&mut client, request).await;

        assert_eq!(output, "HTTP/1.1 200 OK\r\ncontent-length: 3\r\n\r\noneHTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn chunked_body_reaches_the_handler() {
        let (mut client, task) = serve(make_handler(echo), None);

        let request = "POST /success HTTP/1.1\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let output = exchange(&mut client, request).await;

        assert_eq!(output, "HTTP/1.1 200 OK\r\ncontent-length: 11\r\n\r\nhello world");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn expect_continue_is_answered() {
        let (mut client, task) = serve(make_handler(echo), None);

        let request = "POST /success HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
        let output = exchange(&mut client, request).await;

        assert_eq!(output, "HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (mut client, task) = serve(make_handler(echo), None);

        let output = exchange(&mut client, "NOT HTTP AT ALL\r\n\r\n").await;

        assert_eq!(output, "HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\n\r\n");
        assert!(task.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn truncated_body_gets_bad_request() {
        let (mut client, task) = serve(make_handler(echo), None);

        client.write_all(b"POST /success HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await.unwrap();
        client.shutdown().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();

        assert_eq!(output, "HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\n\r\n");
        assert!(task.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn handler_error_becomes_internal_server_error() {
        let (mut client, task) = serve(make_handler(refuse), None);

        let output = exchange(&mut client, "GET /success HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert_eq!(output, "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn idle_connection_times_out() {
        let (_client, task) = serve(make_handler(echo), Some(Duration::from_millis(20)));
        assert!(task.await.unwrap().is_ok());
    }
}
