use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use canned_http::connection::HttpConnection;
use canned_http::handler::Handler;
use canned_http::protocol::body::ReqBody;
use http::{Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::router::Router;

/// The application behind every connection.
#[derive(Debug)]
pub struct App {
    router: Router,
}

impl App {
    pub fn new() -> Result<Self, ServerError> {
        Ok(Self { router: Router::new()? })
    }
}

#[async_trait]
impl Handler for App {
    type Error = Infallible;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Bytes>, Self::Error> {
        Ok(self.router.dispatch(req).await)
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to build route table: {source}")]
    Routes {
        #[from]
        source: matchit::InsertError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}

#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Ok(Self { config, app: Arc::new(App::new()?) })
    }

    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.socket_addr();
        TcpListener::bind(address).await.map_err(|source| ServerError::Bind { address, source })
    }

    /// Binds the configured address and serves connections until the process stops.
    pub async fn start(self) -> Result<(), ServerError> {
        let tcp_listener = self.bind().await?;
        info!(address = %self.config.socket_addr(), "start listening");
        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Accepts connections on `tcp_listener`, one task per connection.
    pub async fn serve(&self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let app = Arc::clone(&self.app);
            let read_timeout = self.config.read_timeout;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                info!(%remote_addr, "accepted connection");
                serve_connection(app, reader, writer, read_timeout).await;
            });
        }
    }
}

/// Serves every request arriving on one connection.
pub async fn serve_connection<R, W>(app: Arc<App>, reader: R, writer: W, read_timeout: Option<Duration>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let connection = HttpConnection::new(reader, writer).with_read_timeout(read_timeout);
    match connection.process(app).await {
        Ok(()) => info!("finished process, connection shutdown"),
        Err(e) => error!(cause = %e, "service has error, connection shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn app_dispatches_through_the_handler_seam() {
        let app = App::new().unwrap();
        assert!(format!("{app:?}").contains("router"));

        let request = Request::builder().uri("/forbidden").body(ReqBody::empty()).unwrap();
        let response = app.call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn server_debug_shows_config() {
        let server = Server::new(ServerConfig::default()).unwrap();
        let debug = format!("{server:?}");
        assert!(debug.contains("config"));
        assert!(debug.contains("3000"));
    }
}
