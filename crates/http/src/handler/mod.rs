//! The seam between a connection and the application.
//!
//! A connection hands every decoded request to a [`Handler`] and writes back the
//! buffered response it returns. Plain async functions can be adapted with
//! [`make_handler`].

use std::error::Error;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

use crate::protocol::body::ReqBody;

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Bytes>, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Response<Bytes>, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Bytes>, Self::Error> {
        (self.f)(req).await
    }
}

pub fn make_handler<F, Err, Fut>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Response<Bytes>, Err>>,
    F: Fn(Request<ReqBody>) -> Fut,
{
    HandlerFn { f }
}
