//! The route table.
//!
//! Paths are matched exactly against a table built once at startup. Any path not in it
//! is answered by the not-found handler. POST requests pass through the Body Reader
//! before reaching the same target a GET would.

use bytes::Bytes;
use canned_http::protocol::RequestHeader;
use http::{Method, Request, Response};
use http_body::Body;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::assets;
use crate::body::read_body;
use crate::handlers::StatusHandler;
use crate::request::IncomingRequest;

/// What a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Stylesheet,
    Status(StatusHandler),
}

const ROUTES: [(&str, Route); 8] = [
    ("/", Route::Index),
    ("/style.css", Route::Stylesheet),
    ("/success", Route::Status(StatusHandler::Success)),
    ("/badRequest", Route::Status(StatusHandler::BadRequest)),
    ("/unauthorized", Route::Status(StatusHandler::Unauthorized)),
    ("/forbidden", Route::Status(StatusHandler::Forbidden)),
    ("/internal", Route::Status(StatusHandler::Internal)),
    ("/notImplemented", Route::Status(StatusHandler::NotImplemented)),
];

#[derive(Debug)]
pub struct Router {
    inner_router: matchit::Router<Route>,
}

impl Router {
    pub fn new() -> Result<Self, matchit::InsertError> {
        let mut inner_router = matchit::Router::new();
        for (path, route) in ROUTES {
            inner_router.insert(path, route)?;
        }
        Ok(Self { inner_router })
    }

    pub fn at(&self, path: &str) -> Route {
        self.inner_router.at(path).map(|matched| *matched.value).unwrap_or(Route::Status(StatusHandler::NotFound))
    }

    /// Routes `request` and produces its response.
    pub async fn dispatch<B>(&self, request: Request<B>) -> Response<Bytes>
    where
        B: Body<Data = Bytes>,
        B::Error: Display,
    {
        let (parts, body) = request.into_parts();
        let mut request = IncomingRequest::new(RequestHeader::from(parts));
        let route = self.at(request.path());
        debug!(method = %request.method(), path = request.path(), ?route, "dispatch request");

        if request.method() == Method::POST {
            match read_body(request.headers(), body).await {
                Ok(parsed) => request.set_body(parsed),
                Err(e) => {
                    warn!(cause = %e, path = request.path(), "rejecting request body");
                    return e.to_response(request.method());
                }
            }
        }

        route.respond(&request)
    }
}

impl Route {
    pub fn respond(self, request: &IncomingRequest) -> Response<Bytes> {
        match self {
            Route::Index => assets::index(request.method()),
            Route::Stylesheet => assets::stylesheet(request.method()),
            Route::Status(handler) => {
                let query_flag = handler.query_flag_name().is_some_and(|name| request.has_query_flag(name));
                handler.respond(request, request.representation(), query_flag)
            }
        }
    }
}
