//! The application's view of a request.

use std::collections::HashMap;

use canned_http::protocol::RequestHeader;
use http::{HeaderMap, Method};
use tracing::warn;

use crate::body::ParsedBody;
use crate::representation::Representation;

/// A request head with its query string decoded.
///
/// `body` is filled in by the Body Reader for POST requests. No handler reads it, it is
/// kept for handlers that may want to.
#[derive(Debug)]
pub struct IncomingRequest {
    header: RequestHeader,
    query: HashMap<String, String>,
    body: Option<ParsedBody>,
}

impl IncomingRequest {
    pub fn new(header: RequestHeader) -> Self {
        let query = parse_query(header.uri().query());
        Self { header, query, body: None }
    }

    pub fn method(&self) -> &Method {
        self.header.method()
    }

    pub fn path(&self) -> &str {
        self.header.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.header.headers()
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Whether `name` appears in the query string, whatever its value.
    pub fn has_query_flag(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    pub fn representation(&self) -> Representation {
        Representation::from_headers(self.headers())
    }

    pub fn body(&self) -> Option<&ParsedBody> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: ParsedBody) {
        self.body = Some(body);
    }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let Some(query) = query.filter(|query| !query.is_empty()) else {
        return HashMap::new();
    };

    // nested keys like `a[b]=1` don't fit a flat map, fall back to plain pairs
    serde_qs::from_str::<HashMap<String, String>>(query)
        .or_else(|e| {
            warn!(cause = %e, query, "query string is not flat, reading plain pairs");
            serde_urlencoded::from_str::<Vec<(String, String)>>(query).map(|pairs| pairs.into_iter().collect())
        })
        .unwrap_or_else(|e| {
            warn!(cause = %e, query, "can't decode query string");
            HashMap::new()
        })
}
