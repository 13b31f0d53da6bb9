//! Status handlers.
//!
//! Each handler answers with one of two hardcoded payloads, picked by the query flag
//! where the endpoint has one, in the representation the client asked for.

use bytes::Bytes;
use http::{Response, StatusCode};
use serde::Serialize;

use crate::emit::{emit_json, emit_xml};
use crate::representation::Representation;
use crate::request::IncomingRequest;

/// JSON payload of a canned response, serialized as `message` then `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CannedMessage {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'static str>,
}

/// A status and the payload in both representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canned {
    pub status: StatusCode,
    pub json: CannedMessage,
    pub xml: &'static str,
}

const fn canned(status: StatusCode, message: &'static str, id: Option<&'static str>, xml: &'static str) -> Canned {
    Canned { status, json: CannedMessage { message, id }, xml }
}

const SUCCESS: Canned = canned(
    StatusCode::OK,
    "This is a successful response",
    None,
    "<response><message>This is a successful message</message></response>",
);

const NOT_FOUND: Canned = canned(
    StatusCode::NOT_FOUND,
    "The page you are looking for was not found.",
    Some("notFound"),
    "<response><message>The page you are looking for was not found</message><id>notFound</id></response>",
);

const FORBIDDEN: Canned = canned(
    StatusCode::FORBIDDEN,
    "You do not have access to this content",
    Some("forbidden"),
    "<response><message>You do not have access to this content</message><id>forbidden</id></response>",
);

const INTERNAL: Canned = canned(
    StatusCode::INTERNAL_SERVER_ERROR,
    "Internal server error, something went wrong.",
    Some("internalError"),
    "<response><message>Internal server error, something went wrong</message><id>internalError</id></response>",
);

const NOT_IMPLEMENTED: Canned = canned(
    StatusCode::NOT_IMPLEMENTED,
    "A get request for this page has not been implemented yet. Check again later for updated content",
    Some("notImplemented"),
    "<response><message>A get request for this page has not been implemented yet. Check again later for updated content</message><id>notImplemented</id></response>",
);

const BAD_REQUEST: Canned = canned(
    StatusCode::BAD_REQUEST,
    "Missing valid query parameter set to true",
    Some("badRequest"),
    "<response><message>Missing valid query parameter set to true</message><id>badRequest</id></response>",
);

const BAD_REQUEST_VALID: Canned = canned(
    StatusCode::OK,
    "This request has the required parameters",
    None,
    "<response><message>This request has the required parameters</message></response>",
);

const UNAUTHORIZED: Canned = canned(
    StatusCode::UNAUTHORIZED,
    "Missing loggedIn query parameter set to yes",
    Some("unauthorized"),
    "<response><message>Missing loggedIn queryParameter set to yet</message><id>unauthorized</id></response>",
);

const UNAUTHORIZED_LOGGED_IN: Canned = canned(
    StatusCode::OK,
    "You have successfully viewed the content",
    None,
    "<response><message>You have successfully viewed the content</message></response>",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHandler {
    Success,
    BadRequest,
    Unauthorized,
    Forbidden,
    Internal,
    NotImplemented,
    NotFound,
}

impl StatusHandler {
    /// The query parameter whose presence switches this handler to its 200 answer.
    pub fn query_flag_name(self) -> Option<&'static str> {
        match self {
            StatusHandler::BadRequest => Some("valid"),
            StatusHandler::Unauthorized => Some("loggedIn"),
            _ => None,
        }
    }

    /// The canned answer for `query_flag`, which only `BadRequest` and `Unauthorized` look at.
    pub fn canned(self, query_flag: bool) -> Canned {
        match (self, query_flag) {
            (StatusHandler::Success, _) => SUCCESS,
            (StatusHandler::BadRequest, false) => BAD_REQUEST,
            (StatusHandler::BadRequest, true) => BAD_REQUEST_VALID,
            (StatusHandler::Unauthorized, false) => UNAUTHORIZED,
            (StatusHandler::Unauthorized, true) => UNAUTHORIZED_LOGGED_IN,
            (StatusHandler::Forbidden, _) => FORBIDDEN,
            (StatusHandler::Internal, _) => INTERNAL,
            (StatusHandler::NotImplemented, _) => NOT_IMPLEMENTED,
            (StatusHandler::NotFound, _) => NOT_FOUND,
        }
    }

    pub fn respond(self, request: &IncomingRequest, representation: Representation, query_flag: bool) -> Response<Bytes> {
        let canned = self.canned(query_flag);
        match representation {
            Representation::Json => emit_json(request.method(), canned.status, &canned.json),
            Representation::Xml => emit_xml(request.method(), canned.status, canned.xml),
        }
    }
}
