//! A tiny HTTP server that answers a fixed set of paths with canned JSON or XML payloads.
//!
//! Requests come in through [`canned_http`]. The [`router`] matches the path against a
//! static table, POST bodies are collected and parsed by the [`body`] reader, and one of
//! the [`handlers`] picks a canned payload that the [`emit`] functions turn into a response
//! in the [`representation`] the client asked for.

pub mod assets;
pub mod body;
pub mod config;
pub mod emit;
pub mod handlers;
pub mod representation;
pub mod request;
pub mod router;
mod server;

pub use server::{App, Server, ServerError, serve_connection};
