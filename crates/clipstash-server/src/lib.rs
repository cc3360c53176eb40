//! Clipstash server library - HTTP/WebSocket surface over the clipboard history.
//!
//! Routes, the events socket, retention and application state live here so
//! integration tests can drive the router without binding a port.

pub mod config;
pub mod global_ws;
pub mod logging;
pub mod retention;
pub mod routes;
pub mod state;
