//! Shared wire types for the potluck coordination server.
//!
//! The `objects` module is always available. Enable the `client` feature for
//! the HTTP and WebSocket clients.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
