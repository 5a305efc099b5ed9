//! Library crate for blind-test-back, exposing modules for binaries and integration tests.

/// Playlist loading and random song draws.
pub mod catalog;
/// Environment driven configuration.
pub mod config;
/// Wire types shared with clients.
pub mod dto;
/// Error types for each layer.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Game logic and connection handling.
pub mod services;
/// Shared application state.
pub mod state;
