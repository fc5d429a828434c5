//! In-memory development backend for Taskboard.
//!
//! Serves the same REST contract the client's HTTP gateway speaks, over
//! data held in memory. Used by the integration tests and for running the
//! TUI locally.

pub mod api;
pub mod config;
pub mod store;
