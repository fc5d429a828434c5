//! Shared wire definitions for the `Taskboard` REST contract.
//!
//! Every payload is plain JSON. Rust names are English; enum wire values
//! follow the backend's vocabulary (`"alta"`, `"en_revision"`, ...).

pub mod api;
pub mod assignment;
pub mod catalog;
pub mod ids;
pub mod task;
