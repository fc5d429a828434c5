//! `Taskboard`: task board client library.
//!
//! Loads tasks with their assignments from a REST backend, derives grouped
//! and filtered views, and persists inline edits through a debounced
//! synchronizer. The terminal front-end lives in [`app`] and [`ui`].

pub mod app;
pub mod board;
pub mod config;
pub mod gateway;
pub mod store;
pub mod sync;
pub mod tasks;
pub mod ui;
