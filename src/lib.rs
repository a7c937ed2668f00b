//! ghpeek library
//!
//! Exposes the cache, resource and UI modules to the binary and to
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod data;
pub mod error;
pub mod resource;
pub mod ui;
