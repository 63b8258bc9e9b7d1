//! LinkSaver: save links with auto-generated page summaries.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod clock;
pub mod database;
pub mod debounce;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
