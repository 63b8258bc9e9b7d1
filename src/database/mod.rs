//! LinkSaver database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! persistent local storage.
//!
//! # Usage
//!
//! ```no_run
//! use linksaver::database::Database;
//!
//! let db = Database::open("linksaver.db").expect("failed to open database");
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
