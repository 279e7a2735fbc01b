//! bookshelf-rs: a reader server for pre-processed ebooks.
//!
//! Each book lives in its own `<slug>_data` folder holding a `book.json`
//! record and an `images/` directory. Books are addressed over HTTP by slug
//! rather than by folder name.
//!
//! # Features
//!
//! - Directory scan of book folders with an LRU record cache
//! - Slug resolution with a fallback for records that predate stored slugs
//! - Chapter reader with previous/next navigation
//! - Path-safe image serving
//! - Offline migration of folders to canonical, transliterated slugs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// Book records, store and migration.
pub mod library;
/// HTTP server.
pub mod server;


pub use config::{Cli, Command, Config};
pub use error::{AppError, Result};
pub use library::BookStore;
pub use server::AppState;
