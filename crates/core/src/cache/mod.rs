//! SQLite-backed namespace store.
//!
//! Cached responses live in named namespaces (generations). The store
//! supports per-namespace get/put, a cross-namespace match, namespace
//! enumeration and whole-namespace deletion. It persists across process
//! restarts and runs statements on a tokio-rusqlite background thread.

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod namespace;

pub use crate::Error;

pub use connection::CacheDb;
pub use namespace::{CacheEntry, Namespace};
