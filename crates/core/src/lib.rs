//! Core types and shared functionality for shelter.
//!
//! This crate provides:
//! - The namespaced response cache with a SQLite backend
//! - Request and response types
//! - The request classification dispatcher
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, CacheEntry, Namespace};
pub use classify::{Classifier, ClassifierConfig, RuleConfig, Strategy};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
pub use request::{RequestDescriptor, Response};
