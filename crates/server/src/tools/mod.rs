//! MCP tool implementations.
//!
//! This module contains all tools exposed by the shelter server.

pub mod control;
pub mod fetch;

pub use control::{ControlOutput, ControlParams, control_impl};
pub use fetch::{FetchOutput, FetchParams, fetch_impl};
