//! Client code for shelter.
//!
//! This crate provides the network transport, the caching strategy
//! executors, the generation lifecycle and the event dispatcher the server
//! drives.

pub mod background;
pub mod barrier;
pub mod control;
pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod notify;
pub mod strategy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use background::Background;
pub use barrier::LifecycleBarrier;
pub use control::{Control, ControlCommand, ControlMessage, ControlReply};
pub use fetch::{FetchClient, FetchConfig, Transport};
pub use host::Host;
pub use lifecycle::{ActivateReport, InstallReport, LifecycleController, LifecyclePhase};
pub use notify::{Notification, NotificationData, push_notification};
pub use strategy::StrategyExecutor;
pub use worker::{Dispatch, Worker, WorkerEvent};
