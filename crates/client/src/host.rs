//! The environment hosting the worker.
//!
//! Lifecycle and auxiliary events end in calls the worker cannot make by
//! itself: skipping the waiting period, claiming open clients, showing a
//! notification, opening a window, running the external sync procedure.

use async_trait::async_trait;
use url::Url;

use crate::notify::Notification;
use shelter_core::Error;

#[async_trait]
pub trait Host: Send + Sync {
    /// Activate this generation without waiting for old clients to close.
    async fn skip_waiting(&self);

    /// Route already-open clients to this generation without a reload.
    async fn claim_clients(&self);

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn open_window(&self, url: &Url) -> Result<(), Error>;

    /// Run the background-sync procedure registered under `tag`.
    async fn sync(&self, tag: &str) -> Result<(), Error>;
}
