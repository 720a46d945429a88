//! Host boundary for the stdio server.
//!
//! There is no browser behind the server: page-facing effects are
//! reported through tracing so the embedding application can act on them.

use async_trait::async_trait;
use url::Url;

use shelter_client::{Host, Notification};
use shelter_core::Error;

#[derive(Debug, Default)]
pub struct LoggingHost;

#[async_trait]
impl Host for LoggingHost {
    async fn skip_waiting(&self) {
        tracing::info!("skip waiting");
    }

    async fn claim_clients(&self) {
        tracing::info!("claiming clients");
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            icon = %notification.icon,
            arrived = notification.data.date_of_arrival,
            "show notification"
        );
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(url = %url, "open window");
        Ok(())
    }

    async fn sync(&self, tag: &str) -> Result<(), Error> {
        tracing::info!(tag = %tag, "syncing data");
        Ok(())
    }
}
