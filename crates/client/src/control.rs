//! Out-of-band control commands from the host application.
//!
//! Wire format: `{"command": "SKIP_WAITING"}`, `{"command": "CLEAR_CACHE"}`
//! (reply `{"success": true}`), `{"command": "GET_VERSION"}` (reply
//! `{"version": "<precache namespace>"}`). Anything else is ignored
//! without a reply.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::host::Host;
use shelter_core::{CacheDb, CacheNames, Error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCommand {
    SkipWaiting,
    ClearCache,
    GetVersion,
    #[serde(other)]
    Unknown,
}

impl ControlCommand {
    /// Parse a raw message; anything unrecognized becomes `Unknown`.
    pub fn parse(message: &serde_json::Value) -> Self {
        serde_json::from_value(message.clone()).unwrap_or(ControlCommand::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    Cleared { success: bool },
    Version { version: String },
}

/// A command together with the channel its reply goes to.
#[derive(Debug)]
pub struct ControlMessage {
    pub command: ControlCommand,
    pub reply: Option<oneshot::Sender<ControlReply>>,
}

impl ControlMessage {
    /// A command plus the receiving end of its reply channel.
    pub fn with_reply(command: ControlCommand) -> (Self, oneshot::Receiver<ControlReply>) {
        let (tx, rx) = oneshot::channel();
        (Self { command, reply: Some(tx) }, rx)
    }
}

#[derive(Clone)]
pub struct Control {
    db: CacheDb,
    host: Arc<dyn Host>,
    names: CacheNames,
}

impl Control {
    pub fn new(db: CacheDb, host: Arc<dyn Host>, names: CacheNames) -> Self {
        Self { db, host, names }
    }

    pub async fn handle(&self, message: ControlMessage) -> Result<(), Error> {
        let ControlMessage { command, reply } = message;

        match command {
            ControlCommand::SkipWaiting => {
                self.host.skip_waiting().await;
            }
            ControlCommand::ClearCache => {
                let deleted = self.purge_all().await?;
                tracing::info!(deleted, "all caches cleared");
                send(reply, ControlReply::Cleared { success: true });
            }
            ControlCommand::GetVersion => {
                send(reply, ControlReply::Version { version: self.names.precache.clone() });
            }
            ControlCommand::Unknown => {
                tracing::debug!("ignoring unrecognized control command");
            }
        }

        Ok(())
    }

    /// Delete every namespace regardless of generation.
    pub async fn purge_all(&self) -> Result<usize, Error> {
        let names = self.db.namespace_names().await?;
        for name in &names {
            self.db.delete_namespace(name).await?;
        }
        Ok(names.len())
    }
}

fn send(reply: Option<oneshot::Sender<ControlReply>>, message: ControlReply) {
    match reply {
        Some(tx) => {
            if tx.send(message).is_err() {
                tracing::debug!("control reply dropped: receiver gone");
            }
        }
        None => tracing::debug!("control command carried no reply channel"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HostCall, RecordingHost};
    use serde_json::json;
    use shelter_core::{CacheEntry, RequestDescriptor, Response};

    async fn control() -> (Control, CacheDb, Arc<RecordingHost>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let host = Arc::new(RecordingHost::default());
        (Control::new(db.clone(), host.clone(), CacheNames::new("app", "2")), db, host)
    }

    async fn seed(db: &CacheDb, namespace: &str, url: &str) {
        let request = RequestDescriptor::get(url).unwrap();
        let entry = CacheEntry::capture(&request, &Response::new(200, Vec::new(), "x"));
        db.open_namespace(namespace).put(&entry).await.unwrap();
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ControlCommand::parse(&json!({"command": "SKIP_WAITING"})), ControlCommand::SkipWaiting);
        assert_eq!(ControlCommand::parse(&json!({"command": "CLEAR_CACHE"})), ControlCommand::ClearCache);
        assert_eq!(ControlCommand::parse(&json!({"command": "GET_VERSION"})), ControlCommand::GetVersion);
        assert_eq!(ControlCommand::parse(&json!({"command": "REBOOT"})), ControlCommand::Unknown);
        assert_eq!(ControlCommand::parse(&json!({"type": "GET_VERSION"})), ControlCommand::Unknown);
        assert_eq!(ControlCommand::parse(&json!("GET_VERSION")), ControlCommand::Unknown);
    }

    #[test]
    fn test_reply_wire_format() {
        let cleared = serde_json::to_value(ControlReply::Cleared { success: true }).unwrap();
        assert_eq!(cleared, json!({"success": true}));
        let version = serde_json::to_value(ControlReply::Version { version: "app-v2".into() }).unwrap();
        assert_eq!(version, json!({"version": "app-v2"}));
    }

    #[tokio::test]
    async fn test_clear_cache_deletes_everything_then_replies() {
        let (control, db, _) = control().await;
        seed(&db, "app-v1", "https://app.example/a").await;
        seed(&db, "app-v2", "https://app.example/b").await;
        seed(&db, "app-runtime-v2", "https://app.example/c").await;

        let (message, rx) = ControlMessage::with_reply(ControlCommand::ClearCache);
        control.handle(message).await.unwrap();

        assert!(db.namespace_names().await.unwrap().is_empty());
        assert_eq!(rx.await.unwrap(), ControlReply::Cleared { success: true });
    }

    #[tokio::test]
    async fn test_get_version_reports_precache_name() {
        let (control, db, _) = control().await;
        seed(&db, "app-runtime-v2", "https://app.example/c").await;

        let (message, rx) = ControlMessage::with_reply(ControlCommand::GetVersion);
        control.handle(message).await.unwrap();

        assert_eq!(rx.await.unwrap(), ControlReply::Version { version: "app-v2".into() });
    }

    #[tokio::test]
    async fn test_skip_waiting_has_no_reply() {
        let (control, _, host) = control().await;

        let (message, rx) = ControlMessage::with_reply(ControlCommand::SkipWaiting);
        control.handle(message).await.unwrap();

        assert_eq!(host.calls(), vec![HostCall::SkipWaiting]);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let (control, db, host) = control().await;
        seed(&db, "app-v2", "https://app.example/b").await;

        let (message, rx) = ControlMessage::with_reply(ControlCommand::Unknown);
        control.handle(message).await.unwrap();

        assert!(rx.await.is_err());
        assert!(host.calls().is_empty());
        assert_eq!(db.namespace_names().await.unwrap().len(), 1);
    }
}
