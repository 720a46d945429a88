//! Scripted transport and recording host for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use url::Url;

use crate::fetch::Transport;
use crate::host::Host;
use crate::notify::Notification;
use shelter_core::{Error, RequestDescriptor, Response};

/// Transport answering from a fixed route table.
///
/// Unknown URLs fail as if the network were down. A gated transport holds
/// every fetch until [`MockTransport::release`] is called.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Response>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl MockTransport {
    /// A transport for which every fetch fails.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self { gate: Some(Arc::new(Semaphore::new(0))), ..Default::default() }
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        let response = Response::new(status, vec![("content-type".into(), "text/plain".into())], body.to_string());
        self.routes.lock().unwrap().insert(url.to_string(), response);
        self
    }

    /// Let `n` held fetches proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fetches that have produced an outcome.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::NetworkUnreachable(e.to_string()))?
                .forget();
        }

        let outcome = self
            .routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::NetworkUnreachable(format!("no route to {}", request.url)));

        self.completed.fetch_add(1, Ordering::SeqCst);
        outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    SkipWaiting,
    ClaimClients,
    Notification(Notification),
    OpenWindow(Url),
    Sync(String),
}

#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) {
        self.record(HostCall::SkipWaiting);
    }

    async fn claim_clients(&self) {
        self.record(HostCall::ClaimClients);
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.record(HostCall::Notification(notification.clone()));
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostCall::OpenWindow(url.clone()));
        Ok(())
    }

    async fn sync(&self, tag: &str) -> Result<(), Error> {
        self.record(HostCall::Sync(tag.to_string()));
        Ok(())
    }
}
