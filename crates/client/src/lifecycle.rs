//! Generation lifecycle: install and activate.
//!
//! ```text
//! Parsed ──install──▶ Installing ──▶ Installed ──activate──▶ Activating ──▶ Activated
//!                         │                                      │
//!                         └────────────── failure ───────────────┴──▶ Redundant
//! ```
//!
//! Install pre-populates the current generation's asset namespace on a
//! best-effort basis and then asks the host to skip waiting. Activate
//! deletes every namespace outside the current generation and only then
//! claims open clients, so no client is ever served while stale
//! namespaces are still present.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use url::Url;

use crate::fetch::Transport;
use crate::host::Host;
use shelter_core::request::resolve;
use shelter_core::{CacheDb, CacheEntry, CacheNames, Error, RequestDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Parsed => "parsed",
            LifecyclePhase::Installing => "installing",
            LifecyclePhase::Installed => "installed",
            LifecyclePhase::Activating => "activating",
            LifecyclePhase::Activated => "activated",
            LifecyclePhase::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Outcome of the install phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Manifest URLs now in the pre-populated namespace.
    pub cached: Vec<String>,
    /// Manifest entries that were skipped, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Outcome of the activate phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    /// Stale namespaces removed from the store.
    pub deleted: Vec<String>,
}

#[derive(Clone)]
pub struct LifecycleController {
    db: CacheDb,
    transport: Arc<dyn Transport>,
    host: Arc<dyn Host>,
    names: CacheNames,
    origin: Url,
    manifest: Arc<Vec<String>>,
    phase: Arc<Mutex<LifecyclePhase>>,
}

impl LifecycleController {
    pub fn new(
        db: CacheDb, transport: Arc<dyn Transport>, host: Arc<dyn Host>, names: CacheNames, origin: Url,
        manifest: Vec<String>,
    ) -> Self {
        Self {
            db,
            transport,
            host,
            names,
            origin,
            manifest: Arc::new(manifest),
            phase: Arc::new(Mutex::new(LifecyclePhase::Parsed)),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, next: LifecyclePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Move from `expected` to `next`, rejecting repeated or out-of-order phases.
    fn transition(&self, expected: LifecyclePhase, next: LifecyclePhase) -> Result<(), Error> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != expected {
            return Err(Error::InvalidTransition { from: phase.to_string(), to: next.to_string() });
        }
        *phase = next;
        Ok(())
    }

    /// Pre-populate the asset namespace from the manifest.
    ///
    /// Entries that fail to resolve, fetch, or store are logged and skipped;
    /// they never abort the phase and are not retried.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(LifecyclePhase::Parsed, LifecyclePhase::Installing)?;
        tracing::info!(namespace = %self.names.precache, entries = self.manifest.len(), "installing");

        let namespace = self.db.open_namespace(&self.names.precache);
        let mut report = InstallReport::default();

        for entry in self.manifest.iter() {
            match self.precache_one(&namespace, entry).await {
                Ok(url) => report.cached.push(url),
                Err(reason) => {
                    tracing::warn!(entry = %entry, reason = %reason, "skipping manifest entry");
                    report.failed.push((entry.clone(), reason));
                }
            }
        }

        tracing::info!(cached = report.cached.len(), failed = report.failed.len(), "assets cached");

        self.host.skip_waiting().await;
        self.set_phase(LifecyclePhase::Installed);

        Ok(report)
    }

    async fn precache_one(&self, namespace: &shelter_core::Namespace, entry: &str) -> Result<String, String> {
        let url = resolve(&self.origin, entry).map_err(|e| e.to_string())?;
        let request = RequestDescriptor::from_url(url);

        let response = self.transport.fetch(&request).await.map_err(|e| e.to_string())?;
        if !response.is_cacheable() {
            return Err(format!("status {}", response.status));
        }

        namespace
            .put(&CacheEntry::capture(&request, &response))
            .await
            .map_err(|e| e.to_string())?;

        Ok(request.url.to_string())
    }

    /// Delete every namespace outside the current generation, then claim clients.
    ///
    /// A store failure is fatal to the phase and leaves the worker redundant.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(LifecyclePhase::Installed, LifecyclePhase::Activating)?;
        tracing::info!(precache = %self.names.precache, runtime = %self.names.runtime, "activating");

        let report = match self.collect_stale().await {
            Ok(report) => report,
            Err(e) => {
                self.set_phase(LifecyclePhase::Redundant);
                tracing::error!(error = %e, "activation failed");
                return Err(e);
            }
        };

        self.host.claim_clients().await;
        self.set_phase(LifecyclePhase::Activated);
        tracing::info!(deleted = report.deleted.len(), "activated");

        Ok(report)
    }

    async fn collect_stale(&self) -> Result<ActivateReport, Error> {
        let mut report = ActivateReport::default();

        for name in self.db.namespace_names().await? {
            if self.names.is_current(&name) {
                continue;
            }
            tracing::info!(namespace = %name, "deleting stale namespace");
            self.db.delete_namespace(&name).await?;
            report.deleted.push(name);
        }

        Ok(report)
    }
}
