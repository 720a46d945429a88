//! Event dispatch.
//!
//! Every inbound trigger is a [`WorkerEvent`]. Dispatching never blocks:
//! an intercepted request becomes its own spawned task, and lifecycle,
//! control and auxiliary events register their work on a
//! [`LifecycleBarrier`] that the host settles.

use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use crate::background::Background;
use crate::barrier::LifecycleBarrier;
use crate::control::{Control, ControlMessage};
use crate::fetch::Transport;
use crate::host::Host;
use crate::lifecycle::LifecycleController;
use crate::notify::push_notification;
use crate::strategy::StrategyExecutor;
use shelter_core::{AppConfig, CacheDb, CacheNames, Classifier, Error, RequestDescriptor, Response, Strategy};

#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(RequestDescriptor),
    Message(ControlMessage),
    Sync(String),
    Push(Option<String>),
    NotificationClick,
}

/// What the host must do after dispatching an event.
#[derive(Debug)]
pub enum Dispatch {
    /// Not intercepted; the host performs the request itself.
    Passthrough,
    /// Intercepted; the response arrives on the handle.
    RespondWith { strategy: Strategy, response: JoinHandle<Option<Response>> },
    /// Settle the barrier before treating the event as handled.
    WaitUntil(LifecycleBarrier),
}

#[derive(Clone)]
pub struct Worker {
    config: Arc<AppConfig>,
    db: CacheDb,
    names: CacheNames,
    root_url: Url,
    classifier: Arc<Classifier>,
    executor: StrategyExecutor,
    lifecycle: LifecycleController,
    control: Control,
    host: Arc<dyn Host>,
}

impl Worker {
    pub fn new(
        config: AppConfig, db: CacheDb, transport: Arc<dyn Transport>, host: Arc<dyn Host>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let root_url = config.root_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let names = config.cache_names();

        let executor =
            StrategyExecutor::new(transport.clone(), db.clone(), names.clone(), &root_url, Background::new());
        let lifecycle = LifecycleController::new(
            db.clone(),
            transport,
            host.clone(),
            names.clone(),
            origin,
            config.manifest.clone(),
        );
        let control = Control::new(db.clone(), host.clone(), names.clone());
        let classifier = Arc::new(Classifier::new(&config.classifier));

        Ok(Self { config: Arc::new(config), db, names, root_url, classifier, executor, lifecycle, control, host })
    }

    pub fn dispatch(&self, event: WorkerEvent) -> Dispatch {
        match event {
            WorkerEvent::Fetch(request) => self.intercept(request),
            WorkerEvent::Install => {
                let lifecycle = self.lifecycle.clone();
                self.barrier(async move { lifecycle.install().await.map(drop) })
            }
            WorkerEvent::Activate => {
                let lifecycle = self.lifecycle.clone();
                self.barrier(async move { lifecycle.activate().await.map(drop) })
            }
            WorkerEvent::Message(message) => {
                let control = self.control.clone();
                self.barrier(async move { control.handle(message).await })
            }
            WorkerEvent::Sync(tag) => {
                if tag != self.config.sync_tag {
                    tracing::debug!(tag = %tag, "ignoring unknown sync tag");
                    return Dispatch::WaitUntil(LifecycleBarrier::new());
                }
                tracing::info!(tag = %tag, "background sync triggered");
                let host = self.host.clone();
                self.barrier(async move { host.sync(&tag).await })
            }
            WorkerEvent::Push(payload) => {
                let notification =
                    push_notification(&self.config.app_name, &self.config.notification, payload.as_deref());
                let host = self.host.clone();
                self.barrier(async move { host.show_notification(&notification).await })
            }
            WorkerEvent::NotificationClick => {
                let host = self.host.clone();
                let root = self.root_url.clone();
                self.barrier(async move { host.open_window(&root).await })
            }
        }
    }

    fn intercept(&self, request: RequestDescriptor) -> Dispatch {
        let Some(strategy) = self.classifier.classify(&request) else {
            return Dispatch::Passthrough;
        };

        tracing::debug!(url = %request.url, strategy = %strategy, "intercepted");
        let executor = self.executor.clone();
        let response = tokio::spawn(async move { executor.execute(strategy, &request).await });

        Dispatch::RespondWith { strategy, response }
    }

    fn barrier<F>(&self, work: F) -> Dispatch
    where
        F: std::future::Future<Output = Result<(), Error>> + Send + 'static,
    {
        let mut barrier = LifecycleBarrier::new();
        barrier.wait_until(work);
        Dispatch::WaitUntil(barrier)
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn names(&self) -> &CacheNames {
        &self.names
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    /// Detached writes and refreshes still in flight.
    pub fn background(&self) -> &Background {
        self.executor.background()
    }
}
