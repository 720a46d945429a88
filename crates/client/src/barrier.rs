//! Lifecycle barrier.
//!
//! An event handler registers its asynchronous work with the barrier; the
//! host settles the barrier before it considers the event handled. This
//! keeps the process alive through a phase without serializing unrelated
//! work such as fetch interception.

use std::future::Future;

use tokio::task::JoinHandle;

use shelter_core::Error;

#[derive(Debug, Default)]
pub struct LifecycleBarrier {
    pending: Vec<JoinHandle<Result<(), Error>>>,
}

impl LifecycleBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `work`; it starts running immediately.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.pending.push(tokio::spawn(work));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for every registered task.
    ///
    /// All tasks run to completion; the first failure is returned.
    pub async fn settle(self) -> Result<(), Error> {
        let mut first_err = None;

        for handle in self.pending {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join) => Err(Error::from(join)),
            };

            if let Err(e) = outcome
                && first_err.is_none()
            {
                first_err = Some(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
