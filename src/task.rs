use std::sync::Arc;
use std::thread::JoinHandle;

use crate::errors::FetchError;
use crate::gbif::{FetchResult, OccurrenceSource};

/// A species search running on its own worker thread.
///
/// The worker publishes exactly one [`FetchResult`] into a single-slot
/// channel as its last action. A dropped sender without a value means the
/// worker died, which is reported as [`FetchError::Worker`].
pub struct SearchTask {
    query: String,
    receiver: flume::Receiver<FetchResult>,
    worker: Option<JoinHandle<()>>,
}

impl SearchTask {
    pub fn spawn<S: OccurrenceSource>(source: Arc<S>, query: String) -> Self {
        let (tx, rx) = flume::bounded::<FetchResult>(1);
        let worker_query = query.clone();

        let worker = std::thread::Builder::new()
            .name("species-search".to_string())
            .spawn(move || {
                let result = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt.block_on(source.fetch(&worker_query)),
                    Err(e) => Err(FetchError::Transport(format!("failed to start runtime: {e}"))),
                };

                if let Err(e) = &result {
                    tracing::warn!(query = %worker_query, "search failed: {e}");
                }

                if tx.send(result).is_err() {
                    tracing::debug!(query = %worker_query, "search result dropped, UI no longer waiting");
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("failed to spawn search worker: {e}");
                None
            }
        };

        Self {
            query,
            receiver: rx,
            worker,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    #[cfg(test)]
    pub fn try_take(&self) -> Option<FetchResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(FetchError::Worker)),
        }
    }

    pub async fn wait(self) -> FetchResult {
        match self.receiver.recv_async().await {
            Ok(result) => result,
            Err(_) => self.worker_died(),
        }
    }

    /// The sender is only dropped without a value when the worker unwound,
    /// so the join returns promptly.
    fn worker_died(self) -> FetchResult {
        if let Some(handle) = self.worker {
            if handle.join().is_err() {
                tracing::error!(query = %self.query, "search worker panicked");
            }
        }
        Err(FetchError::Worker)
    }

    #[cfg(test)]
    pub fn wait_blocking(self) -> FetchResult {
        self.receiver.recv().unwrap_or(Err(FetchError::Worker))
    }
}
