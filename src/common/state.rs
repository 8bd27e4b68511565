use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::dashboard::{Snapshot, WateringTracker};

/// Holder for the current snapshot. Writers swap in a whole new snapshot;
/// readers get a cheap `Arc` and never hold the lock across awaits.
#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Compute the next snapshot from the current one.
    ///
    /// `f` returns `None` to leave the snapshot untouched. Returns whether the
    /// snapshot was replaced.
    pub async fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&Snapshot) -> Option<Snapshot>,
    {
        let mut guard = self.current.write().await;
        match f(&guard) {
            Some(next) => {
                *guard = Arc::new(next);
                true
            }
            None => false,
        }
    }
}

/// Monotonic request counter for one poll feed.
#[derive(Debug, Default)]
pub struct PollSequence(AtomicU64);

impl PollSequence {
    /// Issue the next sequence number (starting at 1).
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<BackendClient>,
    pub snapshot: Arc<SnapshotStore>,
    pub watering: WateringTracker,
    pub status_seq: Arc<PollSequence>,
    pub logs_seq: Arc<PollSequence>,
}

impl AppState {
    pub fn new(config: Config, backend: BackendClient) -> Self {
        let watering = WateringTracker::new(config.watering_message_hide());

        Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
            snapshot: Arc::new(SnapshotStore::default()),
            watering,
            status_seq: Arc::new(PollSequence::default()),
            logs_seq: Arc::new(PollSequence::default()),
        }
    }
}
