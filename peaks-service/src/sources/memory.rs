use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::{
    error::PeakError,
    snapshot::{SnapshotSource, UsageSnapshot},
};

/// Serves a snapshot held in memory. Counts loads so callers can observe
/// whether data was touched.
pub struct InMemorySource {
    state: Mutex<Result<Arc<UsageSnapshot>, String>>,
    loads: AtomicUsize,
}

impl InMemorySource {
    pub fn new(snapshot: UsageSnapshot) -> Self {
        Self {
            state: Mutex::new(Ok(Arc::new(snapshot))),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Serve `snapshot` on subsequent loads.
    pub fn replace(&self, snapshot: UsageSnapshot) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = Ok(Arc::new(snapshot));
    }

    /// Make subsequent loads fail with `DataUnavailable`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = Err(reason.into());
    }
}

#[async_trait::async_trait]
impl SnapshotSource for InMemorySource {
    async fn load(&self) -> Result<Arc<UsageSnapshot>, PeakError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .map_err(PeakError::DataUnavailable)
    }
}
