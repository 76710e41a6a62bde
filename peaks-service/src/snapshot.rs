use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use usage_client::{MarketCode, MarketRecord, UsageRecord};

use crate::error::PeakError;

/// Read-only market catalog keyed by market id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    by_id: HashMap<i64, MarketCode>,
}

impl ReferenceStore {
    /// Builds the store; a duplicated id means the reference table is corrupt.
    pub fn from_records<I>(records: I) -> Result<Self, PeakError>
    where
        I: IntoIterator<Item = MarketRecord>,
    {
        let mut by_id = HashMap::new();
        for rec in records {
            if let Some(prev) = by_id.insert(rec.id, rec.name) {
                return Err(PeakError::DataUnavailable(format!(
                    "duplicate market id {} ({prev} and {})",
                    rec.id, rec.name
                )));
            }
        }
        Ok(Self { by_id })
    }

    pub fn lookup(&self, market_id: i64) -> Option<MarketCode> {
        self.by_id.get(&market_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Immutable pair of reference data and usage rows a query runs against.
#[derive(Debug, Clone, Default)]
pub struct UsageSnapshot {
    pub markets: ReferenceStore,
    pub usage: Vec<UsageRecord>,
}

impl UsageSnapshot {
    pub fn new(markets: ReferenceStore, usage: Vec<UsageRecord>) -> Self {
        Self { markets, usage }
    }
}

#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self) -> Result<Arc<UsageSnapshot>, PeakError>;
}

/// Process-wide cache over another source.
///
/// The first caller loads while holding `load_gate`; concurrent first callers
/// wait on the gate and then see the published snapshot. `refresh` builds a new
/// snapshot and swaps the `Arc`; a published snapshot is never mutated.
pub struct CachedSnapshotSource {
    inner: Arc<dyn SnapshotSource>,
    current: RwLock<Option<Arc<UsageSnapshot>>>,
    load_gate: Mutex<()>,
}

impl CachedSnapshotSource {
    pub fn new(inner: Arc<dyn SnapshotSource>) -> Self {
        Self {
            inner,
            current: RwLock::new(None),
            load_gate: Mutex::new(()),
        }
    }

    pub async fn current(&self) -> Option<Arc<UsageSnapshot>> {
        self.current.read().await.clone()
    }

    /// Loads a fresh snapshot and publishes it. On failure the previous
    /// snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<UsageSnapshot>, PeakError> {
        let _gate = self.load_gate.lock().await;
        let fresh = self.inner.load().await?;
        *self.current.write().await = Some(fresh.clone());
        tracing::info!(
            markets = fresh.markets.len(),
            usage_rows = fresh.usage.len(),
            "usage snapshot refreshed"
        );
        Ok(fresh)
    }
}

#[async_trait::async_trait]
impl SnapshotSource for CachedSnapshotSource {
    async fn load(&self) -> Result<Arc<UsageSnapshot>, PeakError> {
        if let Some(snap) = self.current().await {
            return Ok(snap);
        }

        let _gate = self.load_gate.lock().await;
        if let Some(snap) = self.current().await {
            return Ok(snap);
        }

        let snap = self.inner.load().await?;
        *self.current.write().await = Some(snap.clone());
        tracing::info!(
            markets = snap.markets.len(),
            usage_rows = snap.usage.len(),
            "usage snapshot cached"
        );
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InMemorySource;
    use usage_client::MarketRecord;

    fn snapshot(rows: usize) -> UsageSnapshot {
        let markets = ReferenceStore::from_records([MarketRecord {
            id: 1,
            name: MarketCode::Spp,
        }])
        .unwrap();
        let usage = (0..rows)
            .map(|i| UsageRecord::new(1, i as f64, "2022-07-01T00:00:00"))
            .collect();
        UsageSnapshot::new(markets, usage)
    }

    #[test]
    fn reference_store_rejects_duplicate_ids() {
        let res = ReferenceStore::from_records([
            MarketRecord { id: 1, name: MarketCode::Spp },
            MarketRecord { id: 1, name: MarketCode::Pjm },
        ]);
        assert!(matches!(res, Err(PeakError::DataUnavailable(_))));
    }

    #[test]
    fn reference_store_lookup() {
        let store = ReferenceStore::from_records([
            MarketRecord { id: 1, name: MarketCode::Spp },
            MarketRecord { id: 7, name: MarketCode::Miso },
        ])
        .unwrap();
        assert_eq!(store.lookup(7), Some(MarketCode::Miso));
        assert_eq!(store.lookup(2), None);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_callers_load_once() {
        let inner = Arc::new(InMemorySource::new(snapshot(3)));
        let cache = Arc::new(CachedSnapshotSource::new(inner.clone()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.load().await }));
        }
        for h in handles {
            let snap = h.await.unwrap().unwrap();
            assert_eq!(snap.usage.len(), 3);
        }

        assert_eq!(inner.load_count(), 1);
    }

    #[tokio::test]
    async fn refresh_swaps_snapshot() {
        let inner = Arc::new(InMemorySource::new(snapshot(1)));
        let cache = CachedSnapshotSource::new(inner.clone());

        let first = cache.load().await.unwrap();
        inner.replace(snapshot(5));
        // Cached value is still served until refresh.
        assert_eq!(cache.load().await.unwrap().usage.len(), 1);

        let second = cache.refresh().await.unwrap();
        assert_eq!(second.usage.len(), 5);
        assert_eq!(cache.load().await.unwrap().usage.len(), 5);
        // The old snapshot is untouched.
        assert_eq!(first.usage.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let inner = Arc::new(InMemorySource::new(snapshot(2)));
        let cache = CachedSnapshotSource::new(inner.clone());
        cache.load().await.unwrap();

        inner.fail_with("markets table missing");
        let res = cache.refresh().await;
        assert!(matches!(res, Err(PeakError::DataUnavailable(_))));
        assert_eq!(cache.load().await.unwrap().usage.len(), 2);
    }
}
