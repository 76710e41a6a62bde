use std::sync::Arc;

use sqlx::PgPool;
use usage_client::db::{load_markets, load_usage};

use crate::{
    error::PeakError,
    snapshot::{ReferenceStore, SnapshotSource, UsageSnapshot},
};

/// Reads `markets` and `energy_usage` from QuestDB over pgwire.
///
/// Timestamps arrive as QuestDB's UTC text (`...000000Z`), so results from
/// this source render as RFC 3339 with `Z` and group by UTC date under
/// daily-max.
pub struct QuestDbSource {
    pool: PgPool,
}

impl QuestDbSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for QuestDbSource {
    async fn load(&self) -> Result<Arc<UsageSnapshot>, PeakError> {
        let markets = load_markets(&self.pool)
            .await
            .map_err(|e| PeakError::unavailable("failed to load markets", format!("{e:#}")))?;
        let markets = ReferenceStore::from_records(markets)?;

        let usage = load_usage(&self.pool)
            .await
            .map_err(|e| PeakError::unavailable("failed to load energy usage", format!("{e:#}")))?;

        tracing::debug!(markets = markets.len(), usage_rows = usage.len(), "loaded snapshot from questdb");
        Ok(Arc::new(UsageSnapshot::new(markets, usage)))
    }
}
