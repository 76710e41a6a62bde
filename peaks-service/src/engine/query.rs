use std::{sync::Arc, time::Instant};

use usage_client::MarketCode;

use super::{join::join, normalize::normalize, select::select_peaks, DedupPolicy, PeakResult};
use crate::{error::PeakError, snapshot::SnapshotSource};

pub const DEFAULT_K: usize = 5;

/// Entry point for peak queries.
///
/// Checks run in a fixed order and each one short-circuits the rest:
/// market name, snapshot load, timestamp parsing, then join and selection.
/// Loading is the only I/O; the ranking phase works on a shared immutable
/// snapshot and holds no locks.
#[derive(Clone)]
pub struct PeakQueryEngine {
    source: Arc<dyn SnapshotSource>,
}

impl PeakQueryEngine {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Top five raw peaks for a market.
    pub async fn top_peaks(&self, market_name: &str) -> Result<PeakResult, PeakError> {
        self.get_top_k_peaks(market_name, DEFAULT_K, DedupPolicy::Raw).await
    }

    pub async fn get_top_k_peaks(
        &self,
        market_name: &str,
        k: usize,
        policy: DedupPolicy,
    ) -> Result<PeakResult, PeakError> {
        let started = Instant::now();
        metrics::counter!("peaks_queries_total").increment(1);

        let res = self.run(market_name, k, policy).await;

        metrics::histogram!("peaks_query_duration_seconds").record(started.elapsed().as_secs_f64());
        match &res {
            Ok(peaks) => {
                tracing::debug!(market_name, k, %policy, returned = peaks.len(), "peak query served");
            }
            Err(e) => {
                let category = e.category().as_str();
                metrics::counter!("peaks_query_failures_total", "category" => category).increment(1);
                tracing::warn!(market_name, k, %policy, category, error = %e, "peak query failed");
            }
        }
        res
    }

    async fn run(
        &self,
        market_name: &str,
        k: usize,
        policy: DedupPolicy,
    ) -> Result<PeakResult, PeakError> {
        let market: MarketCode = market_name
            .parse()
            .map_err(|_| PeakError::InvalidMarketName(market_name.to_string()))?;

        let snapshot = self.source.load().await?;

        let normalized = normalize(&snapshot.usage)?;
        let resolved = join(normalized, &snapshot.markets);
        select_peaks(resolved, market, k, policy)
    }
}
