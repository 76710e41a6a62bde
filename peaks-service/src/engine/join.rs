use super::{normalize::NormalizedUsage, ResolvedUsage};
use crate::snapshot::ReferenceStore;

/// Resolves each row's market through the reference store.
///
/// Rows whose `market_id` is unknown are dropped rather than failing the query:
/// a dangling foreign key is a data quality issue local to that row. Contrast
/// with timestamps, where one bad value aborts the query.
pub fn join(records: Vec<NormalizedUsage>, markets: &ReferenceStore) -> Vec<ResolvedUsage> {
    let total = records.len();
    let resolved: Vec<ResolvedUsage> = records
        .into_iter()
        .filter_map(|rec| match markets.lookup(rec.market_id) {
            Some(market_name) => Some(ResolvedUsage {
                usage_kw: rec.usage_kw,
                market_name,
                timestamp: rec.timestamp,
            }),
            None => {
                tracing::debug!(market_id = rec.market_id, "dropping usage row with unknown market id");
                None
            }
        })
        .collect();

    let dropped = total - resolved.len();
    if dropped > 0 {
        metrics::counter!("peaks_unresolved_usage_total").increment(dropped as u64);
    }

    resolved
}
