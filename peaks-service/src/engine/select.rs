use std::collections::{HashMap, HashSet};

use time::Date;
use usage_client::MarketCode;

use super::{DedupPolicy, ResolvedUsage};
use crate::error::PeakError;

/// Picks the top `k` readings for `market`, highest usage first.
///
/// Ordering is stable: equal `usage_kw` values keep their input order. Under
/// [`DedupPolicy::DailyMax`] each calendar date contributes at most one
/// reading, the first-seen maximum for that date.
pub fn select_peaks(
    resolved: Vec<ResolvedUsage>,
    market: MarketCode,
    k: usize,
    policy: DedupPolicy,
) -> Result<Vec<ResolvedUsage>, PeakError> {
    let candidates: Vec<ResolvedUsage> = resolved
        .into_iter()
        .filter(|r| r.market_name == market)
        .collect();

    if candidates.is_empty() {
        return Err(PeakError::MarketNotFound(market));
    }

    let mut ranked = match policy {
        DedupPolicy::Raw => candidates,
        DedupPolicy::DailyMax => daily_max(candidates),
    };

    ranked.sort_by(|a, b| b.usage_kw.total_cmp(&a.usage_kw));
    ranked.truncate(k);
    Ok(ranked)
}

/// Keeps one reading per calendar date, the first-seen maximum. Survivors
/// stay in input order so the stable ranking sort still breaks ties by input
/// position.
fn daily_max(candidates: Vec<ResolvedUsage>) -> Vec<ResolvedUsage> {
    let mut winner_by_date: HashMap<Date, usize> = HashMap::new();

    for (idx, rec) in candidates.iter().enumerate() {
        winner_by_date
            .entry(rec.timestamp.date())
            .and_modify(|winner| {
                if rec.usage_kw > candidates[*winner].usage_kw {
                    *winner = idx;
                }
            })
            .or_insert(idx);
    }

    let winners: HashSet<usize> = winner_by_date.into_values().collect();
    candidates
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| winners.contains(idx))
        .map(|(_, rec)| rec)
        .collect()
}
