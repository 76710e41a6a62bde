/// One raw reading from the usage table.
///
/// `timestamp` is kept as the source text; parsing happens per query so that a
/// corrupt value fails the query that would have ranked it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageRecord {
    pub market_id: i64,
    pub usage_kw: f64,
    pub timestamp: String,
}

impl UsageRecord {
    pub fn new(market_id: i64, usage_kw: f64, timestamp: impl Into<String>) -> Self {
        Self {
            market_id,
            usage_kw,
            timestamp: timestamp.into(),
        }
    }
}
