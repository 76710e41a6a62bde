pub mod join;
pub mod normalize;
pub mod query;
pub mod select;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use usage_client::MarketCode;

pub use normalize::{parse_timestamp, ReadingTime};
pub use query::{PeakQueryEngine, DEFAULT_K};

/// A usage reading joined to its market with a parsed timestamp. This is the
/// shape returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedUsage {
    pub usage_kw: f64,
    pub market_name: MarketCode,
    pub timestamp: ReadingTime,
}

pub type PeakResult = Vec<ResolvedUsage>;

/// Whether several peaks from one calendar day may all be returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    #[default]
    Raw,
    DailyMax,
}

impl DedupPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            DedupPolicy::Raw => "raw",
            DedupPolicy::DailyMax => "daily-max",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(DedupPolicy::Raw),
            "daily-max" | "daily_max" => Ok(DedupPolicy::DailyMax),
            other => Err(format!("unknown dedup policy '{other}', expected raw or daily-max")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_policy_parses() {
        assert_eq!("raw".parse::<DedupPolicy>(), Ok(DedupPolicy::Raw));
        assert_eq!("Daily-Max".parse::<DedupPolicy>(), Ok(DedupPolicy::DailyMax));
        assert_eq!("daily_max".parse::<DedupPolicy>(), Ok(DedupPolicy::DailyMax));
        assert!("weekly".parse::<DedupPolicy>().is_err());
    }

    #[test]
    fn resolved_usage_wire_shape() {
        let rec = ResolvedUsage {
            usage_kw: 996.0,
            market_name: MarketCode::Spp,
            timestamp: parse_timestamp("2022-07-26T13:48:00").unwrap(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "usage_kw": 996.0,
                "market_name": "spp",
                "timestamp": "2022-07-26T13:48:00"
            })
        );
    }
}
