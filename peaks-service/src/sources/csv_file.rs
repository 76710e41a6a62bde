use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

use csv::StringRecord;
use usage_client::{MarketCode, MarketRecord, UsageRecord};

use crate::{
    error::PeakError,
    snapshot::{ReferenceStore, SnapshotSource, UsageSnapshot},
};

/// Loads a snapshot from two CSV files on every call.
///
/// Expected header columns (by name):
/// - markets: `id`, `name`
/// - usage: `market_id`, `usage_kw`, `timestamp`
///
/// Timestamps are kept as text; parsing belongs to the query.
pub struct CsvFileSource {
    markets_path: PathBuf,
    usage_path: PathBuf,
}

impl CsvFileSource {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(markets_path: P, usage_path: Q) -> Self {
        Self {
            markets_path: markets_path.into(),
            usage_path: usage_path.into(),
        }
    }

    fn load_blocking(markets_path: &Path, usage_path: &Path) -> Result<UsageSnapshot, PeakError> {
        let markets = read_rows(markets_path, record_to_market)?;
        let markets = ReferenceStore::from_records(markets)?;
        let usage = read_rows(usage_path, record_to_usage)?;
        Ok(UsageSnapshot::new(markets, usage))
    }
}

fn read_rows<T>(
    path: &Path,
    convert: fn(&StringRecord, &StringRecord) -> Result<T, String>,
) -> Result<Vec<T>, PeakError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| PeakError::unavailable(&format!("failed to open {origin}"), e))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| PeakError::unavailable(&format!("failed to read headers of {origin}"), e))?
        .clone();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| PeakError::unavailable(&format!("failed to read record {idx} of {origin}"), e))?;
        let row = convert(&record, &headers).map_err(|e| {
            metrics::counter!("peaks_source_parse_errors_total").increment(1);
            PeakError::DataUnavailable(format!("{origin} record {idx}: {e}"))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn column<'r>(record: &'r StringRecord, headers: &StringRecord, name: &str) -> Result<&'r str, String> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .and_then(|idx| record.get(idx))
        .ok_or_else(|| format!("missing column '{name}'"))
}

fn record_to_market(record: &StringRecord, headers: &StringRecord) -> Result<MarketRecord, String> {
    let id_str = column(record, headers, "id")?;
    let id: i64 = id_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid id '{id_str}': {e}"))?;

    let name: MarketCode = column(record, headers, "name")?
        .trim()
        .parse()
        .map_err(|e| format!("{e}"))?;

    Ok(MarketRecord { id, name })
}

fn record_to_usage(record: &StringRecord, headers: &StringRecord) -> Result<UsageRecord, String> {
    let id_str = column(record, headers, "market_id")?;
    let market_id: i64 = id_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid market_id '{id_str}': {e}"))?;

    let kw_str = column(record, headers, "usage_kw")?;
    let usage_kw: f64 = kw_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid usage_kw '{kw_str}': {e}"))?;
    if !usage_kw.is_finite() {
        return Err(format!("non-finite usage_kw '{kw_str}'"));
    }

    let timestamp = column(record, headers, "timestamp")?.to_string();

    Ok(UsageRecord {
        market_id,
        usage_kw,
        timestamp,
    })
}

#[async_trait::async_trait]
impl SnapshotSource for CsvFileSource {
    async fn load(&self) -> Result<Arc<UsageSnapshot>, PeakError> {
        let markets_path = self.markets_path.clone();
        let usage_path = self.usage_path.clone();

        let snapshot = tokio::task::spawn_blocking(move || Self::load_blocking(&markets_path, &usage_path))
            .await
            .map_err(|e| PeakError::unavailable("CSV loader task failed", e))??;

        Ok(Arc::new(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[tokio::test]
    async fn loads_fixture_files() {
        let source = CsvFileSource::new(fixture("markets.csv"), fixture("usage.csv"));
        let snap = source.load().await.unwrap();

        assert_eq!(snap.markets.len(), 9);
        assert_eq!(snap.markets.lookup(2), Some(MarketCode::Spp));
        assert!(!snap.usage.is_empty());
        assert_eq!(snap.usage[0].timestamp, "2022-07-26T13:48:00");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = CsvFileSource::new(fixture("markets.csv"), fixture("no_such_usage.csv"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, PeakError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn bad_market_name_is_unavailable() {
        let source = CsvFileSource::new(fixture("markets_bad.csv"), fixture("usage.csv"));
        let err = source.load().await.unwrap_err();
        match err {
            PeakError::DataUnavailable(msg) => assert!(msg.contains("nordpool"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn usage_row_rejects_non_numeric_usage() {
        let headers = StringRecord::from(vec!["market_id", "usage_kw", "timestamp"]);
        let rec = StringRecord::from(vec!["1", "lots", "2022-07-01T00:00:00"]);
        let err = record_to_usage(&rec, &headers).unwrap_err();
        assert!(err.contains("invalid usage_kw 'lots'"));

        let rec = StringRecord::from(vec!["1", "NaN", "2022-07-01T00:00:00"]);
        assert!(record_to_usage(&rec, &headers).is_err());
    }

    #[test]
    fn usage_row_keeps_timestamp_text_verbatim() {
        let headers = StringRecord::from(vec!["timestamp", "usage_kw", "market_id"]);
        let rec = StringRecord::from(vec!["not-a-date", " 12.5 ", "4"]);
        let row = record_to_usage(&rec, &headers).unwrap();
        assert_eq!(row, UsageRecord::new(4, 12.5, "not-a-date"));
    }
}
