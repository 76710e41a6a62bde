pub mod csv_file;
pub mod memory;
pub mod questdb;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub use csv_file::CsvFileSource;
pub use memory::InMemorySource;
pub use questdb::QuestDbSource;

use crate::{
    config::{AppConfig, SourceKind},
    snapshot::SnapshotSource,
};

/// Builds the uncached source named by the configuration.
pub async fn open(cfg: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotSource>> {
    match cfg.source.kind {
        SourceKind::Csv => {
            let markets = cfg
                .source
                .markets_path
                .clone()
                .context("source.markets_path is required for csv")?;
            let usage = cfg
                .source
                .usage_path
                .clone()
                .context("source.usage_path is required for csv")?;
            tracing::info!(markets = %markets.display(), usage = %usage.display(), "using CSV usage source");
            Ok(Arc::new(CsvFileSource::new(markets, usage)))
        }
        SourceKind::Pgwire => {
            let qdb = cfg
                .questdb
                .as_ref()
                .context("[questdb] is required for pgwire")?;
            let pool = PgPoolOptions::new()
                .max_connections(qdb.max_connections)
                .connect(&qdb.uri)
                .await
                .context("failed to connect to questdb")?;
            tracing::info!("using QuestDB usage source");
            Ok(Arc::new(QuestDbSource::new(pool)))
        }
    }
}
