use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::domain::{MarketCode, MarketRecord, UsageRecord};

/// Raw market row as stored; `name` is validated into a [`MarketCode`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MarketRow {
    pub id: i64,
    pub name: String,
}

impl TryFrom<MarketRow> for MarketRecord {
    type Error = anyhow::Error;

    fn try_from(row: MarketRow) -> Result<Self> {
        let name: MarketCode = row
            .name
            .trim()
            .parse()
            .with_context(|| format!("market id {}", row.id))?;
        Ok(MarketRecord { id: row.id, name })
    }
}

/// Fetch the full market reference table.
pub async fn load_markets(pool: &PgPool) -> Result<Vec<MarketRecord>> {
    let rows = sqlx::query_as::<_, MarketRow>(
        r#"
        SELECT
            id,
            name
        FROM markets
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MarketRecord::try_from).collect()
}

/// Fetch every usage reading. The timestamp column is read back as text so
/// parsing stays with the query engine.
///
/// QuestDB renders `CAST(timestamp AS STRING)` as UTC with microseconds and a
/// `Z` suffix (`2022-07-26T13:48:00.000000Z`), so rows from this query carry an
/// offset, unlike naive CSV text.
pub async fn load_usage(pool: &PgPool) -> Result<Vec<UsageRecord>> {
    let rows = sqlx::query_as::<_, UsageRecord>(
        r#"
        SELECT
            market_id,
            usage_kw,
            CAST(timestamp AS STRING) AS timestamp
        FROM energy_usage
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_row_converts_case_insensitively() {
        let row = MarketRow {
            id: 3,
            name: " ERCOT ".to_string(),
        };
        let rec = MarketRecord::try_from(row).unwrap();
        assert_eq!(rec, MarketRecord { id: 3, name: MarketCode::Ercot });
    }

    #[test]
    fn market_row_rejects_unknown_name() {
        let row = MarketRow {
            id: 9,
            name: "nordpool".to_string(),
        };
        let err = MarketRecord::try_from(row).unwrap_err();
        assert!(err.to_string().contains("market id 9"));
    }
}
