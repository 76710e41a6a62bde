use anyhow::{bail, Context, Result};
use peaks_service::{
    config::AppConfig, engine::PeakQueryEngine, observability, sources, DedupPolicy,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        bail!("usage: peaks <market_name> [k] [raw|daily-max]");
    }
    let market_name = &args[1];

    // Load configuration (PEAKS_CONFIG selects the file, same as the server).
    let cfg = AppConfig::load()?;

    let k = match args.get(2) {
        Some(k) => k.parse::<usize>().with_context(|| format!("invalid k '{k}'"))?,
        None => cfg.query.default_k,
    };
    let policy = match args.get(3) {
        Some(p) => p.parse::<DedupPolicy>().map_err(anyhow::Error::msg)?,
        None => cfg.query.default_dedup,
    };

    let engine = PeakQueryEngine::new(sources::open(&cfg).await?);
    let peaks = engine.get_top_k_peaks(market_name, k, policy).await?;

    println!("{}", serde_json::to_string_pretty(&peaks)?);

    Ok(())
}
