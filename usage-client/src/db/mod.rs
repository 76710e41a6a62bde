pub mod usage_queries;

pub use usage_queries::{load_markets, load_usage, MarketRow};
