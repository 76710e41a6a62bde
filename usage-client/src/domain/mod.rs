pub mod market;
pub mod usage;

pub use market::{MarketCode, MarketRecord, UnknownMarket};
pub use usage::UsageRecord;
