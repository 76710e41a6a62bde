pub mod db;
pub mod domain;

pub use domain::{MarketCode, MarketRecord, UnknownMarket, UsageRecord};
