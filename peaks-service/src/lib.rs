pub mod config;
pub mod engine;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod server;
pub mod snapshot;
pub mod sources;

pub use engine::{DedupPolicy, PeakQueryEngine, PeakResult, ResolvedUsage};
pub use error::{ErrorCategory, PeakError};
