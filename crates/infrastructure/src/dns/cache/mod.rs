mod eviction;
mod key;
mod metrics;
mod negative_cache;
mod record_cache;

pub use key::{CacheKey, NegativeKey};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use negative_cache::{NegativeCache, NegativeEntry, NegativeKind};
pub use record_cache::{CachedRRset, Provenance, RecordCache};
