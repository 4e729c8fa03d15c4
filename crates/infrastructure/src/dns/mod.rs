pub mod authority;
pub mod cache;
pub mod recursor;
pub mod server_state;
pub mod wire;

pub use authority::{AuthorityZone, AuthorityZones, ZoneAnswer};
pub use cache::{
    CacheMetrics, CacheMetricsSnapshot, CachedRRset, NegativeCache, NegativeEntry, NegativeKind,
    Provenance, RecordCache,
};
pub use recursor::{Recursor, RecursorBuilder, RecursorStats};
pub use server_state::{
    DecayingEwma, EdnsMode, EdnsStatus, EdnsStatusTracker, FailureCounters, NsSpeedTracker,
    ServerState, SpeedCollection, Throttle, ThrottleKey,
};
