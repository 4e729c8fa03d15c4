use ferrous_recursor_domain::Timestamp;

/// Source of "now" for every TTL, decay and throttle computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
