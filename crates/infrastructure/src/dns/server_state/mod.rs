mod edns;
mod failures;
mod speed;
mod throttle;

pub use edns::{EdnsMode, EdnsStatus, EdnsStatusTracker};
pub use failures::FailureCounters;
pub use speed::{DecayingEwma, NsSpeedTracker, SpeedCollection};
pub use throttle::{Throttle, ThrottleKey};

use ferrous_recursor_domain::config::ThrottleConfig;

/// Per-server knowledge shared by every resolution: latency, penalties,
/// consecutive failures and EDNS behaviour.
pub struct ServerState {
    pub speeds: NsSpeedTracker,
    pub throttle: Throttle<ThrottleKey>,
    pub failures: FailureCounters,
    pub edns: EdnsStatusTracker,
}

impl ServerState {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            speeds: NsSpeedTracker::new(),
            throttle: Throttle::new(config),
            failures: FailureCounters::new(),
            edns: EdnsStatusTracker::new(),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(&ThrottleConfig::default())
    }
}
