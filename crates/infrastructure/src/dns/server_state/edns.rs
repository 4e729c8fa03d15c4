use dashmap::DashMap;
use ferrous_recursor_domain::Timestamp;
use rustc_hash::FxBuildHasher;
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdnsMode {
    #[default]
    Unknown,
    /// Answered an EDNS query with an OPT record.
    Supported,
    /// Answered an EDNS query but left the OPT record out.
    Ignorant,
    /// Rejected an EDNS query with FORMERR or NOTIMP.
    Unsupported,
}

impl EdnsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdnsMode::Unknown => "unknown",
            EdnsMode::Supported => "supported",
            EdnsMode::Ignorant => "ignorant",
            EdnsMode::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdnsStatus {
    pub mode: EdnsMode,
    pub mode_set_at: Timestamp,
}

/// Sticky per-address EDNS behaviour; only an explicit clear resets it.
pub struct EdnsStatusTracker {
    statuses: DashMap<SocketAddr, EdnsStatus, FxBuildHasher>,
}

impl EdnsStatusTracker {
    pub fn new() -> Self {
        Self {
            statuses: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn status(&self, address: &SocketAddr) -> Option<EdnsStatus> {
        self.statuses.get(address).map(|s| *s)
    }

    pub fn mode(&self, address: &SocketAddr) -> EdnsMode {
        self.status(address).map(|s| s.mode).unwrap_or_default()
    }

    /// Records `mode`; the timestamp only moves when the mode changes.
    pub fn set_mode(&self, address: SocketAddr, mode: EdnsMode, now: Timestamp) {
        let mut status = self.statuses.entry(address).or_insert(EdnsStatus {
            mode,
            mode_set_at: now,
        });
        if status.mode != mode {
            status.mode = mode;
            status.mode_set_at = now;
        }
    }

    pub fn clear(&self) -> usize {
        let removed = self.statuses.len();
        self.statuses.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl Default for EdnsStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_until_set() {
        let tracker = EdnsStatusTracker::new();
        let address: SocketAddr = "192.0.2.1:53".parse().unwrap();
        assert_eq!(tracker.mode(&address), EdnsMode::Unknown);

        tracker.set_mode(address, EdnsMode::Unsupported, Timestamp::from_secs(5));
        assert_eq!(tracker.mode(&address), EdnsMode::Unsupported);
    }

    #[test]
    fn test_timestamp_moves_only_on_change() {
        let tracker = EdnsStatusTracker::new();
        let address: SocketAddr = "192.0.2.1:53".parse().unwrap();
        tracker.set_mode(address, EdnsMode::Supported, Timestamp::from_secs(5));
        tracker.set_mode(address, EdnsMode::Supported, Timestamp::from_secs(9));
        assert_eq!(
            tracker.status(&address).unwrap().mode_set_at,
            Timestamp::from_secs(5)
        );

        tracker.set_mode(address, EdnsMode::Ignorant, Timestamp::from_secs(12));
        assert_eq!(
            tracker.status(&address).unwrap().mode_set_at,
            Timestamp::from_secs(12)
        );
        assert_eq!(tracker.clear(), 1);
    }
}
