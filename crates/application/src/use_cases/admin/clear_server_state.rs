use crate::ports::RecursorAdminPort;
use ferrous_recursor_domain::Timestamp;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStateScope {
    Throttle,
    NsSpeeds,
    EdnsStatus,
    FailedServers,
    All,
}

impl ServerStateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStateScope::Throttle => "throttle",
            ServerStateScope::NsSpeeds => "ns_speeds",
            ServerStateScope::EdnsStatus => "edns_status",
            ServerStateScope::FailedServers => "failed_servers",
            ServerStateScope::All => "all",
        }
    }
}

pub struct ClearServerStateUseCase {
    admin: Arc<dyn RecursorAdminPort>,
}

impl ClearServerStateUseCase {
    pub fn new(admin: Arc<dyn RecursorAdminPort>) -> Self {
        Self { admin }
    }

    /// Returns the number of entries dropped.
    pub fn execute(&self, scope: ServerStateScope) -> usize {
        let removed = match scope {
            ServerStateScope::Throttle => self.admin.clear_throttle(),
            ServerStateScope::NsSpeeds => self.admin.clear_ns_speeds(),
            ServerStateScope::EdnsStatus => self.admin.clear_edns_status(),
            ServerStateScope::FailedServers => self.admin.clear_failed_servers(),
            ServerStateScope::All => {
                self.admin.clear_throttle()
                    + self.admin.clear_ns_speeds()
                    + self.admin.clear_edns_status()
                    + self.admin.clear_failed_servers()
            }
        };
        info!(scope = scope.as_str(), removed, "Server state cleared");
        removed
    }
}

pub struct PruneNsSpeedsUseCase {
    admin: Arc<dyn RecursorAdminPort>,
}

impl PruneNsSpeedsUseCase {
    pub fn new(admin: Arc<dyn RecursorAdminPort>) -> Self {
        Self { admin }
    }

    pub fn execute(&self, limit: Timestamp) -> usize {
        let removed = self.admin.prune_ns_speeds(limit);
        if removed > 0 {
            info!(removed, "Pruned stale nameserver speeds");
        }
        removed
    }
}
