use super::core::Recursor;
use ferrous_recursor_application::ports::{RecursorAdminPort, RecursorStatsSnapshot};
use ferrous_recursor_domain::{DnsName, Timestamp};
use tracing::info;

impl RecursorAdminPort for Recursor {
    fn wipe_cache(&self, name: &DnsName, subtree: bool) -> usize {
        let removed = self.cache.wipe(name, subtree) + self.negative.wipe(name, subtree);
        info!(domain = %name, subtree, removed, "Wiped cache entries");
        removed
    }

    fn clear_throttle(&self) -> usize {
        let removed = self.servers.throttle.clear();
        info!(removed, "Cleared throttle table");
        removed
    }

    fn clear_ns_speeds(&self) -> usize {
        let removed = self.servers.speeds.clear();
        info!(removed, "Cleared nameserver speeds");
        removed
    }

    fn prune_ns_speeds(&self, limit: Timestamp) -> usize {
        let removed = self.servers.speeds.prune(limit);
        info!(removed, "Pruned stale nameserver speeds");
        removed
    }

    fn clear_edns_status(&self) -> usize {
        let removed = self.servers.edns.clear();
        info!(removed, "Cleared EDNS status");
        removed
    }

    fn clear_failed_servers(&self) -> usize {
        let removed = self.servers.failures.clear_all();
        info!(removed, "Cleared server failure counts");
        removed
    }

    fn stats(&self) -> RecursorStatsSnapshot {
        RecursorStatsSnapshot {
            cache_entries: self.cache.len(),
            negative_cache_entries: self.negative.len(),
            cache_evictions: self.cache.metrics().snapshot().evictions
                + self.negative.metrics().snapshot().evictions,
            throttle_entries: self.servers.throttle.len(),
            ns_speed_entries: self.servers.speeds.len(),
            edns_status_entries: self.servers.edns.len(),
            failed_servers: self.servers.failures.len(),
            ..self.stats.snapshot()
        }
    }
}
