use super::core::{Recursor, RecursorSettings};
use super::root_hints::RootHints;
use super::stats::RecursorStats;
use crate::dns::authority::{load_zones, AuthorityZones};
use crate::dns::cache::{NegativeCache, RecordCache};
use crate::dns::server_state::ServerState;
use crate::system::SystemClock;
use ferrous_recursor_application::ports::{Clock, NameserverTransport};
use ferrous_recursor_domain::{Config, ConfigError};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::info;

/// Assembles a `Recursor`. Tables not supplied are created from the
/// configuration, so several recursors can share caches and server state.
pub struct RecursorBuilder {
    transport: Arc<dyn NameserverTransport>,
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    cache: Option<Arc<RecordCache>>,
    negative: Option<Arc<NegativeCache>>,
    servers: Option<Arc<ServerState>>,
    zones: Option<Arc<AuthorityZones>>,
    stats: Option<Arc<RecursorStats>>,
}

impl RecursorBuilder {
    pub fn new(transport: Arc<dyn NameserverTransport>) -> Self {
        Self {
            transport,
            config: Config::default(),
            clock: None,
            cache: None,
            negative: None,
            servers: None,
            zones: None,
            stats: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_record_cache(mut self, cache: Arc<RecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_negative_cache(mut self, negative: Arc<NegativeCache>) -> Self {
        self.negative = Some(negative);
        self
    }

    pub fn with_server_state(mut self, servers: Arc<ServerState>) -> Self {
        self.servers = Some(servers);
        self
    }

    pub fn with_zones(mut self, zones: Arc<AuthorityZones>) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn with_stats(mut self, stats: Arc<RecursorStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> Result<Recursor, ConfigError> {
        let config = self.config;
        let settings = RecursorSettings::from_config(&config.resolver)?;
        let root_hints = RootHints::from_config(&config.root_hints)?;

        let zones = match self.zones {
            Some(zones) => zones,
            None => Arc::new(AuthorityZones::new(load_zones(&config.authority_zones)?)),
        };

        info!(
            root_hints = root_hints.len(),
            authority_zones = zones.len(),
            max_depth = settings.max_depth,
            max_queries = settings.max_queries,
            dont_query = settings.dont_query.len(),
            edns = !settings.no_edns,
            ipv6 = settings.do_ipv6,
            prime_root = settings.prime_root_ns,
            delegation_only = settings.delegation_only.len(),
            "Building recursor"
        );

        Ok(Recursor {
            transport: self.transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(RecordCache::new(&config.cache))),
            negative: self
                .negative
                .unwrap_or_else(|| Arc::new(NegativeCache::new(&config.cache))),
            servers: self
                .servers
                .unwrap_or_else(|| Arc::new(ServerState::new(&config.throttle))),
            zones,
            root_hints,
            root_primed_at: AtomicU64::new(0),
            settings,
            stats: self.stats.unwrap_or_default(),
        })
    }
}
