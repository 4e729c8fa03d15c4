use super::context::{AuthoritySet, Outcome, ResolutionContext};
use super::root_hints::RootHints;
use super::special_names::{answer_locally, Identity};
use super::stats::RecursorStats;
use crate::dns::authority::{AuthorityZone, AuthorityZones};
use crate::dns::cache::{NegativeCache, RecordCache};
use crate::dns::server_state::ServerState;
use async_trait::async_trait;
use ferrous_recursor_application::ports::{
    Clock, NameserverTransport, RecursiveResolver, Resolution, ResolveOptions,
};
use ferrous_recursor_domain::config::ResolverConfig;
use ferrous_recursor_domain::{
    ConfigError, DnsName, DnsQuery, RecordType, ResolutionStatus, ResolveError,
};
use futures::future::BoxFuture;
use ipnetwork::IpNetwork;
use rustc_hash::FxHashSet;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, Instrument};

/// Resolver limits and switches, resolved once from `ResolverConfig`.
#[derive(Debug, Clone)]
pub(super) struct RecursorSettings {
    pub max_depth: u32,
    pub max_cname_chain: u32,
    pub max_queries: u32,
    pub max_total_time: Duration,
    pub network_timeout: Duration,
    pub server_down_max_fails: u64,
    pub server_down_throttle: Duration,
    pub no_edns: bool,
    pub do_ipv6: bool,
    pub server_id: String,
    pub version_string: String,
    pub dont_query: Vec<IpNetwork>,
    pub prime_root_ns: bool,
    pub root_nx_trust: bool,
    pub delegation_only: FxHashSet<DnsName>,
}

impl RecursorSettings {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_depth: config.max_depth,
            max_cname_chain: config.max_cname_chain,
            max_queries: config.max_queries_per_query,
            max_total_time: config.max_total_time(),
            network_timeout: config.network_timeout(),
            server_down_max_fails: config.server_down_max_fails,
            server_down_throttle: config.server_down_throttle_time(),
            no_edns: config.no_edns,
            do_ipv6: config.do_ipv6,
            server_id: config.server_id.clone(),
            version_string: config.version_string.clone(),
            dont_query: config.dont_query_networks()?,
            prime_root_ns: config.prime_root_ns,
            root_nx_trust: config.root_nx_trust,
            delegation_only: config.delegation_only_zones()?.into_iter().collect(),
        })
    }
}

/// Iterative resolver: walks delegations from the closest known zone cut,
/// caching what it learns and remembering how each server behaves.
pub struct Recursor {
    pub(super) transport: Arc<dyn NameserverTransport>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) cache: Arc<RecordCache>,
    pub(super) negative: Arc<NegativeCache>,
    pub(super) servers: Arc<ServerState>,
    pub(super) zones: Arc<AuthorityZones>,
    pub(super) root_hints: RootHints,
    /// Micros of the last root NS priming attempt, zero before the first.
    pub(super) root_primed_at: AtomicU64,
    pub(super) settings: RecursorSettings,
    pub(super) stats: Arc<RecursorStats>,
}

impl Recursor {
    pub fn record_cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    pub fn negative_cache(&self) -> &Arc<NegativeCache> {
        &self.negative
    }

    pub fn server_state(&self) -> &Arc<ServerState> {
        &self.servers
    }

    pub fn zones(&self) -> &Arc<AuthorityZones> {
        &self.zones
    }

    pub fn counters(&self) -> &Arc<RecursorStats> {
        &self.stats
    }

    /// Resolves one question. Every failure becomes a SERVFAIL resolution
    /// carrying the reason.
    pub async fn resolve_query(&self, query: &DnsQuery, options: ResolveOptions) -> Resolution {
        let id = self.stats.next_resolution_id();
        let span = tracing::debug_span!(
            "resolve",
            id,
            domain = %query.name,
            record_type = %query.record_type
        );

        async move {
            let now = self.clock.now();
            let mut ctx = ResolutionContext::new(options, now, self.settings.max_total_time);
            ctx.cname_targets
                .insert((query.name.clone(), query.record_type));

            let identity = Identity {
                server_id: &self.settings.server_id,
                version: &self.settings.version_string,
            };
            let result = match answer_locally(query, &identity) {
                Some(local) => local,
                None => {
                    let work = self.do_resolve(&mut ctx, &query.name, query.record_type, 0);
                    match tokio::time::timeout(self.settings.max_total_time, work).await {
                        Ok(result) => result,
                        Err(_) => Err(ResolveError::TimeLimitExceeded),
                    }
                }
            };

            self.finish(ctx, result)
        }
        .instrument(span)
        .await
    }

    fn finish(&self, ctx: ResolutionContext, result: Result<Outcome, ResolveError>) -> Resolution {
        let resolution = match result {
            Ok(outcome) => {
                debug!(
                    status = %outcome.status,
                    records = outcome.records.len(),
                    queries = ctx.counters.queries_sent,
                    "Resolution finished"
                );
                Resolution {
                    variable: ctx.variable,
                    out_of_band: ctx.out_of_band,
                    validation: ctx.validation,
                    counters: ctx.counters,
                    ..Resolution::new(outcome.status, outcome.records)
                }
            }
            Err(error) => {
                debug!(
                    error = %error,
                    kind = error.kind(),
                    queries = ctx.counters.queries_sent,
                    "Resolution failed"
                );
                Resolution {
                    variable: ctx.variable,
                    out_of_band: ctx.out_of_band,
                    validation: ctx.validation,
                    counters: ctx.counters,
                    ..Resolution::servfail(error)
                }
            }
        };
        self.stats.record_outcome(resolution.status);
        resolution
    }

    /// One (sub-)resolution: local zones, then cache, then the network.
    pub(super) fn do_resolve<'a>(
        &'a self,
        ctx: &'a mut ResolutionContext,
        qname: &'a DnsName,
        qtype: RecordType,
        depth: u32,
    ) -> BoxFuture<'a, Result<Outcome, ResolveError>> {
        Box::pin(async move {
            self.check_limits(ctx, depth)?;
            trace!(depth, domain = %qname, record_type = %qtype, "Resolving");

            if let Some(zone) = self.local_zone(ctx, qname) {
                if !zone.is_forwarding() {
                    return self.resolve_out_of_band(ctx, &zone, qname, qtype, depth).await;
                }
            }

            if let Some(outcome) = self.check_cache(ctx, qname, qtype, depth).await? {
                return Ok(outcome);
            }

            if ctx.options.cache_only {
                debug!(domain = %qname, record_type = %qtype, "Cache-only lookup missed");
                return Ok(Outcome::new(ResolutionStatus::NoData, Vec::new()));
            }

            let authority = match self.forwarding_set(ctx, qname) {
                Some(forwarders) => forwarders,
                None => self.best_ns_set(ctx, qname, qtype, depth).await?,
            };
            self.iterate(ctx, qname, qtype, authority, depth).await
        })
    }

    pub(super) fn check_limits(&self, ctx: &ResolutionContext, depth: u32) -> Result<(), ResolveError> {
        if depth > self.settings.max_depth {
            return Err(ResolveError::DepthExceeded {
                depth: self.settings.max_depth,
            });
        }
        if self.clock.now() >= ctx.deadline {
            return Err(ResolveError::TimeLimitExceeded);
        }
        Ok(())
    }

    fn local_zone(&self, ctx: &ResolutionContext, qname: &DnsName) -> Option<Arc<AuthorityZone>> {
        if ctx.options.skip_out_of_band {
            return None;
        }
        self.zones.best_zone(qname)
    }

    fn forwarding_set(&self, ctx: &ResolutionContext, qname: &DnsName) -> Option<AuthoritySet> {
        let zone = self.local_zone(ctx, qname)?;
        if !zone.is_forwarding() {
            return None;
        }
        Some(AuthoritySet::forwarders(
            zone.name().clone(),
            zone.forwarders().to_vec(),
            zone.recurse(),
        ))
    }

    /// Chases a CNAME to `target`, enforcing the chain length and refusing
    /// targets this resolution already visited.
    pub(super) async fn follow_cname(
        &self,
        ctx: &mut ResolutionContext,
        target: &DnsName,
        qtype: RecordType,
        depth: u32,
    ) -> Result<Outcome, ResolveError> {
        ctx.cname_hops += 1;
        if ctx.cname_hops > self.settings.max_cname_chain {
            return Err(ResolveError::DepthExceeded {
                depth: self.settings.max_cname_chain,
            });
        }
        if !ctx.cname_targets.insert((target.clone(), qtype)) {
            debug!(target = %target, "CNAME loop");
            return Err(ResolveError::LoopDetected {
                qname: target.clone(),
            });
        }
        debug!(target = %target, hops = ctx.cname_hops, "Following CNAME");
        self.do_resolve(ctx, target, qtype, depth + 1).await
    }

    pub(super) fn is_dont_query(&self, address: &SocketAddr) -> bool {
        self.settings
            .dont_query
            .iter()
            .any(|network| network.contains(address.ip()))
    }
}

#[async_trait]
impl RecursiveResolver for Recursor {
    async fn resolve(&self, query: &DnsQuery, options: ResolveOptions) -> Resolution {
        self.resolve_query(query, options).await
    }
}
