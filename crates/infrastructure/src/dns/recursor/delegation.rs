use super::context::{AuthoritySet, NameserverSet, Outcome, ResolutionContext, SetOrigin};
use super::core::Recursor;
use super::stats::RecursorStats;
use crate::dns::cache::Provenance;
use crate::dns::server_state::ThrottleKey;
use ferrous_recursor_domain::{
    DnsName, RecordType, ResolutionStatus, ResolveError, ResourceRecord, Timestamp,
};
use futures::future::BoxFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, info, warn};

const DNS_PORT: u16 = 53;
const ROOT_PRIME_RETRY: Duration = Duration::from_secs(60);

/// Where one server answer leaves the iteration.
#[derive(Debug)]
pub(super) enum Step {
    Done(Outcome),
    Referral(AuthoritySet),
    Cname {
        chain: Vec<ResourceRecord>,
        target: DnsName,
    },
}

/// Bookkeeping while walking the servers of one zone cut.
#[derive(Default)]
struct Attempts {
    asked: u32,
    throttled: Vec<(DnsName, SocketAddr)>,
    last_error: Option<ResolveError>,
}

impl Recursor {
    /// Closest enclosing zone cut with a usable cached NS set. Sets already
    /// tried for this question are skipped. The root is seeded from hints
    /// when nothing is cached for it, and hint data is then refreshed by
    /// asking the hinted servers.
    pub(super) async fn best_ns_set(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        depth: u32,
    ) -> Result<AuthoritySet, ResolveError> {
        let mut skipped = false;

        for zone in qname.ancestors() {
            let now = self.clock.now();
            let mut cached = self.cache.get(&zone, RecordType::NS, now);
            if zone.is_root() {
                if cached.is_none() && self.root_hints.prime(&self.cache, now) {
                    cached = self.cache.get(&zone, RecordType::NS, now);
                }
                let from_hints = cached
                    .as_ref()
                    .is_some_and(|ns| ns.provenance == Provenance::Hint);
                let is_priming_question = qname.is_root() && qtype == RecordType::NS;
                if from_hints && !is_priming_question && self.prime_root(ctx, depth).await? {
                    cached = self.cache.get(&zone, RecordType::NS, self.clock.now());
                }
            }
            let Some(ns) = cached else {
                continue;
            };
            if ctx.options.dnssec && !ns.validation.is_acceptable() {
                continue;
            }

            let names: Vec<DnsName> = ns
                .records
                .iter()
                .filter_map(|r| r.data.target_name().cloned())
                .collect();
            if names.is_empty() {
                continue;
            }

            let authority = AuthoritySet::delegation(zone, names, SetOrigin::Cache);
            if ctx.been_there.contains(&authority.loop_key(qname, qtype)) {
                debug!(zone = %authority.zone, "Nameserver set already tried, moving up");
                skipped = true;
                continue;
            }
            debug!(zone = %authority.zone, provenance = ns.provenance.as_str(), "Closest cached delegation");
            return Ok(authority);
        }

        if skipped {
            Err(ResolveError::LoopDetected {
                qname: qname.clone(),
            })
        } else {
            Err(ResolveError::NoAuthorityFound {
                qname: qname.clone(),
            })
        }
    }

    /// Asks `authority` and follows referrals until an answer, a CNAME to
    /// chase, or a failure.
    pub(super) async fn iterate(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        mut authority: AuthoritySet,
        mut depth: u32,
    ) -> Result<Outcome, ResolveError> {
        loop {
            self.check_limits(ctx, depth)?;

            if !ctx.been_there.insert(authority.loop_key(qname, qtype)) {
                debug!(zone = %authority.zone, domain = %qname, "Delegation loop");
                return Err(ResolveError::LoopDetected {
                    qname: qname.clone(),
                });
            }

            match self.query_zone(ctx, qname, qtype, &authority, depth).await {
                Ok(Step::Done(outcome)) => return Ok(outcome),
                Ok(Step::Referral(next)) => {
                    debug!(from = %authority.zone, to = %next.zone, "Following referral");
                    authority = next;
                    depth += 1;
                }
                Ok(Step::Cname { chain, target }) => {
                    let rest = self.follow_cname(ctx, &target, qtype, depth).await?;
                    return Ok(rest.prepended(chain));
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) if authority.origin == SetOrigin::Cache => {
                    match self.best_ns_set(ctx, qname, qtype, depth).await {
                        Ok(parent) => {
                            debug!(
                                error = %error,
                                from = %authority.zone,
                                to = %parent.zone,
                                "Cached delegation failed, trying an enclosing one"
                            );
                            authority = parent;
                        }
                        Err(_) => return Err(error),
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Asks the hinted root servers for `. NS` so the answer replaces the
    /// hints. At most one attempt per retry interval across resolutions;
    /// a failed attempt leaves the hints in use.
    fn prime_root<'a>(
        &'a self,
        ctx: &'a mut ResolutionContext,
        depth: u32,
    ) -> BoxFuture<'a, Result<bool, ResolveError>> {
        Box::pin(async move {
            if !self.settings.prime_root_ns || ctx.priming_root || ctx.options.cache_only {
                return Ok(false);
            }
            let now = self.clock.now();
            let last = self.root_primed_at.load(Ordering::Relaxed);
            if last != 0 && now < Timestamp::from_micros(last) + ROOT_PRIME_RETRY {
                return Ok(false);
            }
            if self
                .root_primed_at
                .compare_exchange(last, now.as_micros().max(1), Ordering::AcqRel, Ordering::Relaxed)
                .is_err()
            {
                return Ok(false);
            }

            let root = DnsName::root();
            let Some(hints) = self.cache.get(&root, RecordType::NS, now) else {
                return Ok(false);
            };
            let names: Vec<DnsName> = hints
                .records
                .iter()
                .filter_map(|r| r.data.target_name().cloned())
                .collect();
            if names.is_empty() {
                return Ok(false);
            }

            debug!(servers = names.len(), "Priming root NS set");
            ctx.priming_root = true;
            let authority = AuthoritySet::delegation(root.clone(), names, SetOrigin::Cache);
            let result = self
                .iterate(ctx, &root, RecordType::NS, authority, depth + 1)
                .await;
            ctx.priming_root = false;

            match result {
                Ok(outcome)
                    if outcome.status == ResolutionStatus::NoError
                        && outcome.records.iter().any(|r| r.record_type == RecordType::NS) =>
                {
                    info!(
                        servers = outcome.records.len(),
                        "Root NS set refreshed from root servers"
                    );
                    Ok(true)
                }
                Ok(outcome) => {
                    warn!(status = %outcome.status, "Root priming gave no NS set, keeping hints");
                    Ok(false)
                }
                Err(error) if error.is_fatal() => Err(error),
                Err(error) => {
                    warn!(error = %error, "Root priming failed, keeping hints");
                    Ok(false)
                }
            }
        })
    }

    /// Tries the servers of one zone cut, fastest first.
    async fn query_zone(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        depth: u32,
    ) -> Result<Step, ResolveError> {
        let mut attempts = Attempts::default();

        match &authority.servers {
            NameserverSet::Forwarders(addresses) => {
                let mut addresses = addresses.clone();
                fastrand::shuffle(&mut addresses);
                let now = self.clock.now();
                self.servers
                    .speeds
                    .order_addresses(&authority.zone, &mut addresses, now);
                if let Some(step) = self
                    .try_addresses(ctx, qname, qtype, authority, &authority.zone, &addresses, &mut attempts)
                    .await?
                {
                    return Ok(step);
                }
            }
            NameserverSet::Names(names) => {
                for nameserver in self.order_nameservers(names) {
                    let addresses = match self
                        .nameserver_addresses(ctx, &nameserver, depth)
                        .await
                    {
                        Ok(addresses) => addresses,
                        Err(error) if error.is_fatal() => return Err(error),
                        Err(error) => {
                            debug!(nameserver = %nameserver, error = %error, "No usable address for nameserver");
                            attempts.last_error = Some(error);
                            continue;
                        }
                    };
                    if let Some(step) = self
                        .try_addresses(ctx, qname, qtype, authority, &nameserver, &addresses, &mut attempts)
                        .await?
                    {
                        return Ok(step);
                    }
                }
            }
        }

        if attempts.asked == 0 {
            if let Some((server, address)) = attempts.throttled.first().cloned() {
                debug!(server = %address, "Every candidate is throttled, asking one anyway");
                match self
                    .ask_and_process(ctx, qname, qtype, authority, &server, address)
                    .await
                {
                    Ok(step) => return Ok(step),
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => attempts.last_error = Some(error),
                }
            }
        }

        warn!(
            zone = %authority.zone,
            domain = %qname,
            record_type = %qtype,
            asked = attempts.asked,
            last_error = attempts.last_error.as_ref().map(|e| e.kind()).unwrap_or("none"),
            "All servers failed"
        );
        Err(ResolveError::ServersExhausted {
            zone: authority.zone.clone(),
        })
    }

    /// Returns `Some` as soon as one address gives a usable answer.
    #[allow(clippy::too_many_arguments)]
    async fn try_addresses(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        server: &DnsName,
        addresses: &[SocketAddr],
        attempts: &mut Attempts,
    ) -> Result<Option<Step>, ResolveError> {
        for &address in addresses {
            if !authority.is_forwarder() && self.is_dont_query(&address) {
                debug!(server = %address, "Address is on the dont-query list");
                RecursorStats::bump(&self.stats.dont_queries);
                continue;
            }
            if !self.settings.do_ipv6 && address.is_ipv6() {
                continue;
            }
            if self.is_throttled(address, qname, qtype, self.clock.now()) {
                debug!(server = %address, domain = %qname, "Server throttled");
                ctx.counters.throttled += 1;
                RecursorStats::bump(&self.stats.throttled_queries);
                attempts.throttled.push((server.clone(), address));
                continue;
            }

            attempts.asked += 1;
            match self
                .ask_and_process(ctx, qname, qtype, authority, server, address)
                .await
            {
                Ok(step) => return Ok(Some(step)),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    debug!(server = %address, error = %error, "Server attempt failed");
                    attempts.last_error = Some(error);
                }
            }
        }
        Ok(None)
    }

    fn is_throttled(
        &self,
        address: SocketAddr,
        qname: &DnsName,
        qtype: RecordType,
        now: Timestamp,
    ) -> bool {
        let throttle = &self.servers.throttle;
        throttle.should_throttle(now, &ThrottleKey::server(address))
            || throttle.should_throttle(now, &ThrottleKey::query(address, qname, qtype))
    }

    /// Random order first so equally fast servers share the load, then a
    /// stable sort by smoothed latency.
    fn order_nameservers(&self, names: &[DnsName]) -> Vec<DnsName> {
        let now = self.clock.now();
        let mut ranked: Vec<(f64, DnsName)> = names
            .iter()
            .map(|name| (self.servers.speeds.server_speed(name, now), name.clone()))
            .collect();
        fastrand::shuffle(&mut ranked);
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.into_iter().map(|(_, name)| name).collect()
    }

    /// Addresses for a nameserver: cached data of any provenance first,
    /// otherwise a sub-resolution (A, then AAAA when A gives nothing).
    async fn nameserver_addresses(
        &self,
        ctx: &mut ResolutionContext,
        nameserver: &DnsName,
        depth: u32,
    ) -> Result<Vec<SocketAddr>, ResolveError> {
        let now = self.clock.now();
        let mut types = vec![RecordType::A];
        if self.settings.do_ipv6 {
            types.push(RecordType::AAAA);
        }

        let mut addresses: Vec<SocketAddr> = Vec::new();
        for &record_type in &types {
            if let Some(hit) = self.cache.get(nameserver, record_type, now) {
                addresses.extend(socket_addrs(&hit.records));
            }
        }

        if addresses.is_empty() {
            let mut last_error = None;
            for &record_type in &types {
                debug!(nameserver = %nameserver, record_type = %record_type, "Resolving nameserver address");
                match self
                    .do_resolve(ctx, nameserver, record_type, depth + 1)
                    .await
                {
                    Ok(outcome) => addresses.extend(socket_addrs(&outcome.records)),
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => last_error = Some(error),
                }
                if !addresses.is_empty() {
                    break;
                }
            }
            if addresses.is_empty() {
                return Err(last_error.unwrap_or_else(|| ResolveError::ServersExhausted {
                    zone: nameserver.clone(),
                }));
            }
        }

        let now = self.clock.now();
        self.servers
            .speeds
            .order_addresses(nameserver, &mut addresses, now);
        Ok(addresses)
    }
}

/// Address records in `records`, including those reached through a CNAME.
fn socket_addrs(records: &[ResourceRecord]) -> Vec<SocketAddr> {
    records
        .iter()
        .filter_map(|r| r.data.ip_addr())
        .map(|ip: IpAddr| SocketAddr::new(ip, DNS_PORT))
        .collect()
}
