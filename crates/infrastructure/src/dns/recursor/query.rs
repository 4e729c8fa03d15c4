use super::answer::{classify, enforce_delegation_only, Classification};
use super::context::{AuthoritySet, Outcome, QueryMode, ResolutionContext, SetOrigin};
use super::core::Recursor;
use super::delegation::Step;
use super::stats::RecursorStats;
use crate::dns::cache::{NegativeKind, Provenance};
use crate::dns::server_state::{EdnsMode, ThrottleKey};
use ferrous_recursor_application::ports::{AskRequest, RawAnswer};
use ferrous_recursor_domain::{
    DnsName, NetworkError, RecordType, ResolutionStatus, ResolveError, ResourceRecord, ResponseCode,
    Timestamp,
};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, trace, warn};

const EDNS_VERSION: u8 = 0;
const FAILED_SPEED_USECS: u64 = 1_000_000;
const SERVER_DOWN_TRIES: u32 = 10_000;

const SERVFAIL_PENALTY: (Duration, u32) = (Duration::from_secs(60), 3);
const UNREACHABLE_PENALTY: (Duration, u32) = (Duration::from_secs(60), 100);
const TIMEOUT_PENALTY: (Duration, u32) = (Duration::from_secs(10), 5);
const LAME_PENALTY: (Duration, u32) = (Duration::from_secs(60), 100);

impl Recursor {
    /// One server, one question: ask, then interpret the reply.
    pub(super) async fn ask_and_process(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        server: &DnsName,
        address: SocketAddr,
    ) -> Result<Step, ResolveError> {
        let answer = self
            .ask_server(ctx, qname, qtype, authority, server, address)
            .await?;
        self.process_answer(ctx, qname, qtype, authority, address, &answer)
    }

    /// Sends the question, falling back to plain DNS when the server
    /// rejects EDNS and to TCP when the reply is truncated. Updates the
    /// server's latency, failure count and throttle state.
    async fn ask_server(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        server: &DnsName,
        address: SocketAddr,
    ) -> Result<RawAnswer, ResolveError> {
        let recursion_desired = authority.mode == QueryMode::ForwardRecursive;
        let mut use_edns =
            !self.settings.no_edns && self.servers.edns.mode(&address) != EdnsMode::Unsupported;
        let mut use_tcp = false;

        loop {
            self.charge_query(ctx, use_tcp, use_edns)?;
            let sent_at = self.clock.now();
            let request = AskRequest {
                address,
                qname: qname.clone(),
                qtype,
                use_tcp,
                recursion_desired,
                edns_version: use_edns.then_some(EDNS_VERSION),
                timeout: self.settings.network_timeout,
                now: sent_at,
            };
            trace!(server = %address, domain = %qname, record_type = %qtype, tcp = use_tcp, edns = use_edns, "Sending query");

            let result = match tokio::time::timeout(
                self.settings.network_timeout,
                self.transport.ask(&request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(NetworkError::Timeout),
            };

            let now = self.clock.now();
            let answer = match result {
                Ok(answer) => answer,
                Err(error) => {
                    self.note_network_failure(ctx, qname, qtype, authority, server, address, &error, now);
                    return Err(ResolveError::from_network(address, error));
                }
            };

            if use_edns && answer.rcode.is_edns_rejection() {
                debug!(server = %address, rcode = %answer.rcode, "Server rejected EDNS, retrying without");
                self.servers.edns.set_mode(address, EdnsMode::Unsupported, now);
                use_edns = false;
                continue;
            }
            if use_edns {
                let mode = if answer.has_edns {
                    EdnsMode::Supported
                } else {
                    EdnsMode::Ignorant
                };
                self.servers.edns.set_mode(address, mode, now);
            }

            if answer.truncated && !use_tcp {
                debug!(server = %address, domain = %qname, "Truncated reply, retrying over TCP");
                use_tcp = true;
                continue;
            }

            if !matches!(answer.rcode, ResponseCode::NoError | ResponseCode::NXDomain) {
                debug!(server = %address, rcode = %answer.rcode, domain = %qname, "Server failed the query");
                self.penalize(address, qname, qtype, SERVFAIL_PENALTY, now);
                return Err(ResolveError::ServerFailure {
                    server: address,
                    rcode: answer.rcode,
                });
            }

            let elapsed = if answer.elapsed.is_zero() {
                now.saturating_duration_since(sent_at)
            } else {
                answer.elapsed
            };
            let usecs = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
            self.servers.speeds.submit(server, address, usecs, now);
            return Ok(answer);
        }
    }

    fn charge_query(
        &self,
        ctx: &mut ResolutionContext,
        use_tcp: bool,
        use_edns: bool,
    ) -> Result<(), ResolveError> {
        if ctx.counters.queries_sent >= self.settings.max_queries {
            return Err(ResolveError::QueryLimitExceeded {
                limit: self.settings.max_queries,
            });
        }
        ctx.counters.queries_sent += 1;
        ctx.variable = true;
        RecursorStats::bump(&self.stats.outgoing_queries);
        if use_tcp {
            ctx.counters.tcp_queries += 1;
            RecursorStats::bump(&self.stats.tcp_outgoing_queries);
        }
        if !use_edns {
            RecursorStats::bump(&self.stats.no_edns_outgoing_queries);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn note_network_failure(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        server: &DnsName,
        address: SocketAddr,
        error: &NetworkError,
        now: Timestamp,
    ) {
        match error {
            NetworkError::Timeout => {
                ctx.counters.timeouts += 1;
                RecursorStats::bump(&self.stats.timeouts);
            }
            NetworkError::Unreachable(_) => {
                ctx.counters.unreachables += 1;
                RecursorStats::bump(&self.stats.unreachables);
            }
            NetworkError::Malformed(_) => {}
        }
        debug!(server = %address, domain = %qname, error = %error, "Query failed");

        self.servers.speeds.submit(server, address, FAILED_SPEED_USECS, now);

        let penalty = match error {
            NetworkError::Timeout => TIMEOUT_PENALTY,
            NetworkError::Unreachable(_) => UNREACHABLE_PENALTY,
            NetworkError::Malformed(_) => SERVFAIL_PENALTY,
        };
        self.count_failure(address, qname, qtype, authority, penalty, now);
    }

    /// Bumps the server's failure count. Once it reaches the configured
    /// limit the whole server is throttled; below it only the question is.
    /// Root servers are never marked down.
    fn count_failure(
        &self,
        address: SocketAddr,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        penalty: (Duration, u32),
        now: Timestamp,
    ) {
        let max_fails = self.settings.server_down_max_fails;
        if max_fails > 0 && !authority.zone.is_root() {
            let fails = self.servers.failures.incr(address);
            if fails >= max_fails {
                warn!(
                    server = %address,
                    failures = fails,
                    throttle_secs = self.settings.server_down_throttle.as_secs(),
                    "Server considered down, throttling all queries to it"
                );
                self.servers.throttle.throttle(
                    now,
                    ThrottleKey::server(address),
                    self.settings.server_down_throttle,
                    SERVER_DOWN_TRIES,
                );
                return;
            }
        }
        self.penalize(address, qname, qtype, penalty, now);
    }

    fn penalize(
        &self,
        address: SocketAddr,
        qname: &DnsName,
        qtype: RecordType,
        (ttl, tries): (Duration, u32),
        now: Timestamp,
    ) {
        self.servers
            .throttle
            .throttle(now, ThrottleKey::query(address, qname, qtype), ttl, tries);
    }

    /// Classifies a reply and stores what it teaches.
    fn process_answer(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        authority: &AuthoritySet,
        address: SocketAddr,
        answer: &RawAnswer,
    ) -> Result<Step, ResolveError> {
        let now = self.clock.now();
        if ctx.options.dnssec && !answer.validation.is_acceptable() {
            self.penalize(address, qname, qtype, SERVFAIL_PENALTY, now);
            return Err(ResolveError::MalformedResponse {
                server: address,
                reason: "bogus answer".to_string(),
            });
        }

        let recursive = authority.mode == QueryMode::ForwardRecursive;
        let bailiwick = if recursive {
            DnsName::root()
        } else {
            authority.zone.clone()
        };
        let provenance = if answer.authoritative || recursive {
            Provenance::Authoritative
        } else {
            Provenance::Referral
        };
        let validation = answer.validation;

        let mut classification = classify(qname, qtype, &bailiwick, answer, recursive);
        if !recursive && self.settings.delegation_only.contains(&authority.zone) {
            classification = enforce_delegation_only(qname, &authority.zone, classification);
        }
        if !matches!(
            classification,
            Classification::Lame(_) | Classification::Malformed(_)
        ) {
            self.servers.failures.clear(&address);
        }

        match classification {
            Classification::Answer { records } => {
                ctx.note_validation(validation);
                self.store_rrsets(&records, provenance, validation, now);
                if qtype == RecordType::NS {
                    let nameservers: Vec<DnsName> = records
                        .iter()
                        .filter_map(|r| r.data.target_name().cloned())
                        .collect();
                    self.store_glue(&answer.additional, &nameservers, &bailiwick, validation, now);
                }
                Ok(Step::Done(Outcome::answer(records)))
            }
            Classification::Cname { chain, target } => {
                self.store_rrsets(&chain, provenance, validation, now);
                Ok(Step::Cname { chain, target })
            }
            Classification::NxDomain { name, chain, soa } => {
                ctx.note_validation(validation);
                self.store_rrsets(&chain, provenance, validation, now);
                self.store_negative(&name, qtype, NegativeKind::NxDomain, soa.as_ref(), now);
                if self.settings.root_nx_trust
                    && authority.zone.is_root()
                    && !authority.is_forwarder()
                    && answer.authoritative
                {
                    if let Some(tld) = top_level(&name) {
                        debug!(tld = %tld, "Root NXDOMAIN covers the whole TLD");
                        self.store_negative(&tld, qtype, NegativeKind::NxDomain, soa.as_ref(), now);
                    }
                }
                Ok(Step::Done(negative_outcome(ResolutionStatus::NxDomain, chain, soa)))
            }
            Classification::NoData { name, chain, soa } => {
                ctx.note_validation(validation);
                self.store_rrsets(&chain, provenance, validation, now);
                self.store_negative(&name, qtype, NegativeKind::NoData, soa.as_ref(), now);
                Ok(Step::Done(negative_outcome(ResolutionStatus::NoData, chain, soa)))
            }
            Classification::Referral { cut, nameservers } => {
                self.store_referral(
                    &answer.authority,
                    &answer.additional,
                    &cut,
                    &nameservers,
                    &bailiwick,
                    validation,
                    now,
                );
                Ok(Step::Referral(AuthoritySet::delegation(
                    cut,
                    nameservers,
                    SetOrigin::Referral,
                )))
            }
            Classification::Lame(reason) => {
                debug!(server = %address, zone = %authority.zone, reason = %reason, "Lame server");
                self.penalize(address, qname, qtype, LAME_PENALTY, now);
                Err(ResolveError::LameDelegation {
                    server: address,
                    zone: authority.zone.clone(),
                })
            }
            Classification::Malformed(reason) => {
                debug!(server = %address, reason = %reason, "Unusable reply");
                self.count_failure(address, qname, qtype, authority, SERVFAIL_PENALTY, now);
                Err(ResolveError::MalformedResponse {
                    server: address,
                    reason,
                })
            }
        }
    }
}

/// The single-label ancestor of `name`, when `name` lies below it.
pub(super) fn top_level(name: &DnsName) -> Option<DnsName> {
    if name.num_labels() < 2 {
        return None;
    }
    name.ancestors().find(|n| n.num_labels() == 1)
}

fn negative_outcome(
    status: ResolutionStatus,
    mut records: Vec<ResourceRecord>,
    soa: Option<ResourceRecord>,
) -> Outcome {
    records.extend(soa);
    Outcome::new(status, records)
}
