use super::answer::rrsets;
use super::context::{AuthoritySet, Outcome, ResolutionContext, SetOrigin};
use super::core::Recursor;
use super::query::top_level;
use super::stats::RecursorStats;
use crate::dns::authority::AuthorityZone;
use crate::dns::cache::{CachedRRset, NegativeKind, Provenance};
use ferrous_recursor_domain::{
    DnsName, DnssecStatus, RecordType, ResolutionStatus, ResolveError, ResourceRecord,
    ResponseCode, Timestamp,
};
use std::time::Duration;
use tracing::debug;

impl Recursor {
    /// Answers from the positive cache, a cached CNAME, or the negative
    /// cache. `None` means the network has to be asked.
    pub(super) async fn check_cache(
        &self,
        ctx: &mut ResolutionContext,
        qname: &DnsName,
        qtype: RecordType,
        depth: u32,
    ) -> Result<Option<Outcome>, ResolveError> {
        let now = self.clock.now();

        if let Some(hit) = self.cache.get(qname, qtype, now) {
            if self.is_servable(ctx, &hit) {
                self.note_cache_hit(ctx, &hit);
                debug!(domain = %qname, record_type = %qtype, "Cache HIT");
                return Ok(Some(Outcome::answer(hit.records)));
            }
        }

        if qtype != RecordType::CNAME {
            if let Some(hit) = self.cache.get(qname, RecordType::CNAME, now) {
                if self.is_servable(ctx, &hit) {
                    if let Some(target) = hit.records.first().and_then(|r| r.data.target_name()) {
                        let target = target.clone();
                        self.note_cache_hit(ctx, &hit);
                        debug!(domain = %qname, target = %target, "Cache HIT on CNAME");
                        let rest = self.follow_cname(ctx, &target, qtype, depth).await?;
                        return Ok(Some(rest.prepended(hit.records)));
                    }
                }
            }
        }

        let mut negative = self.negative.get(qname, qtype, now);
        if negative.is_none() && self.settings.root_nx_trust {
            negative = top_level(qname)
                .and_then(|tld| self.negative.get(&tld, qtype, now))
                .filter(|hit| hit.kind == NegativeKind::NxDomain && hit.soa.name.is_root());
        }
        if let Some(negative) = negative {
            ctx.counters.cache_hits += 1;
            RecursorStats::bump(&self.stats.cache_hits);
            let status = match negative.kind {
                NegativeKind::NxDomain => ResolutionStatus::NxDomain,
                NegativeKind::NoData => ResolutionStatus::NoData,
            };
            debug!(domain = %qname, record_type = %qtype, status = %status, "Negative cache HIT");
            return Ok(Some(Outcome::new(status, vec![negative.soa])));
        }

        RecursorStats::bump(&self.stats.cache_misses);
        Ok(None)
    }

    fn is_servable(&self, ctx: &ResolutionContext, hit: &CachedRRset) -> bool {
        hit.provenance.is_answer_grade() && (!ctx.options.dnssec || hit.validation.is_acceptable())
    }

    fn note_cache_hit(&self, ctx: &mut ResolutionContext, hit: &CachedRRset) {
        ctx.counters.cache_hits += 1;
        ctx.note_validation(hit.validation);
        RecursorStats::bump(&self.stats.cache_hits);
    }

    /// Answers from a locally served zone. Nothing here is cached.
    pub(super) async fn resolve_out_of_band(
        &self,
        ctx: &mut ResolutionContext,
        zone: &AuthorityZone,
        qname: &DnsName,
        qtype: RecordType,
        depth: u32,
    ) -> Result<Outcome, ResolveError> {
        ctx.out_of_band = true;
        ctx.counters.auth_zone_queries += 1;
        RecursorStats::bump(&self.stats.auth_zone_queries);
        debug!(zone = %zone.name(), domain = %qname, record_type = %qtype, "Answering from local zone");

        let answer = zone.get_records(qname, qtype)?;

        if let Some(delegation) = answer.delegation() {
            let cut = delegation
                .first()
                .map(|r| r.name.clone())
                .unwrap_or_else(|| zone.name().clone());
            let names: Vec<DnsName> = delegation
                .iter()
                .filter_map(|r| r.data.target_name().cloned())
                .collect();
            if ctx.options.cache_only || names.is_empty() {
                return Ok(Outcome::answer(answer.records));
            }
            debug!(cut = %cut, servers = names.len(), "Following delegation out of local zone");
            let authority = AuthoritySet::delegation(cut, names, SetOrigin::LocalZone);
            return self.iterate(ctx, qname, qtype, authority, depth + 1).await;
        }

        if answer.rcode == ResponseCode::NXDomain {
            return Ok(Outcome::new(ResolutionStatus::NxDomain, answer.records));
        }

        let has_data = answer.answers().any(|r| r.record_type.answers(qtype));
        if !has_data {
            let target = answer
                .answers()
                .find(|r| r.is_cname())
                .and_then(|r| r.data.target_name().cloned());
            if let Some(target) = target {
                let rest = self.follow_cname(ctx, &target, qtype, depth).await?;
                return Ok(rest.prepended(answer.records));
            }
            return Ok(Outcome::new(ResolutionStatus::NoData, answer.records));
        }

        Ok(Outcome::answer(answer.records))
    }

    /// Stores answer-section RRsets and drops negative entries they
    /// contradict.
    pub(super) fn store_rrsets(
        &self,
        records: &[ResourceRecord],
        provenance: Provenance,
        validation: DnssecStatus,
        now: Timestamp,
    ) {
        for rrset in rrsets(records) {
            let name = rrset[0].name.clone();
            let record_type = rrset[0].record_type;
            let ttl = rrset.iter().map(|r| r.ttl).min().unwrap_or(0);
            let expires_at = now + Duration::from_secs(u64::from(ttl));
            let stored = self
                .cache
                .insert_unless_outranked(rrset, expires_at, provenance, validation, now);
            if stored && provenance.is_answer_grade() {
                self.negative.remove(&name, record_type);
            }
        }
    }

    /// Caches the NS set of a referral and the glue for its servers that
    /// falls inside the zone that sent it.
    pub(super) fn store_referral(
        &self,
        authority: &[ResourceRecord],
        additional: &[ResourceRecord],
        cut: &DnsName,
        nameservers: &[DnsName],
        bailiwick: &DnsName,
        validation: DnssecStatus,
        now: Timestamp,
    ) {
        let ns: Vec<ResourceRecord> = authority
            .iter()
            .filter(|r| r.record_type == RecordType::NS && &r.name == cut)
            .cloned()
            .collect();
        self.store_rrsets(&ns, Provenance::Referral, validation, now);
        self.store_glue(additional, nameservers, bailiwick, validation, now);
    }

    /// Caches additional-section addresses of `nameservers` that fall
    /// inside `bailiwick`.
    pub(super) fn store_glue(
        &self,
        additional: &[ResourceRecord],
        nameservers: &[DnsName],
        bailiwick: &DnsName,
        validation: DnssecStatus,
        now: Timestamp,
    ) {
        let glue: Vec<ResourceRecord> = additional
            .iter()
            .filter(|r| {
                matches!(r.record_type, RecordType::A | RecordType::AAAA)
                    && nameservers.contains(&r.name)
                    && r.name.is_subdomain_of(bailiwick)
            })
            .cloned()
            .collect();
        self.store_rrsets(&glue, Provenance::Referral, validation, now);
    }

    pub(super) fn store_negative(
        &self,
        name: &DnsName,
        qtype: RecordType,
        kind: NegativeKind,
        soa: Option<&ResourceRecord>,
        now: Timestamp,
    ) {
        if let Some(soa) = soa {
            self.negative.insert(name, qtype, kind, soa, now);
        }
    }
}
