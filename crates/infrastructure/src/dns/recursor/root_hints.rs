use crate::dns::cache::{Provenance, RecordCache};
use ferrous_recursor_domain::config::RootHintConfig;
use ferrous_recursor_domain::{
    ConfigError, DnsName, DnssecStatus, RecordData, RecordType, ResourceRecord, Timestamp,
};
use std::net::IpAddr;
use std::time::Duration;
use tracing::info;

const HINT_TTL: u32 = 3_600_000;

/// Root servers used when the cache holds no root NS set.
#[derive(Debug, Clone, Default)]
pub struct RootHints {
    servers: Vec<(DnsName, Vec<IpAddr>)>,
}

impl RootHints {
    pub fn from_config(hints: &[RootHintConfig]) -> Result<Self, ConfigError> {
        let servers = hints
            .iter()
            .map(|hint| {
                let name = DnsName::parse(&hint.name)
                    .map_err(|e| ConfigError::Validation(format!("root hint: {}", e)))?;
                Ok((name, hint.ip_addrs()?))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { servers })
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Seeds the root NS set and the root servers' addresses as hint data.
    /// Existing stronger data is left alone. Returns false without hints.
    pub fn prime(&self, cache: &RecordCache, now: Timestamp) -> bool {
        if self.servers.is_empty() {
            return false;
        }

        let expires_at = now + Duration::from_secs(u64::from(HINT_TTL));
        let root = DnsName::root();
        let ns: Vec<ResourceRecord> = self
            .servers
            .iter()
            .map(|(name, _)| {
                ResourceRecord::new(root.clone(), RecordType::NS, HINT_TTL, RecordData::NS(name.clone()))
            })
            .collect();
        cache.insert_unless_outranked(ns, expires_at, Provenance::Hint, DnssecStatus::Unknown, now);

        for (name, addrs) in &self.servers {
            let (v4, v6): (Vec<ResourceRecord>, Vec<ResourceRecord>) = addrs
                .iter()
                .map(|addr| match addr {
                    IpAddr::V4(v4) => {
                        ResourceRecord::new(name.clone(), RecordType::A, HINT_TTL, RecordData::A(*v4))
                    }
                    IpAddr::V6(v6) => ResourceRecord::new(
                        name.clone(),
                        RecordType::AAAA,
                        HINT_TTL,
                        RecordData::AAAA(*v6),
                    ),
                })
                .partition(|record| record.record_type == RecordType::A);
            for rrset in [v4, v6] {
                if !rrset.is_empty() {
                    cache.insert_unless_outranked(
                        rrset,
                        expires_at,
                        Provenance::Hint,
                        DnssecStatus::Unknown,
                        now,
                    );
                }
            }
        }

        info!(servers = self.servers.len(), "Primed root hints");
        true
    }
}
