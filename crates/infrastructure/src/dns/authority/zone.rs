use ferrous_recursor_domain::{
    DnsName, DomainError, Placement, RecordType, ResolveError, ResourceRecord, ResponseCode,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// Result of a local zone lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneAnswer {
    pub rcode: ResponseCode,
    pub records: Vec<ResourceRecord>,
}

impl ZoneAnswer {
    pub fn answers(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(|r| r.place == Placement::Answer)
    }

    pub fn authority(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(|r| r.place == Placement::Authority)
    }

    /// NS records handed out for a child zone, with no answer data.
    pub fn delegation(&self) -> Option<Vec<&ResourceRecord>> {
        if self.rcode != ResponseCode::NoError || self.answers().next().is_some() {
            return None;
        }
        let ns: Vec<&ResourceRecord> = self
            .authority()
            .filter(|r| r.record_type == RecordType::NS)
            .collect();
        (!ns.is_empty()).then_some(ns)
    }
}

/// A locally configured zone: either served from its own records or
/// redirected to forwarders.
#[derive(Debug, Clone)]
pub struct AuthorityZone {
    name: DnsName,
    records: BTreeMap<DnsName, Vec<ResourceRecord>>,
    forwarders: Vec<SocketAddr>,
    recurse: bool,
}

impl AuthorityZone {
    pub fn new(name: DnsName) -> Self {
        Self {
            name,
            records: BTreeMap::new(),
            forwarders: Vec::new(),
            recurse: false,
        }
    }

    pub fn forwarding(name: DnsName, forwarders: Vec<SocketAddr>, recurse: bool) -> Self {
        Self {
            name,
            records: BTreeMap::new(),
            forwarders,
            recurse,
        }
    }

    pub fn add_record(&mut self, record: ResourceRecord) -> Result<(), DomainError> {
        if !record.name.is_subdomain_of(&self.name) {
            return Err(DomainError::InvalidRecordData(format!(
                "{} is outside zone {}",
                record.name, self.name
            )));
        }
        self.records
            .entry(record.name.clone())
            .or_default()
            .push(record.with_place(Placement::Answer));
        Ok(())
    }

    pub fn name(&self) -> &DnsName {
        &self.name
    }

    pub fn forwarders(&self) -> &[SocketAddr] {
        &self.forwarders
    }

    pub fn recurse(&self) -> bool {
        self.recurse
    }

    pub fn is_forwarding(&self) -> bool {
        !self.forwarders.is_empty()
    }

    pub fn soa(&self) -> Option<&ResourceRecord> {
        self.records
            .get(&self.name)?
            .iter()
            .find(|r| r.record_type == RecordType::SOA)
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Answers `qname`/`qtype` from the zone data, in this order: exact
    /// name, wildcard, delegation below the apex, NXDOMAIN.
    pub fn get_records(
        &self,
        qname: &DnsName,
        qtype: RecordType,
    ) -> Result<ZoneAnswer, ResolveError> {
        if !qname.is_subdomain_of(&self.name) {
            return Err(ResolveError::ConfigInconsistent(format!(
                "{} asked of zone {}",
                qname, self.name
            )));
        }

        if let Some(at_name) = self.records.get(qname) {
            let mut records = Vec::new();
            for record in at_name {
                if record.record_type.answers(qtype) || record.is_cname() {
                    records.push(record.clone());
                } else if record.record_type == RecordType::NS
                    && qname.num_labels() > self.name.num_labels()
                {
                    records.push(record.clone().with_place(Placement::Authority));
                }
            }
            if records.is_empty() {
                records.push(self.soa_for_authority()?);
            }
            return Ok(ZoneAnswer {
                rcode: ResponseCode::NoError,
                records,
            });
        }

        let mut wildcard_base = qname.clone();
        while wildcard_base != self.name {
            let Some(parent) = wildcard_base.parent() else {
                break;
            };
            wildcard_base = parent;

            let Ok(wildcard) = wildcard_base.wildcard_child() else {
                continue;
            };
            let Some(at_wildcard) = self.records.get(&wildcard) else {
                continue;
            };

            let mut records: Vec<ResourceRecord> = at_wildcard
                .iter()
                .filter(|r| r.record_type.answers(qtype) || r.is_cname())
                .map(|r| r.clone().with_name(qname.clone()))
                .collect();
            if records.is_empty() {
                records.push(self.soa_for_authority()?);
            }
            return Ok(ZoneAnswer {
                rcode: ResponseCode::NoError,
                records,
            });
        }

        for cut in qname
            .ancestors()
            .skip(1)
            .take_while(|cut| cut.is_strict_subdomain_of(&self.name))
        {
            let delegation: Vec<ResourceRecord> = self
                .records
                .get(&cut)
                .into_iter()
                .flatten()
                .filter(|r| r.record_type == RecordType::NS)
                .map(|r| r.clone().with_place(Placement::Authority))
                .collect();
            if !delegation.is_empty() {
                return Ok(ZoneAnswer {
                    rcode: ResponseCode::NoError,
                    records: delegation,
                });
            }
        }

        Ok(ZoneAnswer {
            rcode: ResponseCode::NXDomain,
            records: vec![self.soa_for_authority()?],
        })
    }

    fn soa_for_authority(&self) -> Result<ResourceRecord, ResolveError> {
        self.soa()
            .map(|soa| soa.clone().with_place(Placement::Authority))
            .ok_or_else(|| {
                ResolveError::ConfigInconsistent(format!("zone {} has no SOA record", self.name))
            })
    }
}
