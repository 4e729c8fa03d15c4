use ferrous_recursor_application::ports::RawAnswer;
use ferrous_recursor_domain::{DnsName, RecordType, ResourceRecord, ResponseCode};
use rustc_hash::FxHashSet;

/// What a server's reply means for the question that was asked.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Classification {
    /// Data for the question, preceded by any CNAMEs that led to it.
    Answer { records: Vec<ResourceRecord> },
    /// The chain leaves what this server can speak for; resolve `target`.
    Cname {
        chain: Vec<ResourceRecord>,
        target: DnsName,
    },
    /// `name` (the end of `chain`) does not exist.
    NxDomain {
        name: DnsName,
        chain: Vec<ResourceRecord>,
        soa: Option<ResourceRecord>,
    },
    /// `name` exists but has nothing of the asked type.
    NoData {
        name: DnsName,
        chain: Vec<ResourceRecord>,
        soa: Option<ResourceRecord>,
    },
    /// A delegation to a zone cut strictly below the one asked.
    Referral {
        cut: DnsName,
        nameservers: Vec<DnsName>,
    },
    /// The server does not serve the zone it was asked about.
    Lame(String),
    /// The reply does not belong to the question.
    Malformed(String),
}

/// Sorts a NOERROR/NXDOMAIN reply from a server for `bailiwick` into one
/// of the outcomes above. With `recursive` the server is a recursing
/// forwarder: its answer is final and no zone-cut checks apply.
pub(super) fn classify(
    qname: &DnsName,
    qtype: RecordType,
    bailiwick: &DnsName,
    answer: &RawAnswer,
    recursive: bool,
) -> Classification {
    if let Some((name, rtype)) = &answer.question {
        if name != qname || *rtype != qtype {
            return Classification::Malformed(format!(
                "answer is for {} {}, asked {} {}",
                name, rtype, qname, qtype
            ));
        }
    }
    if !matches!(answer.rcode, ResponseCode::NoError | ResponseCode::NXDomain) {
        return Classification::Malformed(format!("unexpected rcode {}", answer.rcode));
    }

    let in_bailiwick = |name: &DnsName| recursive || name.is_subdomain_of(bailiwick);

    let mut chain = Vec::new();
    let mut current = qname.clone();
    let mut visited = FxHashSet::default();
    visited.insert(current.clone());

    while in_bailiwick(&current) {
        let data: Vec<ResourceRecord> = answer
            .answers
            .iter()
            .filter(|r| r.name == current && r.record_type.answers(qtype))
            .cloned()
            .collect();
        if !data.is_empty() {
            chain.extend(data);
            return Classification::Answer { records: chain };
        }

        let Some(cname) = answer
            .answers
            .iter()
            .find(|r| r.name == current && r.is_cname())
        else {
            break;
        };
        let Some(target) = cname.data.target_name().cloned() else {
            return Classification::Malformed(format!("CNAME at {} without target", current));
        };
        chain.push(cname.clone());
        if !visited.insert(target.clone()) {
            // the loop is reported by whoever chases it
            return Classification::Cname { chain, target };
        }
        current = target;
    }

    let soa = negative_soa(answer, &current, bailiwick, recursive);

    if !chain.is_empty() {
        if !in_bailiwick(&current) {
            return Classification::Cname {
                chain,
                target: current,
            };
        }
        if answer.rcode == ResponseCode::NXDomain {
            return Classification::NxDomain {
                name: current,
                chain,
                soa,
            };
        }
        if soa.is_some() || recursive {
            return Classification::NoData {
                name: current,
                chain,
                soa,
            };
        }
        return Classification::Cname {
            chain,
            target: current,
        };
    }

    if answer.rcode == ResponseCode::NXDomain {
        return Classification::NxDomain {
            name: current,
            chain,
            soa,
        };
    }

    if answer.authoritative && soa.is_some() {
        return Classification::NoData {
            name: current,
            chain,
            soa,
        };
    }

    if !recursive {
        if let Some(referral) = referral(answer, qname, bailiwick) {
            return referral;
        }
    }

    if soa.is_some() || answer.authoritative || recursive {
        return Classification::NoData {
            name: current,
            chain,
            soa,
        };
    }

    Classification::Lame(format!("no answer, referral or SOA for {}", qname))
}

/// A server for a delegation-only `zone` may answer for the apex or refer
/// further down; data, CNAMEs and NODATA for names below the apex become
/// an uncached NXDOMAIN.
pub(super) fn enforce_delegation_only(
    qname: &DnsName,
    zone: &DnsName,
    classification: Classification,
) -> Classification {
    if qname == zone {
        return classification;
    }
    match classification {
        Classification::Answer { .. }
        | Classification::Cname { .. }
        | Classification::NoData { .. } => Classification::NxDomain {
            name: qname.clone(),
            chain: Vec::new(),
            soa: None,
        },
        other => other,
    }
}

/// The SOA that may bound negative caching of `name`.
fn negative_soa(
    answer: &RawAnswer,
    name: &DnsName,
    bailiwick: &DnsName,
    recursive: bool,
) -> Option<ResourceRecord> {
    answer
        .authority
        .iter()
        .find(|r| {
            r.record_type == RecordType::SOA
                && name.is_subdomain_of(&r.name)
                && (recursive || r.name.is_subdomain_of(bailiwick))
        })
        .cloned()
}

fn referral(answer: &RawAnswer, qname: &DnsName, bailiwick: &DnsName) -> Option<Classification> {
    let cut = answer
        .authority
        .iter()
        .filter(|r| r.record_type == RecordType::NS && qname.is_subdomain_of(&r.name))
        .map(|r| &r.name)
        .max_by_key(|name| name.num_labels())?
        .clone();

    if !cut.is_strict_subdomain_of(bailiwick) {
        return Some(Classification::Lame(format!(
            "referral to {} is not below {}",
            cut, bailiwick
        )));
    }

    let mut nameservers: Vec<DnsName> = Vec::new();
    for record in answer
        .authority
        .iter()
        .filter(|r| r.record_type == RecordType::NS && r.name == cut)
    {
        if let Some(target) = record.data.target_name() {
            if !nameservers.contains(target) {
                nameservers.push(target.clone());
            }
        }
    }
    if nameservers.is_empty() {
        return Some(Classification::Lame(format!("empty NS set for {}", cut)));
    }

    Some(Classification::Referral { cut, nameservers })
}

/// Groups records into RRsets by (owner, type), keeping first-seen order.
pub(super) fn rrsets<'a, I>(records: I) -> Vec<Vec<ResourceRecord>>
where
    I: IntoIterator<Item = &'a ResourceRecord>,
{
    let mut sets: Vec<Vec<ResourceRecord>> = Vec::new();
    for record in records {
        match sets
            .iter_mut()
            .find(|set| set[0].name == record.name && set[0].record_type == record.record_type)
        {
            Some(set) => set.push(record.clone()),
            None => sets.push(vec![record.clone()]),
        }
    }
    sets
}
