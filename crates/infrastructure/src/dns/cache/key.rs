use ferrous_recursor_domain::{DnsName, RecordType};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: DnsName,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(name: &DnsName, record_type: RecordType) -> Self {
        Self {
            name: name.clone(),
            record_type,
        }
    }
}

/// `qtype: None` is a whole-name (NXDOMAIN) entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NegativeKey {
    pub name: DnsName,
    pub qtype: Option<RecordType>,
}

impl NegativeKey {
    #[inline]
    pub fn new(name: &DnsName, qtype: Option<RecordType>) -> Self {
        Self {
            name: name.clone(),
            qtype,
        }
    }
}
