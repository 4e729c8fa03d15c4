use std::fmt;

use crate::dns_name::DnsName;
use crate::dns_record::{DnsClass, RecordType};

/// Canonical question key: case is already folded by `DnsName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuery {
    pub name: DnsName,
    pub record_type: RecordType,
    pub class: DnsClass,
}

impl DnsQuery {
    pub fn new(name: DnsName, record_type: RecordType) -> Self {
        Self {
            name,
            record_type,
            class: DnsClass::IN,
        }
    }

    pub fn with_class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.name, self.record_type, self.class)
    }
}
