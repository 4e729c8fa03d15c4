use std::fmt;
use std::str::FromStr;

use super::{RecordData, RecordType};
use crate::dns_name::DnsName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DnsClass {
    #[default]
    IN,
    CH,
    ANY,
    Other(u16),
}

impl DnsClass {
    pub fn to_u16(&self) -> u16 {
        match self {
            DnsClass::IN => 1,
            DnsClass::CH => 3,
            DnsClass::ANY => 255,
            DnsClass::Other(code) => *code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            1 => DnsClass::IN,
            3 => DnsClass::CH,
            255 => DnsClass::ANY,
            other => DnsClass::Other(other),
        }
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsClass::IN => write!(f, "IN"),
            DnsClass::CH => write!(f, "CH"),
            DnsClass::ANY => write!(f, "ANY"),
            DnsClass::Other(code) => write!(f, "CLASS{}", code),
        }
    }
}

impl FromStr for DnsClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IN" => Ok(DnsClass::IN),
            "CH" | "CHAOS" => Ok(DnsClass::CH),
            "ANY" => Ok(DnsClass::ANY),
            other => other
                .strip_prefix("CLASS")
                .and_then(|n| n.parse::<u16>().ok())
                .map(DnsClass::from_u16)
                .ok_or_else(|| format!("Unknown DNS class: {}", s)),
        }
    }
}

/// Message section a record travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    #[default]
    Answer,
    Authority,
    Additional,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRecord {
    pub name: DnsName,
    pub record_type: RecordType,
    pub class: DnsClass,
    pub ttl: u32,
    pub data: RecordData,
    pub place: Placement,
}

impl ResourceRecord {
    pub fn new(name: DnsName, record_type: RecordType, ttl: u32, data: RecordData) -> Self {
        Self {
            name,
            record_type,
            class: DnsClass::IN,
            ttl,
            data,
            place: Placement::Answer,
        }
    }

    pub fn with_place(mut self, place: Placement) -> Self {
        self.place = place;
        self
    }

    pub fn with_class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_name(mut self, name: DnsName) -> Self {
        self.name = name;
        self
    }

    pub fn is_cname(&self) -> bool {
        self.record_type == RecordType::CNAME
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.class, self.record_type, self.data
        )
    }
}
