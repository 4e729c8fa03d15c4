use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::RecordType;
use crate::dns_name::DnsName;
use crate::errors::DomainError;

/// Start of authority fields. `minimum` bounds negative caching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Soa {
    pub mname: DnsName,
    pub rname: DnsName,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl Soa {
    fn parse(text: &str, origin: &DnsName) -> Result<Self, DomainError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(DomainError::InvalidRecordData(format!(
                "SOA needs 7 fields, got {}: {}",
                fields.len(),
                text
            )));
        }
        let number = |field: &str| {
            field.parse::<u32>().map_err(|_| {
                DomainError::InvalidRecordData(format!("SOA field is not a number: {}", field))
            })
        };
        Ok(Self {
            mname: DnsName::parse_relative(fields[0], origin)?,
            rname: DnsName::parse_relative(fields[1], origin)?,
            serial: number(fields[2])?,
            refresh: number(fields[3])?,
            retry: number(fields[4])?,
            expire: number(fields[5])?,
            minimum: number(fields[6])?,
        })
    }
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(DnsName),
    CNAME(DnsName),
    PTR(DnsName),
    MX { preference: u16, exchange: DnsName },
    SOA(Soa),
    TXT(Vec<String>),
    /// Any other type, kept in presentation form.
    Other(String),
}

impl RecordData {
    /// Parses presentation-format `text` for `record_type`; relative names
    /// are completed with `origin`.
    pub fn parse(
        record_type: RecordType,
        text: &str,
        origin: &DnsName,
    ) -> Result<Self, DomainError> {
        let text = text.trim();
        match record_type {
            RecordType::A => text
                .parse::<Ipv4Addr>()
                .map(RecordData::A)
                .map_err(|_| DomainError::InvalidIpAddress(text.to_string())),
            RecordType::AAAA => text
                .parse::<Ipv6Addr>()
                .map(RecordData::AAAA)
                .map_err(|_| DomainError::InvalidIpAddress(text.to_string())),
            RecordType::NS => Ok(RecordData::NS(DnsName::parse_relative(text, origin)?)),
            RecordType::CNAME => Ok(RecordData::CNAME(DnsName::parse_relative(text, origin)?)),
            RecordType::PTR => Ok(RecordData::PTR(DnsName::parse_relative(text, origin)?)),
            RecordType::MX => {
                let (pref, exchange) = text.split_once(char::is_whitespace).ok_or_else(|| {
                    DomainError::InvalidRecordData(format!("MX needs preference and host: {}", text))
                })?;
                let preference = pref.parse::<u16>().map_err(|_| {
                    DomainError::InvalidRecordData(format!("Invalid MX preference: {}", pref))
                })?;
                Ok(RecordData::MX {
                    preference,
                    exchange: DnsName::parse_relative(exchange, origin)?,
                })
            }
            RecordType::SOA => Ok(RecordData::SOA(Soa::parse(text, origin)?)),
            RecordType::TXT => Ok(RecordData::TXT(vec![text.trim_matches('"').to_string()])),
            t if t.is_meta() => Err(DomainError::InvalidRecordData(format!(
                "{} cannot carry record data",
                t
            ))),
            _ => Ok(RecordData::Other(text.to_string())),
        }
    }

    /// The name this record points at, for types that carry one.
    pub fn target_name(&self) -> Option<&DnsName> {
        match self {
            RecordData::NS(name) | RecordData::CNAME(name) | RecordData::PTR(name) => Some(name),
            RecordData::MX { exchange, .. } => Some(exchange),
            _ => None,
        }
    }

    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self {
            RecordData::A(addr) => Some(IpAddr::V4(*addr)),
            RecordData::AAAA(addr) => Some(IpAddr::V6(*addr)),
            _ => None,
        }
    }

    pub fn as_soa(&self) -> Option<&Soa> {
        match self {
            RecordData::SOA(soa) => Some(soa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(addr) => write!(f, "{}", addr),
            RecordData::AAAA(addr) => write!(f, "{}", addr),
            RecordData::NS(name) | RecordData::CNAME(name) | RecordData::PTR(name) => {
                write!(f, "{}", name)
            }
            RecordData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RecordData::SOA(soa) => write!(f, "{}", soa),
            RecordData::TXT(parts) => {
                let quoted: Vec<String> = parts.iter().map(|p| format!("\"{}\"", p)).collect();
                write!(f, "{}", quoted.join(" "))
            }
            RecordData::Other(text) => write!(f, "{}", text),
        }
    }
}
