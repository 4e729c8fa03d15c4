use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

/// Canonical, fully qualified DNS name.
///
/// Always lowercase ASCII and always terminated by a dot; the root zone is
/// `"."`. Comparisons are therefore case-insensitive by construction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DnsName(CompactString);

impl DnsName {
    pub fn root() -> Self {
        Self(CompactString::new("."))
    }

    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self::root());
        }

        let body = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if body.len() + 1 > MAX_NAME_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "{}: name longer than {} octets",
                input, MAX_NAME_LEN
            )));
        }

        for label in body.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(format!(
                    "{}: empty label",
                    input
                )));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "{}: label longer than {} octets",
                    input, MAX_LABEL_LEN
                )));
            }
            if label.chars().any(|c| c.is_whitespace() || !c.is_ascii()) {
                return Err(DomainError::InvalidDomainName(format!(
                    "{}: invalid character in label",
                    input
                )));
            }
        }

        let mut canonical = CompactString::with_capacity(body.len() + 1);
        for c in body.chars() {
            canonical.push(c.to_ascii_lowercase());
        }
        canonical.push('.');
        Ok(Self(canonical))
    }

    /// Parses `input` relative to `origin`: `@` is the origin itself and
    /// names without a trailing dot are appended to it.
    pub fn parse_relative(input: &str, origin: &DnsName) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed == "@" {
            return Ok(origin.clone());
        }
        if trimmed.ends_with('.') {
            return Self::parse(trimmed);
        }
        if origin.is_root() {
            return Self::parse(trimmed);
        }
        Self::parse(&format!("{}.{}", trimmed, origin.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    pub fn num_labels(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('.').count()
        }
    }

    /// Labels from the leftmost (most specific) to the rightmost.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|label| !label.is_empty())
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels().next()
    }

    /// The name with its leftmost label removed, `None` at the root.
    pub fn parent(&self) -> Option<DnsName> {
        if self.is_root() {
            return None;
        }
        match self.0.find('.') {
            Some(idx) if idx + 1 < self.0.len() => {
                Some(Self(CompactString::from(&self.0[idx + 1..])))
            }
            _ => Some(Self::root()),
        }
    }

    /// True when `self` equals `zone` or lies below it.
    pub fn is_subdomain_of(&self, zone: &DnsName) -> bool {
        if zone.is_root() || self == zone {
            return true;
        }
        let own = self.0.as_str();
        let other = zone.0.as_str();
        own.len() > other.len()
            && own.ends_with(other)
            && own.as_bytes()[own.len() - other.len() - 1] == b'.'
    }

    pub fn is_strict_subdomain_of(&self, zone: &DnsName) -> bool {
        self != zone && self.is_subdomain_of(zone)
    }

    /// `*.<self>`, the wildcard owner covering the children of this name.
    pub fn wildcard_child(&self) -> Result<DnsName, DomainError> {
        self.prepend_label("*")
    }

    pub fn prepend_label(&self, label: &str) -> Result<DnsName, DomainError> {
        if self.is_root() {
            Self::parse(&format!("{}.", label))
        } else {
            Self::parse(&format!("{}.{}", label, self.0))
        }
    }

    /// Walks from this name up to and including the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }
}

pub struct Ancestors {
    next: Option<DnsName>,
}

impl Iterator for Ancestors {
    type Item = DnsName;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DnsName({})", self.0)
    }
}

impl FromStr for DnsName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DnsName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DnsName> for String {
    fn from(name: DnsName) -> Self {
        name.0.into()
    }
}

impl AsRef<str> for DnsName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
