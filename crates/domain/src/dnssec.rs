use std::str::FromStr;

/// Validation state attached to cached data. The engine only carries it;
/// signature checking happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DnssecStatus {
    #[default]
    Unknown,
    Secure,
    Insecure,
    Bogus,
    Indeterminate,
}

impl DnssecStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnssecStatus::Unknown => "Unknown",
            DnssecStatus::Secure => "Secure",
            DnssecStatus::Insecure => "Insecure",
            DnssecStatus::Bogus => "Bogus",
            DnssecStatus::Indeterminate => "Indeterminate",
        }
    }

    /// Whether data in this state may be served to a client that asked for
    /// validation.
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, DnssecStatus::Bogus)
    }
}

impl FromStr for DnssecStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(DnssecStatus::Unknown),
            "Secure" => Ok(DnssecStatus::Secure),
            "Insecure" => Ok(DnssecStatus::Insecure),
            "Bogus" => Ok(DnssecStatus::Bogus),
            "Indeterminate" => Ok(DnssecStatus::Indeterminate),
            _ => Err(format!("Unknown DNSSEC status: {}", s)),
        }
    }
}
