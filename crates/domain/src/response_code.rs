use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseCode {
    #[default]
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Other(u16),
}

impl ResponseCode {
    pub fn to_u16(&self) -> u16 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(code) => *code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Other(other),
        }
    }

    /// Codes a server returns when it chokes on an OPT record.
    pub fn is_edns_rejection(&self) -> bool {
        matches!(self, ResponseCode::FormErr | ResponseCode::NotImp)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::NoError => write!(f, "NOERROR"),
            ResponseCode::FormErr => write!(f, "FORMERR"),
            ResponseCode::ServFail => write!(f, "SERVFAIL"),
            ResponseCode::NXDomain => write!(f, "NXDOMAIN"),
            ResponseCode::NotImp => write!(f, "NOTIMP"),
            ResponseCode::Refused => write!(f, "REFUSED"),
            ResponseCode::Other(code) => write!(f, "RCODE{}", code),
        }
    }
}

/// Externally visible outcome of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    NoError,
    NxDomain,
    NoData,
    ServFail,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::NoError => "NOERROR",
            ResolutionStatus::NxDomain => "NXDOMAIN",
            ResolutionStatus::NoData => "NODATA",
            ResolutionStatus::ServFail => "SERVFAIL",
        }
    }

    /// Wire rcode; NODATA travels as NOERROR with an empty answer.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            ResolutionStatus::NoError | ResolutionStatus::NoData => ResponseCode::NoError,
            ResolutionStatus::NxDomain => ResponseCode::NXDomain,
            ResolutionStatus::ServFail => ResponseCode::ServFail,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, ResolutionStatus::NxDomain | ResolutionStatus::NoData)
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
