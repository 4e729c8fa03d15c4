use std::net::SocketAddr;

use thiserror::Error;

use crate::dns_name::DnsName;
use crate::response_code::ResponseCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR format: {0}")]
    InvalidCidr(String),

    #[error("Invalid record data: {0}")]
    InvalidRecordData(String),

    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),
}

/// Failure reported by a transport for a single round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("timed out")]
    Timeout,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Timeout waiting for {server}")]
    Timeout { server: SocketAddr },

    #[error("Server {server} unreachable: {reason}")]
    Unreachable { server: SocketAddr, reason: String },

    #[error("Malformed response from {server}: {reason}")]
    MalformedResponse { server: SocketAddr, reason: String },

    #[error("Server {server} answered {rcode}")]
    ServerFailure {
        server: SocketAddr,
        rcode: ResponseCode,
    },

    #[error("Lame delegation for {zone} from {server}")]
    LameDelegation { server: SocketAddr, zone: DnsName },

    #[error("Resolution loop detected at {qname}")]
    LoopDetected { qname: DnsName },

    #[error("Maximum recursion depth {depth} exceeded")]
    DepthExceeded { depth: u32 },

    #[error("No authority found for {qname}")]
    NoAuthorityFound { qname: DnsName },

    #[error("Inconsistent configuration: {0}")]
    ConfigInconsistent(String),

    #[error("All servers for {zone} failed")]
    ServersExhausted { zone: DnsName },

    #[error("More than {limit} outgoing queries for one resolution")]
    QueryLimitExceeded { limit: u32 },

    #[error("Resolution time budget exceeded")]
    TimeLimitExceeded,

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl ResolveError {
    pub fn from_network(server: SocketAddr, error: NetworkError) -> Self {
        match error {
            NetworkError::Timeout => ResolveError::Timeout { server },
            NetworkError::Unreachable(reason) => ResolveError::Unreachable { server, reason },
            NetworkError::Malformed(reason) => ResolveError::MalformedResponse { server, reason },
        }
    }

    /// Errors that abort the whole top-level resolution instead of only the
    /// current server or delegation branch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ResolveError::DepthExceeded { .. }
                | ResolveError::QueryLimitExceeded { .. }
                | ResolveError::TimeLimitExceeded
                | ResolveError::NoAuthorityFound { .. }
                | ResolveError::ConfigInconsistent(_)
                | ResolveError::UnsupportedQuery(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Timeout { .. } => "timeout",
            ResolveError::Unreachable { .. } => "unreachable",
            ResolveError::MalformedResponse { .. } => "malformed_response",
            ResolveError::ServerFailure { .. } => "server_failure",
            ResolveError::LameDelegation { .. } => "lame_delegation",
            ResolveError::LoopDetected { .. } => "loop_detected",
            ResolveError::DepthExceeded { .. } => "depth_exceeded",
            ResolveError::NoAuthorityFound { .. } => "no_authority_found",
            ResolveError::ConfigInconsistent(_) => "config_inconsistent",
            ResolveError::ServersExhausted { .. } => "servers_exhausted",
            ResolveError::QueryLimitExceeded { .. } => "query_limit_exceeded",
            ResolveError::TimeLimitExceeded => "time_limit_exceeded",
            ResolveError::UnsupportedQuery(_) => "unsupported_query",
        }
    }
}
