//! Ferrous Recursor Domain Layer
pub mod config;
pub mod dns_name;
pub mod dns_query;
pub mod dns_record;
pub mod dnssec;
pub mod errors;
pub mod response_code;
pub mod timestamp;

pub use config::{Config, ConfigError};
pub use dns_name::DnsName;
pub use dns_query::DnsQuery;
pub use dns_record::{DnsClass, Placement, RecordData, RecordType, ResourceRecord, Soa};
pub use dnssec::DnssecStatus;
pub use errors::{DomainError, NetworkError, ResolveError};
pub use response_code::{ResolutionStatus, ResponseCode};
pub use timestamp::Timestamp;
