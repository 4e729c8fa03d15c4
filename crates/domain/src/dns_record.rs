mod record;
mod record_data;
mod record_type;

pub use record::{DnsClass, Placement, ResourceRecord};
pub use record_data::{RecordData, Soa};
pub use record_type::RecordType;
