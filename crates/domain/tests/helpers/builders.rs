#![allow(dead_code)]
use ferrous_recursor_domain::{DnsName, RecordData, RecordType, ResourceRecord};

pub fn name(s: &str) -> DnsName {
    DnsName::parse(s).unwrap()
}

pub struct RecordBuilder {
    name: String,
    record_type: RecordType,
    ttl: u32,
    data: String,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.".to_string(),
            record_type: RecordType::A,
            ttl: 300,
            data: "192.0.2.1".to_string(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_string();
        self
    }

    pub fn build(self) -> ResourceRecord {
        let owner = name(&self.name);
        let data = RecordData::parse(self.record_type, &self.data, &owner).unwrap();
        ResourceRecord::new(owner, self.record_type, self.ttl, data)
    }
}
