use super::zone::AuthorityZone;
use ferrous_recursor_domain::config::{AuthorityZoneConfig, ZoneRecordConfig};
use ferrous_recursor_domain::{
    ConfigError, DnsName, DomainError, RecordData, RecordType, ResourceRecord,
};
use rustc_hash::FxHashSet;
use std::str::FromStr;
use tracing::{info, warn};

/// Builds the runtime zone table from configuration. Every zone served
/// from local records must carry an SOA at its apex.
pub fn load_zones(configs: &[AuthorityZoneConfig]) -> Result<Vec<AuthorityZone>, ConfigError> {
    let mut seen = FxHashSet::default();
    let mut zones = Vec::with_capacity(configs.len());

    for config in configs {
        let name = DnsName::parse(&config.name).map_err(|e| ConfigError::zone(&config.name, e))?;
        if !seen.insert(name.clone()) {
            return Err(ConfigError::zone(name.as_str(), "configured twice"));
        }

        let zone = if config.is_forwarding() {
            if !config.records.is_empty() {
                warn!(
                    zone = %name,
                    records = config.records.len(),
                    "Ignoring records of a forwarding zone"
                );
            }
            AuthorityZone::forwarding(name, config.forwarder_addrs()?, config.recurse)
        } else {
            load_records(name, &config.records)?
        };
        zones.push(zone);
    }

    info!(
        zones = zones.len(),
        records = zones.iter().map(AuthorityZone::record_count).sum::<usize>(),
        "Loaded authority zones"
    );
    Ok(zones)
}

fn load_records(name: DnsName, records: &[ZoneRecordConfig]) -> Result<AuthorityZone, ConfigError> {
    let zone_name = name.to_string();
    let invalid = |error: DomainError| ConfigError::zone(zone_name.as_str(), error);
    let mut zone = AuthorityZone::new(name);

    for entry in records {
        let owner = DnsName::parse_relative(&entry.name, zone.name()).map_err(invalid)?;
        let record_type = RecordType::from_str(&entry.record_type)
            .map_err(|e| invalid(DomainError::UnknownRecordType(e)))?;
        let data = RecordData::parse(record_type, &entry.data, zone.name()).map_err(invalid)?;
        zone.add_record(ResourceRecord::new(owner, record_type, entry.ttl, data))
            .map_err(invalid)?;
    }

    if zone.soa().is_none() {
        return Err(ConfigError::zone(zone_name, "no SOA record at the apex"));
    }
    Ok(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, record_type: &str, data: &str) -> ZoneRecordConfig {
        ZoneRecordConfig {
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl: 300,
            data: data.to_string(),
        }
    }

    fn served(name: &str, records: Vec<ZoneRecordConfig>) -> AuthorityZoneConfig {
        AuthorityZoneConfig {
            name: name.to_string(),
            forwarders: Vec::new(),
            recurse: false,
            records,
        }
    }

    #[test]
    fn test_loads_relative_names() {
        let zones = load_zones(&[served(
            "example.",
            vec![
                record("@", "SOA", "ns1 hostmaster 1 3600 900 604800 300"),
                record("www", "A", "192.0.2.10"),
            ],
        )])
        .unwrap();

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].record_count(), 2);
        let answer = zones[0]
            .get_records(&DnsName::parse("www.example.").unwrap(), RecordType::A)
            .unwrap();
        assert_eq!(answer.records.len(), 1);
    }

    #[test]
    fn test_zone_without_soa_is_rejected() {
        let err = load_zones(&[served("example.", vec![record("www", "A", "192.0.2.10")])])
            .unwrap_err();
        assert!(err.to_string().contains("SOA"));
    }

    #[test]
    fn test_forwarding_zone_needs_no_soa() {
        let zones = load_zones(&[AuthorityZoneConfig {
            name: "corp.".to_string(),
            forwarders: vec!["192.0.2.53".to_string()],
            recurse: true,
            records: Vec::new(),
        }])
        .unwrap();
        assert!(zones[0].is_forwarding());
        assert!(zones[0].recurse());
        assert_eq!(zones[0].forwarders()[0].port(), 53);
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let soa = || vec![record("@", "SOA", "ns1 hostmaster 1 3600 900 604800 300")];
        assert!(load_zones(&[served("example.", soa()), served("EXAMPLE", soa())]).is_err());
    }

    #[test]
    fn test_bad_record_type_rejected() {
        assert!(load_zones(&[served("example.", vec![record("www", "BOGUS", "x")])]).is_err());
    }
}
