use crate::ports::{RecursiveResolver, Resolution, ResolveOptions};
use ferrous_recursor_domain::{DnsName, DnsQuery, DomainError, RecordType};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub struct ResolveQueryUseCase {
    resolver: Arc<dyn RecursiveResolver>,
}

impl ResolveQueryUseCase {
    pub fn new(resolver: Arc<dyn RecursiveResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves `domain`/`record_type`. Only an unparsable name is an error;
    /// resolution failures come back as a SERVFAIL `Resolution`.
    pub async fn execute(
        &self,
        domain: &str,
        record_type: RecordType,
        options: ResolveOptions,
    ) -> Result<Resolution, DomainError> {
        let name = DnsName::parse(domain)?;
        let query = DnsQuery::new(name, record_type);
        Ok(self.execute_query(&query, options).await)
    }

    pub async fn execute_query(&self, query: &DnsQuery, options: ResolveOptions) -> Resolution {
        let start = Instant::now();
        let resolution = self.resolver.resolve(query, options).await;
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &resolution.failure {
            Some(reason) => warn!(
                domain = %query.name,
                record_type = %query.record_type,
                reason = %reason,
                elapsed_us,
                "Resolution failed"
            ),
            None => debug!(
                domain = %query.name,
                record_type = %query.record_type,
                status = %resolution.status,
                records = resolution.records.len(),
                queries_sent = resolution.counters.queries_sent,
                elapsed_us,
                "Resolution complete"
            ),
        }

        resolution
    }
}
