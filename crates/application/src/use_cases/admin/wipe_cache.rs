use crate::ports::RecursorAdminPort;
use ferrous_recursor_domain::{DnsName, DomainError};
use std::sync::Arc;
use tracing::info;

pub struct WipeCacheUseCase {
    admin: Arc<dyn RecursorAdminPort>,
}

impl WipeCacheUseCase {
    pub fn new(admin: Arc<dyn RecursorAdminPort>) -> Self {
        Self { admin }
    }

    pub fn execute(&self, domain: &str, subtree: bool) -> Result<usize, DomainError> {
        let name = DnsName::parse(domain)?;
        let removed = self.admin.wipe_cache(&name, subtree);
        info!(domain = %name, subtree, removed, "Cache wiped");
        Ok(removed)
    }
}
