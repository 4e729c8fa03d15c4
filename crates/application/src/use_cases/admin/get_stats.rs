use crate::ports::{RecursorAdminPort, RecursorStatsSnapshot};
use std::sync::Arc;

pub struct GetRecursorStatsUseCase {
    admin: Arc<dyn RecursorAdminPort>,
}

impl GetRecursorStatsUseCase {
    pub fn new(admin: Arc<dyn RecursorAdminPort>) -> Self {
        Self { admin }
    }

    pub fn execute(&self) -> RecursorStatsSnapshot {
        self.admin.stats()
    }
}
