mod clear_server_state;
mod get_stats;
mod wipe_cache;

pub use clear_server_state::{ClearServerStateUseCase, PruneNsSpeedsUseCase, ServerStateScope};
pub use get_stats::GetRecursorStatsUseCase;
pub use wipe_cache::WipeCacheUseCase;
