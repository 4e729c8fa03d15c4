pub mod admin;
mod resolve_query;

pub use admin::{
    ClearServerStateUseCase, GetRecursorStatsUseCase, PruneNsSpeedsUseCase, ServerStateScope,
    WipeCacheUseCase,
};
pub use resolve_query::ResolveQueryUseCase;
