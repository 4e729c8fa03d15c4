mod admin;
mod answer;
mod builder;
mod cache_check;
mod context;
mod core;
mod delegation;
mod query;
mod root_hints;
mod special_names;
mod stats;

pub use builder::RecursorBuilder;
pub use self::core::Recursor;
pub use root_hints::RootHints;
pub use stats::RecursorStats;
