mod clock;
mod nameserver_transport;
mod recursive_resolver;
mod recursor_admin;

pub use clock::Clock;
pub use nameserver_transport::{AskRequest, NameserverTransport, RawAnswer};
pub use recursive_resolver::{RecursiveResolver, Resolution, ResolutionCounters, ResolveOptions};
pub use recursor_admin::{RecursorAdminPort, RecursorStatsSnapshot};

// Re-export for convenience
pub use ferrous_recursor_domain::DnsQuery;
