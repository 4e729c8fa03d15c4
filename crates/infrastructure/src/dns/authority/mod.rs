pub mod loader;
mod zone;
mod zone_map;

pub use loader::load_zones;
pub use zone::{AuthorityZone, ZoneAnswer};
pub use zone_map::AuthorityZones;
