//! Ferrous Recursor Infrastructure Layer
pub mod dns;
pub mod logging;
pub mod system;
