//! Cross-Language Linker (C5, spec §4.5).

pub mod endpoints;
pub mod fingerprint;

pub use endpoints::{link_endpoints, LinkStats};
