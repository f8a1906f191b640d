// ── Domain model ──
//
// Canonical types for everything the gateway exposes. Wire shapes live in
// `pgw_api::models`; `crate::convert` maps them onto these.

pub mod client;
pub mod entity_id;
pub mod mapping;
pub mod proxy;

pub use client::{Client, host_cidr, parse_client_ip};
pub use entity_id::{EntityId, Identified};
pub use mapping::{Mapping, MappingState};
pub use proxy::{Proxy, ProxyStatus, ProxyType};
