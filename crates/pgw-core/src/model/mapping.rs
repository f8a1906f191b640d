// ── Client-to-proxy mapping ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::Client;
use super::entity_id::{EntityId, Identified};
use super::proxy::Proxy;

/// Lifecycle state reported by the gateway for a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MappingState {
    #[default]
    Pending,
    Applied,
    Active,
    Failed,
    Error,
    Other(String),
}

impl MappingState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Applied => "APPLIED",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::Other(s) => s,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Applied | Self::Active)
    }
}

impl From<String> for MappingState {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "APPLIED" => Self::Applied,
            "ACTIVE" => Self::Active,
            "FAILED" => Self::Failed,
            "ERROR" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<MappingState> for String {
    fn from(s: MappingState) -> Self {
        s.as_str().to_owned()
    }
}

impl fmt::Display for MappingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes one client's traffic through one proxy.
///
/// Listings from the active endpoint embed the client and proxy objects;
/// the foreign ids are filled from those when the raw ids are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub id: EntityId,
    pub client_id: Option<EntityId>,
    pub proxy_id: Option<EntityId>,
    pub client: Option<Client>,
    pub proxy: Option<Proxy>,
    pub protocol: Option<String>,
    /// Local redirect port; `None` until the agent assigns one.
    pub local_port: Option<u16>,
    pub state: MappingState,
    pub last_applied_at: Option<DateTime<Utc>>,
}

impl Mapping {
    /// The client address, bare IP when it is a single host.
    pub fn client_ip(&self) -> Option<&str> {
        self.client
            .as_ref()
            .map(|c| c.ip_cidr.strip_suffix("/32").unwrap_or(&c.ip_cidr))
    }

    /// `host:port` of the target proxy, when embedded.
    pub fn proxy_address(&self) -> Option<String> {
        self.proxy.as_ref().map(Proxy::address)
    }
}

impl Identified for Mapping {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_roundtrips_known_and_unknown() {
        assert_eq!(MappingState::from("applied".to_owned()), MappingState::Applied);
        let odd = MappingState::from("DRAINING".to_owned());
        assert_eq!(odd.as_str(), "DRAINING");
        assert!(!odd.is_healthy());
        assert!(MappingState::Active.is_healthy());
    }
}
