// ── Upstream proxy domain type ──

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity_id::{EntityId, Identified};

/// Protocol spoken by an upstream proxy.
///
/// The gateway may grow new protocols; unknown values are carried
/// through verbatim instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
    #[default]
    Http,
    Socks5,
    Other(String),
}

impl ProxyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Http => "http",
            Self::Socks5 => "socks5",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProxyType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "http" => Self::Http,
            "socks5" => Self::Socks5,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ProxyType {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<ProxyType> for String {
    fn from(t: ProxyType) -> Self {
        t.as_str().to_owned()
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the most recent health check.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyStatus {
    Ok,
    Degraded,
    Down,
    /// Never checked, or a value the console does not recognise.
    #[default]
    Unknown,
}

impl ProxyStatus {
    /// Parse the gateway's status string; anything unexpected is `Unknown`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Text used for ordering; an unchecked proxy sorts as the empty string.
    pub fn sort_text(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Degraded => "DEGRADED",
            Self::Down => "DOWN",
            Self::Unknown => "",
        }
    }
}

/// An upstream forwarding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proxy {
    pub id: EntityId,
    pub label: Option<String>,
    pub proxy_type: ProxyType,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    /// Never rendered or serialized.
    #[serde(skip)]
    pub password: Option<SecretString>,
    pub enabled: bool,
    pub status: ProxyStatus,
    pub latency_ms: Option<u64>,
    pub exit_ip: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Proxy {
    /// `host:port`, as shown in tables and compared when sorting by address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

impl Identified for Proxy {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_preserved() {
        assert_eq!(ProxyType::from("HTTP"), ProxyType::Http);
        assert_eq!(ProxyType::from("socks5"), ProxyType::Socks5);
        assert_eq!(ProxyType::from("https").as_str(), "https");
    }

    #[test]
    fn status_from_wire() {
        assert_eq!(ProxyStatus::from_wire(Some("OK")), ProxyStatus::Ok);
        assert_eq!(ProxyStatus::from_wire(Some("degraded")), ProxyStatus::Degraded);
        assert_eq!(ProxyStatus::from_wire(Some("CHECKING")), ProxyStatus::Unknown);
        assert_eq!(ProxyStatus::from_wire(None), ProxyStatus::Unknown);
        assert_eq!(ProxyStatus::Down.to_string(), "DOWN");
    }
}
