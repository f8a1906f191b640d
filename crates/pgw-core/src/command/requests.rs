// ── Typed request structs for Command payloads ──
//
// Form input arrives here as plain strings and numbers; the
// controller validates before anything goes over the wire.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{EntityId, ProxyType};

// ── Proxies ────────────────────────────────────────────────────────

/// A new upstream proxy, from the create form or one import line.
#[derive(Debug, Clone, Default)]
pub struct CreateProxyRequest {
    pub proxy_type: ProxyType,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub enabled: bool,
    pub label: Option<String>,
}

impl CreateProxyRequest {
    /// An enabled HTTP proxy without credentials.
    pub fn http(host: impl Into<String>, port: u16) -> Self {
        Self {
            proxy_type: ProxyType::Http,
            host: host.into(),
            port,
            enabled: true,
            ..Self::default()
        }
    }

    /// Host must be present and free of whitespace; port must be non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ValidationError::MissingField { field: "host" });
        }
        if host.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidHost {
                input: host.to_owned(),
            });
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                input: self.port.to_string(),
            });
        }
        Ok(())
    }
}

// ── Mappings ───────────────────────────────────────────────────────

/// Raw input of the create-mapping form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMappingInput {
    /// Single IPv4 address as typed by the operator.
    pub client_ip: String,
    pub proxy_id: String,
}

/// Body sent to the gateway once the client has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMappingRequest {
    pub client_id: EntityId,
    pub proxy_id: EntityId,
}

// ── Clients ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    /// Bare IPv4 address; the gateway stores it as `/32`.
    pub ip_cidr: String,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_host_and_zero_port() {
        assert!(CreateProxyRequest::http("10.0.0.1", 8080).validate().is_ok());
        assert_eq!(
            CreateProxyRequest::http("  ", 8080).validate(),
            Err(ValidationError::MissingField { field: "host" })
        );
        assert_eq!(
            CreateProxyRequest::http("proxy one.example", 8080).validate(),
            Err(ValidationError::InvalidHost {
                input: "proxy one.example".into()
            })
        );
        assert!(matches!(
            CreateProxyRequest::http("10.0.0.1", 0).validate(),
            Err(ValidationError::InvalidPort { .. })
        ));
    }
}
