// Wire types for the gateway API.
//
// Field names follow the backend's snake_case JSON. Everything the backend
// may omit is `#[serde(default)]` so older servers still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Proxies ─────────────────────────────────────────────────────────

/// A proxy as returned by `GET /v1/proxies` and `POST /v1/proxies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub proxy_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub exit_ip: Option<String>,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/proxies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyCreate {
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

// ── Clients ─────────────────────────────────────────────────────────

/// A client address specification as returned by `GET /v1/clients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: String,
    #[serde(default)]
    pub ip_cidr: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

/// Body of `POST /v1/clients`. The server normalizes a bare IP to `/32`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub ip_cidr: String,
    pub enabled: bool,
}

// ── Mappings ────────────────────────────────────────────────────────

/// A mapping as returned by either `GET /v1/mappings/active` (resolved
/// `client`/`proxy` objects, no foreign ids) or `POST /v1/mappings`
/// (foreign ids, no resolved objects).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResponse {
    pub id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub proxy_id: Option<String>,
    #[serde(default)]
    pub client: Option<ClientResponse>,
    #[serde(default)]
    pub proxy: Option<ProxyResponse>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub local_redirect_port: Option<u32>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_applied_at: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/mappings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingCreate {
    pub client_id: String,
    pub proxy_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn active_mapping_decodes_nested_objects() {
        let raw = json!({
            "id": "m-1",
            "client": { "id": "c-1", "ip_cidr": "10.0.0.5/32", "enabled": true },
            "proxy": {
                "id": "p-1", "type": "http", "host": "1.2.3.4", "port": 3128,
                "enabled": true, "status": "OK", "latency_ms": 42
            },
            "state": "APPLIED",
            "local_redirect_port": 15001
        });

        let mapping: MappingResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(mapping.client.as_ref().unwrap().ip_cidr, "10.0.0.5/32");
        assert_eq!(mapping.proxy.as_ref().unwrap().latency_ms, Some(42));
        assert!(mapping.client_id.is_none());
        assert_eq!(mapping.local_redirect_port, Some(15001));
    }

    #[test]
    fn proxy_create_uses_type_field() {
        let body = ProxyCreate {
            proxy_type: "http".into(),
            host: "10.0.0.1".into(),
            port: 8080,
            username: String::new(),
            password: String::new(),
            enabled: true,
            label: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "http");
        assert!(value.get("label").is_none());
    }
}
