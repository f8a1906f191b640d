// ── API-to-domain type conversions ──
//
// Bridges raw `pgw_api` response types into canonical `crate::model`
// domain types, and domain requests back into wire bodies. Empty
// credential strings are treated as absent in both directions.

use secrecy::{ExposeSecret, SecretString};

use pgw_api::models::{
    ClientCreate, ClientResponse, MappingCreate, MappingResponse, ProxyCreate, ProxyResponse,
};

use crate::command::{CreateClientRequest, CreateMappingRequest, CreateProxyRequest};
use crate::model::{Client, EntityId, Mapping, MappingState, Proxy, ProxyStatus, ProxyType};

// ── Helpers ────────────────────────────────────────────────────────

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Ports outside the u16 range, and zero, mean "unassigned".
fn port_or_none(port: Option<u32>) -> Option<u16> {
    port.and_then(|p| u16::try_from(p).ok()).filter(|p| *p != 0)
}

// ── Proxy ──────────────────────────────────────────────────────────

impl From<ProxyResponse> for Proxy {
    fn from(p: ProxyResponse) -> Self {
        Proxy {
            id: EntityId::from(p.id),
            label: non_empty(p.label),
            proxy_type: ProxyType::from(p.proxy_type),
            host: p.host,
            port: u16::try_from(p.port).unwrap_or_default(),
            username: non_empty(p.username),
            password: non_empty(p.password).map(SecretString::from),
            enabled: p.enabled,
            status: ProxyStatus::from_wire(p.status.as_deref()),
            latency_ms: p.latency_ms,
            exit_ip: non_empty(p.exit_ip),
            last_checked_at: p.last_checked_at,
        }
    }
}

impl From<&CreateProxyRequest> for ProxyCreate {
    fn from(r: &CreateProxyRequest) -> Self {
        ProxyCreate {
            proxy_type: r.proxy_type.as_str().to_owned(),
            host: r.host.trim().to_owned(),
            port: r.port,
            username: r.username.clone().unwrap_or_default(),
            password: r
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default(),
            enabled: r.enabled,
            label: r.label.clone().filter(|l| !l.is_empty()),
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

impl From<ClientResponse> for Client {
    fn from(c: ClientResponse) -> Self {
        Client {
            id: EntityId::from(c.id),
            ip_cidr: c.ip_cidr,
            note: non_empty(c.note),
            enabled: c.enabled,
        }
    }
}

impl From<&CreateClientRequest> for ClientCreate {
    fn from(r: &CreateClientRequest) -> Self {
        ClientCreate {
            ip_cidr: r.ip_cidr.clone(),
            enabled: r.enabled,
        }
    }
}

// ── Mapping ────────────────────────────────────────────────────────

impl From<MappingResponse> for Mapping {
    fn from(m: MappingResponse) -> Self {
        let client = m.client.map(Client::from);
        let proxy = m.proxy.map(Proxy::from);

        let client_id = non_empty(m.client_id)
            .map(EntityId::from)
            .or_else(|| client.as_ref().map(|c| c.id.clone()));
        let proxy_id = non_empty(m.proxy_id)
            .map(EntityId::from)
            .or_else(|| proxy.as_ref().map(|p| p.id.clone()));

        Mapping {
            id: EntityId::from(m.id),
            client_id,
            proxy_id,
            client,
            proxy,
            protocol: non_empty(m.protocol),
            local_port: port_or_none(m.local_redirect_port),
            state: m.state.map(MappingState::from).unwrap_or_default(),
            last_applied_at: m.last_applied_at,
        }
    }
}

impl From<&CreateMappingRequest> for MappingCreate {
    fn from(r: &CreateMappingRequest) -> Self {
        MappingCreate {
            client_id: r.client_id.to_string(),
            proxy_id: r.proxy_id.to_string(),
        }
    }
}
