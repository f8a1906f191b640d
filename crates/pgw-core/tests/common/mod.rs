#![allow(dead_code, clippy::unwrap_used)]
// In-memory gateway used by the controller tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use pgw_core::{
    Backend, Client, ControllerConfig, CoreError, CreateClientRequest, CreateMappingRequest,
    CreateProxyRequest, EntityId, Mapping, MappingState, MemoryPreferences, Notification, Proxy,
    ProxyStatus, ProxyType,
};

#[derive(Default)]
pub struct FakeState {
    pub proxies: Vec<Proxy>,
    pub clients: Vec<Client>,
    pub mappings: Vec<Mapping>,
    next_id: u64,
    calls: BTreeMap<&'static str, usize>,
    pub created_clients: Vec<String>,

    // ── Failure injection ───────────────────────────────────────────
    pub fail_list_mappings: bool,
    pub fail_create_hosts: HashSet<String>,
    pub fail_check_ids: HashSet<String>,
    pub fail_reconcile: bool,
    pub list_delay: Option<Duration>,
    pub check_delay: Option<Duration>,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> EntityId {
        self.next_id += 1;
        EntityId::from(format!("{prefix}-{}", self.next_id))
    }

    fn record(&mut self, call: &'static str) {
        *self.calls.entry(call).or_default() += 1;
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn calls(&self, call: &str) -> usize {
        self.with(|s| s.calls.get(call).copied().unwrap_or(0))
    }

    /// Total number of mutating calls made so far.
    pub fn remote_writes(&self) -> usize {
        [
            "create_proxy",
            "delete_proxy",
            "check_proxy",
            "create_client",
            "create_mapping",
            "delete_mapping",
            "reconcile",
        ]
        .iter()
        .map(|c| self.calls(c))
        .sum()
    }

    pub fn add_proxy(&self, host: &str, port: u16) -> EntityId {
        self.with(|s| {
            let id = s.next("p");
            s.proxies.push(proxy(id.as_str(), host, port));
            id
        })
    }

    pub fn add_client(&self, cidr: &str) -> EntityId {
        self.with(|s| {
            let id = s.next("c");
            s.clients.push(Client {
                id: id.clone(),
                ip_cidr: cidr.into(),
                note: None,
                enabled: true,
            });
            id
        })
    }

    pub fn add_mapping(&self, client_id: &EntityId, proxy_id: &EntityId) -> EntityId {
        self.with(|s| {
            let id = s.next("m");
            let mapping = resolve_mapping(s, id.clone(), client_id.clone(), proxy_id.clone());
            s.mappings.push(mapping);
            id
        })
    }
}

pub fn proxy(id: &str, host: &str, port: u16) -> Proxy {
    Proxy {
        id: EntityId::from(id),
        label: None,
        proxy_type: ProxyType::Http,
        host: host.into(),
        port,
        username: None,
        password: None,
        enabled: true,
        status: ProxyStatus::Unknown,
        latency_ms: None,
        exit_ip: None,
        last_checked_at: None,
    }
}

fn resolve_mapping(
    s: &FakeState,
    id: EntityId,
    client_id: EntityId,
    proxy_id: EntityId,
) -> Mapping {
    Mapping {
        id,
        client: s.clients.iter().find(|c| c.id == client_id).cloned(),
        proxy: s.proxies.iter().find(|p| p.id == proxy_id).cloned(),
        client_id: Some(client_id),
        proxy_id: Some(proxy_id),
        protocol: Some("http".into()),
        local_port: None,
        state: MappingState::Pending,
        last_applied_at: None,
    }
}

fn rejected(message: &str) -> CoreError {
    CoreError::Rejected {
        status: 500,
        message: message.into(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_proxies(&self) -> Result<Vec<Proxy>, CoreError> {
        let delay = self.with(|s| {
            s.record("list_proxies");
            s.list_delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.with(|s| s.proxies.clone()))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, CoreError> {
        Ok(self.with(|s| {
            s.record("list_clients");
            s.clients.clone()
        }))
    }

    async fn list_active_mappings(&self) -> Result<Vec<Mapping>, CoreError> {
        self.with(|s| {
            s.record("list_active_mappings");
            if s.fail_list_mappings {
                return Err(rejected("mappings unavailable"));
            }
            let s: &FakeState = s;
            Ok(s.mappings
                .iter()
                .map(|m| {
                    resolve_mapping(
                        s,
                        m.id.clone(),
                        m.client_id.clone().unwrap(),
                        m.proxy_id.clone().unwrap(),
                    )
                })
                .collect())
        })
    }

    async fn create_proxy(&self, req: &CreateProxyRequest) -> Result<Proxy, CoreError> {
        self.with(|s| {
            s.record("create_proxy");
            if s.fail_create_hosts.contains(&req.host) {
                return Err(rejected("duplicate proxy"));
            }
            let id = s.next("p");
            let mut created = proxy(id.as_str(), &req.host, req.port);
            created.username = req.username.clone();
            created.password = req.password.clone();
            s.proxies.push(created.clone());
            Ok(created)
        })
    }

    async fn delete_proxy(&self, id: &EntityId) -> Result<(), CoreError> {
        self.with(|s| {
            s.record("delete_proxy");
            s.proxies.retain(|p| &p.id != id);
            s.mappings.retain(|m| m.proxy_id.as_ref() != Some(id));
            Ok(())
        })
    }

    async fn check_proxy(&self, id: &EntityId) -> Result<Option<Proxy>, CoreError> {
        let delay = self.with(|s| {
            s.record("check_proxy");
            s.check_delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| {
            if s.fail_check_ids.contains(id.as_str()) {
                return Err(rejected("check timed out"));
            }
            let proxy = s
                .proxies
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "proxy".into(),
                    identifier: id.to_string(),
                })?;
            proxy.status = ProxyStatus::Ok;
            proxy.latency_ms = Some(42);
            Ok(Some(proxy.clone()))
        })
    }

    async fn create_client(&self, req: &CreateClientRequest) -> Result<Client, CoreError> {
        self.with(|s| {
            s.record("create_client");
            s.created_clients.push(req.ip_cidr.clone());
            let id = s.next("c");
            let cidr = if req.ip_cidr.contains('/') {
                req.ip_cidr.clone()
            } else {
                format!("{}/32", req.ip_cidr)
            };
            let client = Client {
                id,
                ip_cidr: cidr,
                note: None,
                enabled: req.enabled,
            };
            s.clients.push(client.clone());
            Ok(client)
        })
    }

    async fn create_mapping(&self, req: &CreateMappingRequest) -> Result<Mapping, CoreError> {
        self.with(|s| {
            s.record("create_mapping");
            if !s.proxies.iter().any(|p| p.id == req.proxy_id) {
                return Err(CoreError::Rejected {
                    status: 400,
                    message: "unknown proxy".into(),
                });
            }
            let id = s.next("m");
            let mapping = resolve_mapping(s, id, req.client_id.clone(), req.proxy_id.clone());
            s.mappings.push(mapping.clone());
            Ok(mapping)
        })
    }

    async fn delete_mapping(&self, id: &EntityId) -> Result<(), CoreError> {
        self.with(|s| {
            s.record("delete_mapping");
            s.mappings.retain(|m| &m.id != id);
            Ok(())
        })
    }

    async fn reconcile(&self) -> Result<(), CoreError> {
        self.with(|s| {
            s.record("reconcile");
            if s.fail_reconcile {
                Err(rejected("agent down"))
            } else {
                Ok(())
            }
        })
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        refresh_interval_secs: 0,
        ..ControllerConfig::default()
    }
}

pub fn controller(backend: &Arc<FakeBackend>) -> pgw_core::Controller {
    pgw_core::Controller::new(
        test_config(),
        Arc::clone(backend) as Arc<dyn Backend>,
        Arc::new(MemoryPreferences::new()),
    )
}

/// Everything broadcast since the receiver was created or last drained.
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}
