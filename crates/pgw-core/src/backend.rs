// ── Remote backend seam ──
//
// Everything the controller needs from the outside world, expressed in
// domain types. `HttpBackend` is the production implementation; tests
// substitute an in-memory fake.

use async_trait::async_trait;
use tracing::debug;

use pgw_api::models::{ClientCreate, MappingCreate, ProxyCreate};
use pgw_api::{AgentClient, GatewayClient, TlsMode, TransportConfig};

use crate::command::{CreateClientRequest, CreateMappingRequest, CreateProxyRequest};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Client, EntityId, Mapping, Proxy};

/// Remote operations against the gateway API and the reconciliation agent.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_proxies(&self) -> Result<Vec<Proxy>, CoreError>;
    async fn list_clients(&self) -> Result<Vec<Client>, CoreError>;
    async fn list_active_mappings(&self) -> Result<Vec<Mapping>, CoreError>;

    async fn create_proxy(&self, req: &CreateProxyRequest) -> Result<Proxy, CoreError>;
    async fn delete_proxy(&self, id: &EntityId) -> Result<(), CoreError>;
    /// Trigger a health check. `None` when the gateway returned no body.
    async fn check_proxy(&self, id: &EntityId) -> Result<Option<Proxy>, CoreError>;

    async fn create_client(&self, req: &CreateClientRequest) -> Result<Client, CoreError>;

    async fn create_mapping(&self, req: &CreateMappingRequest) -> Result<Mapping, CoreError>;
    async fn delete_mapping(&self, id: &EntityId) -> Result<(), CoreError>;

    /// Ask the agent to apply current mapping state to the network.
    async fn reconcile(&self) -> Result<(), CoreError>;
}

// ── HTTP implementation ────────────────────────────────────────────

/// Backend talking to a live gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    gateway: GatewayClient,
    agent: AgentClient,
}

impl HttpBackend {
    pub fn new(gateway: GatewayClient, agent: AgentClient) -> Self {
        Self { gateway, agent }
    }

    /// Build both clients from one shared transport.
    pub fn from_config(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let http = transport.build_client()?;
        let gateway = GatewayClient::from_reqwest(&config.api_base, http.clone())?;
        let agent = AgentClient::from_reqwest(&config.agent_base, http)?;
        debug!(api = %gateway.base_url(), agent = %agent.base_url(), "http backend ready");
        Ok(Self::new(gateway, agent))
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_proxies(&self) -> Result<Vec<Proxy>, CoreError> {
        let raw = self.gateway.list_proxies().await?;
        Ok(raw.into_iter().map(Proxy::from).collect())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, CoreError> {
        let raw = self.gateway.list_clients().await?;
        Ok(raw.into_iter().map(Client::from).collect())
    }

    async fn list_active_mappings(&self) -> Result<Vec<Mapping>, CoreError> {
        let raw = self.gateway.list_active_mappings().await?;
        Ok(raw.into_iter().map(Mapping::from).collect())
    }

    async fn create_proxy(&self, req: &CreateProxyRequest) -> Result<Proxy, CoreError> {
        let created = self.gateway.create_proxy(&ProxyCreate::from(req)).await?;
        Ok(Proxy::from(created))
    }

    async fn delete_proxy(&self, id: &EntityId) -> Result<(), CoreError> {
        Ok(self.gateway.delete_proxy(id.as_str()).await?)
    }

    async fn check_proxy(&self, id: &EntityId) -> Result<Option<Proxy>, CoreError> {
        let checked = self.gateway.check_proxy(id.as_str()).await?;
        Ok(checked.map(Proxy::from))
    }

    async fn create_client(&self, req: &CreateClientRequest) -> Result<Client, CoreError> {
        let created = self.gateway.create_client(&ClientCreate::from(req)).await?;
        Ok(Client::from(created))
    }

    async fn create_mapping(&self, req: &CreateMappingRequest) -> Result<Mapping, CoreError> {
        let created = self.gateway.create_mapping(&MappingCreate::from(req)).await?;
        Ok(Mapping::from(created))
    }

    async fn delete_mapping(&self, id: &EntityId) -> Result<(), CoreError> {
        Ok(self.gateway.delete_mapping(id.as_str()).await?)
    }

    async fn reconcile(&self) -> Result<(), CoreError> {
        Ok(self.agent.reconcile().await?)
    }
}
