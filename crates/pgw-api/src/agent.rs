// Reconciliation agent client
//
// The agent lives on its own base path and speaks plain HTTP status codes:
// any 2xx from `GET /reconcile` means the rules were applied.

use tracing::debug;
use url::Url;

use crate::client::handle_empty;
use crate::error::Error;
use crate::transport::{TransportConfig, normalize_base_url};

/// Client for the agent that applies mapping state to live network rules.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    /// Build a client for `base_url` (e.g. `http://127.0.0.1:9090/agent`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the agent to reconcile. The response body is ignored.
    pub async fn reconcile(&self) -> Result<(), Error> {
        let url = self.base_url.join("reconcile")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_empty(resp).await
    }
}
