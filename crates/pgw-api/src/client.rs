// Gateway API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, status handling, and
// JSON decoding for the `/v1/` proxy, client, and mapping endpoints.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ClientCreate, ClientResponse, MappingCreate, MappingResponse, ProxyCreate, ProxyResponse,
};
use crate::transport::{TransportConfig, normalize_base_url};

/// Async client for the gateway's REST API.
///
/// Every method maps a non-2xx answer to [`Error::Http`]; a 204 or empty
/// body is a valid success for endpoints that return nothing.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Proxies ──────────────────────────────────────────────────────

    pub async fn list_proxies(&self) -> Result<Vec<ProxyResponse>, Error> {
        self.get_list("v1/proxies").await
    }

    pub async fn create_proxy(&self, body: &ProxyCreate) -> Result<ProxyResponse, Error> {
        self.post("v1/proxies", body).await
    }

    pub async fn delete_proxy(&self, id: &str) -> Result<(), Error> {
        self.delete(self.entity_url("v1/proxies", id, None)?).await
    }

    /// Trigger a health check. The backend answers either with no content
    /// or with the updated proxy.
    pub async fn check_proxy(&self, id: &str) -> Result<Option<ProxyResponse>, Error> {
        let url = self.entity_url("v1/proxies", id, Some("check"))?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&body) {
            Ok(proxy) => Ok(Some(proxy)),
            Err(e) => {
                debug!(error = %e, "health check body is not a proxy, ignoring");
                Ok(None)
            }
        }
    }

    // ── Clients ──────────────────────────────────────────────────────

    pub async fn list_clients(&self) -> Result<Vec<ClientResponse>, Error> {
        self.get_list("v1/clients").await
    }

    pub async fn create_client(&self, body: &ClientCreate) -> Result<ClientResponse, Error> {
        self.post("v1/clients", body).await
    }

    // ── Mappings ─────────────────────────────────────────────────────

    pub async fn list_active_mappings(&self) -> Result<Vec<MappingResponse>, Error> {
        self.get_list("v1/mappings/active").await
    }

    pub async fn create_mapping(&self, body: &MappingCreate) -> Result<MappingResponse, Error> {
        self.post("v1/mappings", body).await
    }

    pub async fn delete_mapping(&self, id: &str) -> Result<(), Error> {
        self.delete(self.entity_url("v1/mappings", id, None)?).await
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `{collection}/{id}[/{action}]` with the id percent-encoded as a
    /// single path segment.
    fn entity_url(&self, collection: &str, id: &str, action: Option<&str>) -> Result<Url, Error> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id)
            .extend(action);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// GET a JSON array. A `null` or empty body (including 204) is an
    /// empty list.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let list: Option<Vec<T>> = decode(body)?;
        Ok(list.unwrap_or_default())
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        decode(resp.text().await?)
    } else {
        Err(parse_error(status, resp).await)
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

pub(crate) async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

pub(crate) async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let raw = raw.trim();
    Error::Http {
        status: status.as_u16(),
        message: if raw.is_empty() {
            status.to_string()
        } else {
            raw.to_owned()
        },
    }
}
