//! SensorThings HTTP client (reqwest-based).
//!
//! Discovers the collection endpoints advertised by the API root, then
//! implements [`ResourceGateway`] over plain JSON requests.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

use crate::entity::{record_self_link, EntityRecord, EntityType};
use crate::error::{StaClientError, StaClientResult};
use crate::gateway::ResourceGateway;

/// API version suffix every base URL is normalized to.
pub const API_VERSION_SUFFIX: &str = "v1.0";

/// `{ "value": [ ... ] }` envelope used by the root and every collection.
#[derive(Debug, Deserialize)]
struct ValueEnvelope<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct EndpointEntry {
    name: String,
    url: String,
}

/// Append the API version suffix to `url` unless it already ends with it.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(API_VERSION_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}/{API_VERSION_SUFFIX}")
    }
}

/// Query the API root and return the advertised `collection name -> URL` map.
pub async fn discover_endpoints(
    http_client: &Client,
    base_url: &str,
) -> StaClientResult<HashMap<String, String>> {
    debug!("STA GET {}", base_url);
    let response = http_client
        .get(base_url)
        .send()
        .await
        .map_err(|e| StaClientError::EndpointDiscovery(format!("{base_url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(StaClientError::EndpointDiscovery(format!(
            "{base_url} returned HTTP {status}"
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| StaClientError::EndpointDiscovery(format!("{base_url}: {e}")))?;
    let root: ValueEnvelope<EndpointEntry> = serde_json::from_str(&body).map_err(|e| {
        StaClientError::EndpointDiscovery(format!("malformed root document from {base_url}: {e}"))
    })?;

    Ok(root
        .value
        .into_iter()
        .map(|entry| (entry.name, entry.url))
        .collect())
}

/// Extract the operator-facing message from an error response body.
///
/// SensorThings servers answer with `{"error": {"message": [..]}}`; anything
/// else is passed through verbatim.
fn rejection_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        let message = v.get("error")?.get("message")?;
        match message {
            serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_string),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    });

    match message {
        Some(m) => m,
        None if body.is_empty() => "<no body>".to_string(),
        None => body.to_string(),
    }
}

/// Client bound to one SensorThings instance.
#[derive(Debug, Clone)]
pub struct SensorThingsClient {
    /// Normalized base URL (always ends with the version suffix).
    base_url: String,
    endpoints: HashMap<EntityType, String>,
    http_client: Client,
}

impl SensorThingsClient {
    /// Connect to `base_url`, discovering endpoints with a fresh HTTP client.
    pub async fn connect(base_url: &str, timeout: Duration) -> StaClientResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sensorthings-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                StaClientError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;
        Self::connect_with_http_client(base_url, http_client).await
    }

    /// Connect using a pre-built `reqwest::Client` (for testing).
    pub async fn connect_with_http_client(
        base_url: &str,
        http_client: Client,
    ) -> StaClientResult<Self> {
        let base_url = normalize_base_url(base_url);
        let advertised = discover_endpoints(&http_client, &base_url).await?;

        let mut endpoints = HashMap::new();
        for (name, url) in advertised {
            match EntityType::from_collection(&name) {
                Some(resource) => {
                    endpoints.insert(resource, url);
                }
                None => debug!(collection = %name, "ignoring unsupported collection"),
            }
        }

        Ok(Self {
            base_url,
            endpoints,
            http_client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of supported collections the server advertised.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoint(&self, resource: EntityType) -> StaClientResult<&str> {
        self.endpoints
            .get(&resource)
            .map(String::as_str)
            .ok_or(StaClientError::MissingEndpoint(resource))
    }

    /// Replace an existing entity at its self-link.
    ///
    /// The self-link must belong to this instance; otherwise nothing is sent.
    pub async fn update(&self, record: &EntityRecord) -> StaClientResult<EntityRecord> {
        let item_url = record_self_link(record).unwrap_or_default();
        if item_url.is_empty() || !item_url.contains(&self.base_url) {
            error!(own_url = %self.base_url, item_url = %item_url, "refusing cross-instance update");
            return Err(StaClientError::CrossInstanceUpdate {
                own_url: self.base_url.clone(),
                item_url: item_url.to_string(),
            });
        }

        debug!("STA PUT {}", item_url);
        let response = self.http_client.put(item_url).json(record).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> StaClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(Into::into)
        } else {
            let message = rejection_message(&body);
            error!("Server response: {}", message);
            Err(StaClientError::RemoteRejection {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ResourceGateway for SensorThingsClient {
    async fn list(
        &self,
        resource: EntityType,
        top: usize,
        skip: usize,
    ) -> StaClientResult<Vec<EntityRecord>> {
        let url = self.endpoint(resource)?;
        debug!("STA GET {} ($top={}, $skip={})", url, top, skip);
        let response = self
            .http_client
            .get(url)
            .query(&[("$top", top), ("$skip", skip)])
            .send()
            .await?;
        let page: ValueEnvelope<EntityRecord> = self.handle_response(response).await?;
        Ok(page.value)
    }

    async fn post(&self, resource: EntityType, record: &EntityRecord) -> StaClientResult<EntityRecord> {
        let url = self.endpoint(resource)?;
        debug!("STA POST {}", url);
        let response = self.http_client.post(url).json(record).send().await?;
        self.handle_response(response).await
    }
}
