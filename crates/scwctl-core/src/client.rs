//! HTTP client core shared by every API module
//!
//! `ScwClient` owns the connection pool, the credentials and the account
//! defaults (project, zone, region, page size). The per-resource API structs
//! in [`crate::api`] are thin wrappers that build paths and bodies and call
//! back into it.

use std::sync::Arc;
use std::time::Duration;

pub use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::ResolvedProfile;
use crate::error::{Result, ScwError};
use crate::locality::{Region, Zone};
use crate::wait::WaitOptions;

/// Production API endpoint
pub const DEFAULT_API_URL: &str = "https://api.scaleway.com";

/// Header carrying the secret key
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Header used by the instance API to report list totals
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// User agent string for scwctl HTTP requests
pub const USER_AGENT: &str = concat!("scwctl/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query string parameters, in insertion order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Repeated `key=value` pairs, one per element
    pub fn push_all<V: std::fmt::Display>(mut self, key: &str, values: &[V]) -> Self {
        for v in values {
            self = self.push(key, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Raw HTTP response, before decoding
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as JSON, `Null` for an empty body
    pub fn json_value(&self) -> Result<serde_json::Value> {
        if self.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        self.json()
    }

    /// Value of the `X-Total-Count` header, when present and numeric
    pub fn total_count_header(&self) -> Option<u64> {
        self.headers
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Error body returned by the API
#[derive(Debug, Default, serde::Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    resource: Option<String>,
    resource_id: Option<String>,
}

struct Inner {
    http: reqwest::Client,
    api_url: String,
    access_key: Option<String>,
    secret_key: String,
    default_organization_id: Option<String>,
    default_project_id: Option<String>,
    default_region: Option<Region>,
    default_zone: Option<Zone>,
    default_page_size: Option<u32>,
    wait: WaitOptions,
}

/// Authenticated API client
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct ScwClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ScwClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScwClient")
            .field("api_url", &self.inner.api_url)
            .field("access_key", &self.inner.access_key)
            .field("secret_key", &"<REDACTED>")
            .field("default_project_id", &self.inner.default_project_id)
            .field("default_zone", &self.inner.default_zone)
            .field("default_region", &self.inner.default_region)
            .finish()
    }
}

/// Builder for [`ScwClient`]
#[derive(Debug, Clone)]
pub struct ScwClientBuilder {
    api_url: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    default_organization_id: Option<String>,
    default_project_id: Option<String>,
    default_region: Option<Region>,
    default_zone: Option<Zone>,
    default_page_size: Option<u32>,
    timeout: Duration,
    user_agent: String,
    wait: WaitOptions,
}

impl Default for ScwClientBuilder {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_key: None,
            secret_key: None,
            default_organization_id: None,
            default_project_id: None,
            default_region: None,
            default_zone: None,
            default_page_size: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            wait: WaitOptions::default(),
        }
    }
}

impl ScwClientBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    pub fn default_organization_id(mut self, id: impl Into<String>) -> Self {
        self.default_organization_id = Some(id.into());
        self
    }

    pub fn default_project_id(mut self, id: impl Into<String>) -> Self {
        self.default_project_id = Some(id.into());
        self
    }

    pub fn default_region(mut self, region: Region) -> Self {
        self.default_region = Some(region);
        self
    }

    pub fn default_zone(mut self, zone: Zone) -> Self {
        self.default_zone = Some(zone);
        self
    }

    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Polling defaults used by waiters when the caller passes none
    pub fn wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    pub fn build(self) -> Result<ScwClient> {
        let secret_key = self
            .secret_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScwError::InvalidArgument("a secret key is required".to_string()))?;

        // Validate once so request building can't fail on the base URL later
        Url::parse(&self.api_url)?;

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .build()?;

        Ok(ScwClient {
            inner: Arc::new(Inner {
                http,
                api_url: self.api_url.trim_end_matches('/').to_string(),
                access_key: self.access_key,
                secret_key,
                default_organization_id: self.default_organization_id,
                default_project_id: self.default_project_id,
                default_region: self.default_region,
                default_zone: self.default_zone,
                default_page_size: self.default_page_size,
                wait: self.wait,
            }),
        })
    }
}

impl ScwClient {
    pub fn builder() -> ScwClientBuilder {
        ScwClientBuilder::default()
    }

    /// Build a client from a resolved configuration profile
    pub fn from_profile(profile: &ResolvedProfile) -> Result<Self> {
        let mut builder = Self::builder()
            .api_url(profile.api_url.clone())
            .secret_key(profile.secret_key.clone())
            .wait_options(profile.wait);

        if let Some(ref key) = profile.access_key {
            builder = builder.access_key(key.clone());
        }
        if let Some(ref id) = profile.default_organization_id {
            builder = builder.default_organization_id(id.clone());
        }
        if let Some(ref id) = profile.default_project_id {
            builder = builder.default_project_id(id.clone());
        }
        if let Some(ref region) = profile.default_region {
            builder = builder.default_region(region.clone());
        }
        if let Some(ref zone) = profile.default_zone {
            builder = builder.default_zone(zone.clone());
        }
        if let Some(size) = profile.default_page_size {
            builder = builder.default_page_size(size);
        }

        builder.build()
    }

    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    pub fn access_key(&self) -> Option<&str> {
        self.inner.access_key.as_deref()
    }

    pub fn default_organization_id(&self) -> Option<&str> {
        self.inner.default_organization_id.as_deref()
    }

    pub fn default_project_id(&self) -> Option<&str> {
        self.inner.default_project_id.as_deref()
    }

    pub fn default_region(&self) -> Option<&Region> {
        self.inner.default_region.as_ref()
    }

    pub fn default_zone(&self) -> Option<&Zone> {
        self.inner.default_zone.as_ref()
    }

    pub fn default_page_size(&self) -> Option<u32> {
        self.inner.default_page_size
    }

    pub fn wait_options(&self) -> WaitOptions {
        self.inner.wait
    }

    /// The given zone, or the client's default zone
    pub fn zone_or_default(&self, zone: Option<&Zone>) -> Result<Zone> {
        zone.or(self.inner.default_zone.as_ref())
            .cloned()
            .ok_or_else(|| {
                ScwError::InvalidArgument(
                    "no zone given and the client has no default zone".to_string(),
                )
            })
    }

    /// The given region, or the client's default region
    pub fn region_or_default(&self, region: Option<&Region>) -> Result<Region> {
        region
            .or(self.inner.default_region.as_ref())
            .cloned()
            .ok_or_else(|| {
                ScwError::InvalidArgument(
                    "no region given and the client has no default region".to_string(),
                )
            })
    }

    /// The given project, or the client's default project
    pub fn project_or_default(&self, project_id: Option<&str>) -> Option<String> {
        project_id
            .or(self.inner.default_project_id.as_deref())
            .map(str::to_string)
    }

    fn url(&self, path: &str, query: &Query) -> Result<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let mut url = Url::parse(&format!("{}{}", self.inner.api_url, path))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query.pairs() {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Send a request and return the raw response, mapping error statuses
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let url = self.url(path, query)?;
        debug!(method = %method, url = %url, "API request");
        if let Some(body) = body {
            trace!(body = %body, "request body");
        }

        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .header(AUTH_HEADER, &self.inner.secret_key)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        trace!(status, body = %String::from_utf8_lossy(&body), "API response");

        if !(200..300).contains(&status) {
            let err = error_from_body(status, &body);
            warn!(method = %method, path, status, error = %err, "API call failed");
            return Err(err);
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    async fn send_typed<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let body = body.map(serde_json::to_value).transpose()?;
        self.send(method, path, query, body.as_ref()).await
    }

    /// GET and decode
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        self.send(Method::GET, path, query, None).await?.json()
    }

    /// GET and return the raw response (for header inspection)
    pub async fn get_raw(&self, path: &str, query: &Query) -> Result<ApiResponse> {
        self.send(Method::GET, path, query, None).await
    }

    /// POST a JSON body and decode the response
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_typed(Method::POST, path, &Query::new(), Some(body))
            .await?
            .json()
    }

    /// PATCH a JSON body and decode the response
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_typed(Method::PATCH, path, &Query::new(), Some(body))
            .await?
            .json()
    }

    /// PUT a JSON body and decode the response
    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_typed(Method::PUT, path, &Query::new(), Some(body))
            .await?
            .json()
    }

    /// DELETE, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &Query::new(), None).await?;
        Ok(())
    }

    /// DELETE and decode the returned resource
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, path, &Query::new(), None)
            .await?
            .json()
    }
}

fn error_from_body(status: u16, body: &[u8]) -> ScwError {
    let parsed: Option<ApiErrorBody> = serde_json::from_slice(body).ok();
    let text = String::from_utf8_lossy(body).trim().to_string();

    match parsed {
        Some(ApiErrorBody {
            message,
            kind,
            resource,
            resource_id,
        }) => {
            let mut message = message.unwrap_or_else(|| {
                if text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    text.clone()
                }
            });
            match (resource, resource_id) {
                (Some(r), Some(id)) => message.push_str(&format!(" ({r} {id})")),
                (Some(r), None) => message.push_str(&format!(" ({r})")),
                _ => {}
            }
            ScwError::from_status(status, message, kind)
        }
        None => {
            let message = if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text
            };
            ScwError::from_status(status, message, None)
        }
    }
}
