//! HTTP clients for the platform's REST and GraphQL APIs.
//!
//! All requests go through [`ApiClient`], which attaches authentication and
//! tenant headers and turns every failure into an [`ApiError`] via the one
//! normalising adapter, [`ApiError::from_response`].

pub mod dashboards;
mod error;
pub mod roles;
pub mod submissions;
pub mod users;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

const TENANT_HEADER: &str = "X-Tenant-Key";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    graphql_url: String,
    token: Option<String>,
    tenant: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lazyflow/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.web_base_url.trim_end_matches('/').to_string(),
            graphql_url: config.graphql_endpoint(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            tenant: config.effective_tenant().map(ToString::to_string),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant) = &self.tenant {
            request = request.header(TENANT_HEADER, tenant);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(request: RequestBuilder, fallback: &str) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(fallback, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(%status, %body, "API request failed");
        Err(ApiError::from_response(status, &body, fallback))
    }

    async fn decode<R: DeserializeOwned>(response: Response, fallback: &str) -> ApiResult<R> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(fallback, e))?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(fallback, e))
    }

    /// `GET <base>/<path>?<query>` and decode the JSON body.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> ApiResult<R> {
        let request = self.request(Method::GET, &self.url(path)).query(query);
        let response = Self::send(request, fallback).await?;
        Self::decode(response, fallback).await
    }

    /// Send a JSON body and ignore whatever the backend returns on success.
    pub async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<()> {
        let request = self.request(method, &self.url(path)).json(body);
        Self::send(request, fallback).await.map(drop)
    }

    pub async fn delete(&self, path: &str, fallback: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &self.url(path));
        Self::send(request, fallback).await.map(drop)
    }

    /// Run a GraphQL query and return its `data` object.
    ///
    /// GraphQL servers report errors with a 200 status, so the `errors`
    /// array is checked before `data` is decoded.
    pub async fn graphql<V: Serialize + Sync, R: DeserializeOwned>(
        &self,
        query: &str,
        variables: &V,
        fallback: &str,
    ) -> ApiResult<R> {
        #[derive(Serialize)]
        struct Body<'a, V> {
            query: &'a str,
            variables: &'a V,
        }

        #[derive(Deserialize)]
        struct Envelope {
            #[serde(default)]
            data: Option<Value>,
            #[serde(default)]
            errors: Vec<GraphQlError>,
        }

        #[derive(Deserialize)]
        struct GraphQlError {
            message: String,
        }

        let request = self
            .request(Method::POST, &self.graphql_url)
            .json(&Body { query, variables });
        let response = Self::send(request, fallback).await?;
        let envelope: Envelope = Self::decode(response, fallback).await?;

        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(ApiError::GraphQl(first.message));
        }
        let data = envelope
            .data
            .filter(|d| !d.is_null())
            .ok_or_else(|| ApiError::GraphQl(fallback.to_string()))?;
        serde_json::from_value(data).map_err(|e| ApiError::decode(fallback, e))
    }
}

/// Serde helpers for identifiers the backend sends as either numbers or
/// strings.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use wiremock::MockServer;

    use super::ApiClient;
    use crate::config::ApiConfig;

    pub fn client_for(server: &MockServer) -> ApiClient {
        let config = ApiConfig {
            web_base_url: server.uri(),
            token: Some("secret-token".to_string()),
            ..ApiConfig::default()
        };
        ApiClient::new(&config).expect("client builds")
    }
}
