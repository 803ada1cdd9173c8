//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn, Instrument, Span};

/// Reqwest-based HTTP client implementation
///
/// Each request is attempted exactly once. Only connecting has a timeout;
/// the caller's cancellation decides how long the rest of a call may run.
pub struct ReqwestHttpClient {
    client: Client,
    span: Span,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new(parent: &Span) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("songlibrary/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client, parent))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_client(client: Client, parent: &Span) -> Self {
        let span = tracing::info_span!(parent: parent, "component", component = "bridge/http");
        Self { client, span }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        req
    }

    fn convert_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::OperationFailed("Request timed out".to_string())
        } else if error.is_connect() {
            BridgeError::OperationFailed(format!("Connection failed: {}", error))
        } else {
            BridgeError::OperationFailed(error.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let span = tracing::debug_span!(parent: &self.span, "execute", url = %request.url);

        async move {
            debug!("Executing HTTP request");

            let response = self
                .build_request(request)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "HTTP request failed");
                    Self::convert_error(e)
                })?;

            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                .collect();

            let body = response.bytes().await.map_err(Self::convert_error)?;

            debug!(status, bytes = body.len(), "HTTP response received");

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
        .instrument(span)
        .await
    }
}
