//! Typed client for the gateway, used by agents and other callers
//!
//! Each helper builds a `mcp://` call URI, posts the JSON-RPC envelope and
//! returns the text of the first content block.

use std::{
    env,
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use serde_json::json;
use thiserror::Error;

use crate::mcp::{
    rpc::{RpcResponse, CALL_TOOL_METHOD, JSONRPC_VERSION},
    uri::CALL_URI_SCHEME,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/mcp";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("gateway response carried no text content")]
    EmptyResult,
}

pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicI64,
}

impl GatewayClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            next_id: AtomicI64::new(1),
        })
    }

    /// Uses `MCP_SERVER_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self, ClientError> {
        let endpoint = env::var("MCP_SERVER_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(endpoint)
    }

    pub async fn call_uri(&self, uri: &str) -> Result<String, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": JSONRPC_VERSION,
            "method": CALL_TOOL_METHOD,
            "params": {"uri": uri},
            "id": id,
        });

        let response = self.http.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RpcResponse = response.json().await?;
        parsed
            .result
            .content
            .into_iter()
            .next()
            .map(|content| content.text)
            .ok_or(ClientError::EmptyResult)
    }

    pub async fn get_weather(&self, city: &str, units: &str) -> Result<String, ClientError> {
        self.call_uri(&call_uri("weather", "current", &[city, units]))
            .await
    }

    pub async fn get_forecast(
        &self,
        city: &str,
        days: i64,
        units: &str,
    ) -> Result<String, ClientError> {
        let days = days.to_string();
        self.call_uri(&call_uri("weather", "forecast", &[city, days.as_str(), units]))
            .await
    }

    /// An absent country is sent as an empty segment so `limit` keeps its
    /// position.
    pub async fn get_news_headlines(
        &self,
        category: &str,
        country: Option<&str>,
        limit: u32,
    ) -> Result<String, ClientError> {
        let limit = limit.to_string();
        self.call_uri(&call_uri(
            "news",
            "headlines",
            &[category, country.unwrap_or_default(), limit.as_str()],
        ))
        .await
    }

    pub async fn search_web(&self, query: &str, num_results: u32) -> Result<String, ClientError> {
        let num_results = num_results.to_string();
        self.call_uri(&call_uri("news", "search", &[query, num_results.as_str()]))
            .await
    }
}

/// Joins segments into a call URI. Segments are inserted as written, so an
/// argument containing `/`, `?` or `#` changes how the URI is split.
pub fn call_uri(service: &str, action: &str, args: &[&str]) -> String {
    let mut uri = format!("{CALL_URI_SCHEME}://{service}/{action}");
    for arg in args {
        uri.push('/');
        uri.push_str(arg);
    }
    uri
}
