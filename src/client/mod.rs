//! Remote calculation client
//!
//! Negotiates a session over the service's SSE channel, then invokes
//! named calculation tools with JSON-RPC `tools/call` requests.
//! Uses a long-lived reqwest::Client for connection pooling.

pub mod jsonrpc;
pub mod sse;

pub use jsonrpc::{ContentBlock, StructuredResult, ToolDescriptor};

use crate::config::ClientConfig;
use crate::error::WidgetError;
use crate::models::WidgetData;
use crate::Result;
use jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use sse::SseParser;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Seam between the presentation layer and the calculation service
#[async_trait::async_trait]
pub trait ToolService: Send + Sync {
    async fn open_session(&self) -> Result<SessionHandle>;

    async fn invoke(
        &self,
        session: &SessionHandle,
        tool_name: &str,
        arguments: Value,
    ) -> Result<StructuredResult>;
}

/// Opaque handle correlating calls with a server-push channel.
/// The channel stays open while any clone of the handle is alive.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: String,
    messages_url: String,
    _channel: Option<Arc<ChannelGuard>>,
}

impl SessionHandle {
    /// Handle without a backing channel
    pub fn new(session_id: impl Into<String>, messages_url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages_url: messages_url.into(),
            _channel: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }
}

#[derive(Debug)]
struct ChannelGuard(JoinHandle<()>);

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Client for the calculation service's MCP endpoint
pub struct McpClient {
    http: Client,
    config: ClientConfig,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open the SSE channel and wait, bounded by the handshake timeout,
    /// for the `endpoint` event carrying the session id.
    pub async fn open_session(&self) -> Result<SessionHandle> {
        let url = format!("{}/mcp", self.config.base_url);
        info!(%url, "Opening calculation session");

        match tokio::time::timeout(self.config.handshake_timeout, self.await_endpoint(&url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.handshake_timeout.as_millis() as u64,
                    "Session handshake timed out"
                );
                Err(WidgetError::Connection("Connection timeout".to_string()))
            }
        }
    }

    async fn await_endpoint(&self, url: &str) -> Result<SessionHandle> {
        let mut response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| {
                error!("Session request failed: {}", e);
                WidgetError::Connection(format!("Failed to connect: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Connection(format!(
                "Session endpoint returned {}",
                status
            )));
        }

        let mut parser = SseParser::new();
        let mut pending = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| WidgetError::Connection(format!("Event stream failed: {}", e)))?
        {
            pending.extend_from_slice(&chunk);
            let text = take_utf8(&mut pending);

            for event in parser.push(&text) {
                if event.event != "endpoint" {
                    debug!(event = %event.event, "Ignoring event before endpoint");
                    continue;
                }

                let (session_id, messages_url) = self.parse_endpoint(&event.data)?;
                info!(session_id = %session_id, "Calculation session established");

                let channel = tokio::spawn(drain_channel(response, parser, session_id.clone()));

                return Ok(SessionHandle {
                    session_id,
                    messages_url,
                    _channel: Some(Arc::new(ChannelGuard(channel))),
                });
            }
        }

        Err(WidgetError::Connection(
            "Event stream closed before endpoint event".to_string(),
        ))
    }

    /// Resolve the endpoint payload against the base URL and pull out
    /// its `sessionId` query parameter.
    fn parse_endpoint(&self, data: &str) -> Result<(String, String)> {
        let data = data.trim();
        let absolute = if data.starts_with("http://") || data.starts_with("https://") {
            data.to_string()
        } else if data.starts_with('/') {
            format!("{}{}", self.config.base_url, data)
        } else {
            format!("{}/{}", self.config.base_url, data)
        };

        let url = Url::parse(&absolute).map_err(|e| {
            WidgetError::Connection(format!("Invalid endpoint '{}': {}", data, e))
        })?;

        let session_id = url
            .query_pairs()
            .find(|(key, _)| key == "sessionId")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                WidgetError::Connection(format!("Endpoint '{}' carries no sessionId", data))
            })?;

        Ok((session_id, url.to_string()))
    }

    /// Invoke a calculation tool within a session
    pub async fn invoke(
        &self,
        session: &SessionHandle,
        tool_name: &str,
        arguments: Value,
    ) -> Result<StructuredResult> {
        let params = json!({
            "name": tool_name,
            "arguments": arguments,
        });

        let result = self.request(session, "tools/call", Some(params)).await?;

        if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
            let message = serde_json::from_value::<Vec<ContentBlock>>(
                result.get("content").cloned().unwrap_or(Value::Null),
            )
            .ok()
            .and_then(|blocks| blocks.into_iter().find_map(|b| b.text))
            .unwrap_or_else(|| format!("Tool {} failed", tool_name));
            return Err(WidgetError::Remote(message));
        }

        if result.get("structuredContent").is_none() {
            return Err(WidgetError::Remote(format!(
                "Tool {} returned no structured content",
                tool_name
            )));
        }

        serde_json::from_value(result).map_err(|e| {
            WidgetError::Remote(format!("Malformed result from {}: {}", tool_name, e))
        })
    }

    /// List the tools the service exposes
    pub async fn list_tools(&self, session: &SessionHandle) -> Result<Vec<ToolDescriptor>> {
        let result = self.request(session, "tools/list", None).await?;
        let tools = result.get("tools").cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(tools)?)
    }

    async fn request(
        &self,
        session: &SessionHandle,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        debug!(id, method, session_id = %session.session_id, "Sending request");

        let response = self
            .http
            .post(session.messages_url.as_str())
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Calculation request failed: {}", e);
                WidgetError::Connection(format!("Request {} failed: {}", method, e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WidgetError::Connection(format!("Failed to read response: {}", e)))?;

        let envelope = serde_json::from_str::<JsonRpcResponse>(&body).ok();

        match envelope {
            Some(JsonRpcResponse { error: Some(err), .. }) => {
                warn!(id, method, code = ?err.code, "Service returned error: {}", err.message);
                Err(WidgetError::Remote(err.message))
            }
            _ if !status.is_success() => Err(WidgetError::Connection(format!(
                "Calculation service returned {} for {}",
                status, method
            ))),
            Some(JsonRpcResponse { result: Some(result), .. }) => Ok(result),
            _ => Err(WidgetError::Remote(format!("Empty response for {}", method))),
        }
    }
}

#[async_trait::async_trait]
impl ToolService for McpClient {
    async fn open_session(&self) -> Result<SessionHandle> {
        McpClient::open_session(self).await
    }

    async fn invoke(
        &self,
        session: &SessionHandle,
        tool_name: &str,
        arguments: Value,
    ) -> Result<StructuredResult> {
        McpClient::invoke(self, session, tool_name, arguments).await
    }
}

/// Invoke a tool with typed input and decode its `{input, result}` content.
pub async fn call_tool<S, I, R>(
    service: &S,
    session: &SessionHandle,
    tool_name: &str,
    input: &I,
) -> Result<WidgetData<I, R>>
where
    S: ToolService + ?Sized,
    I: Serialize + DeserializeOwned + Sync,
    R: DeserializeOwned,
{
    let arguments = serde_json::to_value(input)?;
    let result = service.invoke(session, tool_name, arguments).await?;

    serde_json::from_value(result.structured_content).map_err(|e| {
        WidgetError::Remote(format!("Unexpected result shape from {}: {}", tool_name, e))
    })
}

/// Keep reading the push channel so the server keeps the session alive.
async fn drain_channel(mut response: reqwest::Response, mut parser: SseParser, session_id: String) {
    let mut pending = Vec::new();

    while let Ok(Some(chunk)) = response.chunk().await {
        pending.extend_from_slice(&chunk);
        for event in parser.push(&take_utf8(&mut pending)) {
            debug!(session_id = %session_id, event = %event.event, "Channel event");
        }
    }

    debug!(session_id = %session_id, "Session channel closed");
}

/// Decode as much of `pending` as possible. Invalid bytes become U+FFFD;
/// an incomplete trailing sequence stays buffered for the next chunk.
fn take_utf8(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut start = 0;

    while start < pending.len() {
        match std::str::from_utf8(&pending[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                start = pending.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));

                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }

    pending.drain(..start);
    text
}
