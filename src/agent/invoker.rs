//! Tool invocation against the tool-execution session

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::types::{ToolInvocationRequest, ToolInvocationResult};
use crate::error::{Error, Result};
use crate::mcp::McpToolResult;

/// Number of result characters echoed to the log
const PREVIEW_CHARS: usize = 200;

/// The remote side that actually executes tools
#[async_trait]
pub trait ToolSession: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<McpToolResult>;
}

/// Runs one request through a session and folds every outcome into a result
#[derive(Debug, Clone, Default)]
pub struct ToolInvoker {
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl ToolInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail calls that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort in-flight calls when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Invoke the tool. Never returns an error; failures set `failed`.
    pub async fn invoke(
        &self,
        session: &dyn ToolSession,
        request: &ToolInvocationRequest,
    ) -> ToolInvocationResult {
        let outcome = self.call(session, request).await;

        let (text, failed) = match outcome {
            Ok(result) => (normalize(&result), result.is_error),
            Err(e) => {
                if e.is_transport() {
                    warn!("Transport failure while calling tool {}", request.name);
                }
                let msg = format!("Error executing tool '{}': {}", request.name, e);
                warn!("{}", msg);
                (msg, true)
            }
        };

        info!("Tool {} result: {}", request.name, preview(&text));

        ToolInvocationResult {
            call_id: request.call_id.clone(),
            tool_name: request.name.clone(),
            text,
            failed,
        }
    }

    async fn call(
        &self,
        session: &dyn ToolSession,
        request: &ToolInvocationRequest,
    ) -> Result<McpToolResult> {
        let call = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(
                    limit,
                    session.call_tool(&request.name, request.arguments.clone()),
                )
                .await
                .map_err(|_| Error::Timeout(format!("no result after {:?}", limit)))?,
                None => session.call_tool(&request.name, request.arguments.clone()).await,
            }
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Internal("cancelled".to_string())),
                result = call => result,
            },
            None => call.await,
        }
    }
}

/// First content item's text, else its rendering; the whole result when empty
fn normalize(result: &McpToolResult) -> String {
    match result.content.first() {
        Some(item) => match item.as_text() {
            Some(text) => text.to_string(),
            None => item.to_string(),
        },
        None => result.to_string(),
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
