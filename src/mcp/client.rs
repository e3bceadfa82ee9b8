//! MCP client for connecting to MCP servers
//!
//! Speaks newline-delimited JSON-RPC over any async byte stream. The
//! stdio transport spawns the server as a subprocess.

use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::protocol::{McpNotification, McpRequest, McpResponse, McpTool, McpToolResult};
use crate::error::{Error, Result};

type Writer = Box<dyn AsyncWrite + Send + Unpin>;
type Reader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;

/// MCP client for communicating with an MCP server
pub struct McpClient {
    /// Server process (stdio transport only)
    child: Mutex<Option<Child>>,
    /// Request writer
    writer: Mutex<Writer>,
    /// Response reader
    reader: Mutex<Reader>,
    /// Request ID counter
    next_id: AtomicU64,
    /// Server name
    name: String,
    /// `serverInfo` reported during the handshake
    server_info: Option<Value>,
}

impl McpClient {
    /// Connect to an MCP server via stdio transport
    ///
    /// Spawns the given command as a subprocess and communicates via stdin/stdout.
    pub async fn spawn(command: &str, args: &[String], env: &HashMap<String, String>) -> Result<Self> {
        debug!("Connecting to MCP server: {} {:?}", command, args);

        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Connection(format!("Failed to spawn MCP server '{}': {}", command, e)))?;

        let stdin = child.stdin.take()
            .ok_or_else(|| Error::Connection("Failed to capture MCP server stdin".to_string()))?;
        let stdout = child.stdout.take()
            .ok_or_else(|| Error::Connection("Failed to capture MCP server stdout".to_string()))?;

        let mut client = Self::handshake(command, Box::new(stdout), Box::new(stdin)).await?;
        client.child = Mutex::new(Some(child));
        Ok(client)
    }

    /// Connect over an already-established byte stream pair
    pub async fn connect<R, W>(name: &str, reader: R, writer: W) -> Result<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::handshake(name, Box::new(reader), Box::new(writer)).await
    }

    async fn handshake(
        name: &str,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        writer: Writer,
    ) -> Result<Self> {
        let mut client = McpClient {
            child: Mutex::new(None),
            writer: Mutex::new(writer),
            reader: Mutex::new(BufReader::new(reader)),
            next_id: AtomicU64::new(1),
            name: name.to_string(),
            server_info: None,
        };

        client.server_info = client.initialize().await?;
        Ok(client)
    }

    async fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await
            .map_err(|e| Error::Connection(format!("Failed to write to MCP server: {}", e)))?;
        writer.write_all(b"\n").await
            .map_err(|e| Error::Connection(format!("Failed to write newline to MCP server: {}", e)))?;
        writer.flush().await
            .map_err(|e| Error::Connection(format!("Failed to flush MCP server stdin: {}", e)))?;
        Ok(())
    }

    /// Send a request and read the response
    async fn send_request(&self, request: McpRequest) -> Result<Value> {
        let json = serde_json::to_string(&request)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize MCP request: {}", e)))?;

        debug!("MCP request -> {}: {}", self.name, json);
        self.write_line(&json).await?;

        let response = self.read_response(request.id).await?;

        if let Some(ref err) = response.error {
            return Err(Error::Mcp(format!(
                "{} (code {}) from {}",
                err.message, err.code, self.name
            )));
        }

        Ok(response.result.unwrap_or_default())
    }

    /// Read lines until the response carrying `id` arrives
    async fn read_response(&self, id: u64) -> Result<McpResponse> {
        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader.read_line(&mut line).await
                .map_err(|e| Error::Connection(format!("Failed to read from MCP server: {}", e)))?;
            if n == 0 {
                return Err(Error::Connection(format!("MCP server {} closed the connection", self.name)));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!("MCP response <- {}: {}", self.name, trimmed);

            match serde_json::from_str::<McpResponse>(trimmed) {
                Ok(resp) if resp.answers(id) => return Ok(resp),
                Ok(_) => debug!("Skipping unrelated MCP message from {}", self.name),
                Err(_) => debug!("Skipping non-response MCP line from {}", self.name),
            }
        }
    }

    /// Initialize the MCP connection
    async fn initialize(&self) -> Result<Option<Value>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::initialize(id)).await?;
        debug!("MCP server {} initialized: {}", self.name, result);

        let notification = serde_json::to_string(&McpNotification::initialized())?;
        self.write_line(&notification).await?;

        Ok(result.get("serverInfo").cloned())
    }

    /// List available tools from the MCP server
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::list_tools(id)).await?;

        let tools: Vec<McpTool> = match result.get("tools") {
            Some(tools) => serde_json::from_value(tools.clone())
                .map_err(|e| Error::Protocol(format!("Malformed tools/list result: {}", e)))?,
            None => Vec::new(),
        };

        debug!("MCP server {} has {} tools", self.name, tools.len());
        Ok(tools)
    }

    /// Call a tool on the MCP server
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::call_tool(id, name, arguments)).await?;

        let tool_result: McpToolResult = serde_json::from_value(result)
            .map_err(|e| Error::Protocol(format!("Failed to parse MCP tool result: {}", e)))?;

        if tool_result.is_error {
            warn!("MCP tool {} returned error", name);
        }

        Ok(tool_result)
    }

    /// Read a resource by URI, returning the text of its first content entry
    pub async fn read_resource(&self, uri: &str) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::read_resource(id, uri)).await?;

        result
            .get("contents")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol(format!("Resource {} has no text contents", uri)))
    }

    /// Render a prompt, returning the text of its messages joined by newlines
    pub async fn get_prompt(&self, name: &str, arguments: Value) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::get_prompt(id, name, arguments)).await?;

        let messages = result
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Protocol(format!("Prompt {} has no messages", name)))?;

        Ok(messages
            .iter()
            .filter_map(|m| m.pointer("/content/text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Tear the session down, killing the server process if we own one
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(mut child) = self.child.lock().await.take() {
            debug!("Stopping MCP server {}", self.name);
            child.kill().await?;
        }
        Ok(())
    }

    /// Get the server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `serverInfo` reported by the server, if any
    pub fn server_info(&self) -> Option<&Value> {
        self.server_info.as_ref()
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        // kill_on_drop reaps a still-running child
        debug!("Dropping MCP client for {}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::ContentItem;
    use crate::server::serve;
    use serde_json::json;

    async fn connected_client() -> McpClient {
        let (client_end, server_end) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_end);
        tokio::spawn(async move {
            let _ = serve(server_read, server_write).await;
        });
        let (client_read, client_write) = tokio::io::split(client_end);
        McpClient::connect("in-process", client_read, client_write)
            .await
            .expect("handshake")
    }

    #[tokio::test]
    async fn test_handshake_reports_server_info() {
        let client = connected_client().await;
        assert_eq!(client.name(), "in-process");
        assert_eq!(client.server_info().unwrap()["name"], "Demo");
    }

    #[tokio::test]
    async fn test_add_returns_eight() {
        let client = connected_client().await;
        let result = client.call_tool("add", json!({"a": 5, "b": 3})).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content[0], ContentItem::text("8"));
    }

    #[tokio::test]
    async fn test_list_tools() {
        let client = connected_client().await;
        let tools = client.list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"load_csv"));
        assert!(names.contains(&"csv_stats"));
    }

    #[tokio::test]
    async fn test_resource_and_prompt() {
        let client = connected_client().await;
        let greeting = client.read_resource("greeting://Ada").await.unwrap();
        assert_eq!(greeting, "Hello, Ada!");

        let prompt = client
            .get_prompt("greet_user", json!({"name": "Ada", "style": "formal"}))
            .await
            .unwrap();
        assert_eq!(
            prompt,
            "Please write a formal, professional greeting for someone named Ada."
        );
    }

    #[tokio::test]
    async fn test_jsonrpc_error_becomes_err() {
        let client = connected_client().await;
        let err = client.read_resource("weather://today").await.unwrap_err();
        assert!(matches!(err, Error::Mcp(_)));
    }

    #[tokio::test]
    async fn test_closed_connection_is_transport_error() {
        let (client_end, server_end) = tokio::io::duplex(1024);
        drop(server_end);
        let (r, w) = tokio::io::split(client_end);
        let err = McpClient::connect("gone", r, w).await.err().unwrap();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let err = McpClient::spawn("/nonexistent/mcp-server", &[], &HashMap::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Connection(_)));
    }
}
