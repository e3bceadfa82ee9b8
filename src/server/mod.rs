//! Bundled MCP server
//!
//! Speaks newline-delimited JSON-RPC 2.0 over any reader/writer pair; the
//! `mcp-agent-server` binary wires it to stdin/stdout. One `ServerSession`
//! lives for the duration of a connection and owns that connection's
//! loaded datasets.

mod catalog;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::mcp::protocol::{codes, IncomingMessage, McpResponse, PROTOCOL_VERSION};
use crate::tools::{SessionContext, ToolRegistry};

pub use catalog::{greet_user, read_resource, GreetingStyle};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "Demo";

/// Per-connection server state
pub struct ServerSession {
    registry: ToolRegistry,
    context: SessionContext,
}

impl Default for ServerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSession {
    /// Session exposing the built-in tool catalog
    pub fn new() -> Self {
        Self::with_registry(ToolRegistry::with_builtin_tools())
    }

    pub fn with_registry(registry: ToolRegistry) -> Self {
        ServerSession {
            registry,
            context: SessionContext::default(),
        }
    }

    /// Handle one raw line; `None` when nothing should be written back
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Some(McpResponse::failure(None, codes::PARSE_ERROR, format!("Parse error: {}", e)));
            }
        };

        let id = value.get("id").cloned();
        match serde_json::from_value::<IncomingMessage>(value) {
            Ok(message) => self.handle(message).await,
            Err(e) => Some(McpResponse::failure(
                id,
                codes::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    /// Dispatch a decoded message
    pub async fn handle(&self, message: IncomingMessage) -> Option<McpResponse> {
        let Some(id) = message.id else {
            debug!("Notification {}", message.method);
            return None;
        };

        let params = message.params.unwrap_or(Value::Null);
        let outcome = match message.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.call_tool(&params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": catalog::resource_templates() })),
            "resources/read" => Self::read_resource(&params),
            "prompts/list" => Ok(json!({ "prompts": catalog::prompt_definitions() })),
            "prompts/get" => Self::get_prompt(&params),
            other => Err((codes::METHOD_NOT_FOUND, format!("Method not found: {}", other))),
        };

        Some(match outcome {
            Ok(result) => McpResponse::success(Some(id), result),
            Err((code, message)) => McpResponse::failure(Some(id), code, message),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": crate::VERSION
            }
        })
    }

    async fn call_tool(&self, params: &Value) -> std::result::Result<Value, (i64, String)> {
        let name = required_str(params, "name")?;
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        info!("tools/call {}", name);
        let result = self.registry.execute(name, arguments, &self.context).await;
        serde_json::to_value(result).map_err(|e| (codes::INTERNAL_ERROR, e.to_string()))
    }

    fn read_resource(params: &Value) -> std::result::Result<Value, (i64, String)> {
        let uri = required_str(params, "uri")?;
        let text = catalog::read_resource(uri)
            .ok_or_else(|| (codes::INVALID_PARAMS, format!("Unknown resource: {}", uri)))?;

        Ok(json!({
            "contents": [{ "uri": uri, "mimeType": "text/plain", "text": text }]
        }))
    }

    fn get_prompt(params: &Value) -> std::result::Result<Value, (i64, String)> {
        let name = required_str(params, "name")?;
        if name != "greet_user" {
            return Err((codes::INVALID_PARAMS, format!("Unknown prompt: {}", name)));
        }

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let user = required_str(&arguments, "name")?;
        let style = arguments
            .get("style")
            .and_then(Value::as_str)
            .map(GreetingStyle::parse)
            .unwrap_or_default();

        Ok(json!({
            "description": "Generate a greeting prompt",
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": greet_user(user, style) }
            }]
        }))
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, (i64, String)> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| (codes::INVALID_PARAMS, format!("Missing required parameter: {}", key)))
}

/// Serve one connection until the reader hits EOF
pub async fn serve<R, W>(reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = ServerSession::new();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| Error::Connection(format!("Failed to read request: {}", e)))?
    {
        let Some(response) = session.handle_line(&line).await else {
            continue;
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        writer
            .write_all(out.as_bytes())
            .await
            .map_err(|e| Error::Connection(format!("Failed to write response: {}", e)))?;
        writer.flush().await?;
    }

    debug!("Client closed the connection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(session: &ServerSession, line: &str) -> Value {
        let response = session.handle_line(line).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let session = ServerSession::new();
        let resp = call(&session, r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).await;
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["serverInfo"]["name"], "Demo");
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_gets_no_reply() {
        let session = ServerSession::new();
        let resp = session
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
        assert!(session.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_error_codes() {
        let session = ServerSession::new();

        let resp = call(&session, "{not json").await;
        assert_eq!(resp["error"]["code"], codes::PARSE_ERROR);
        assert!(resp["id"].is_null());

        let resp = call(&session, r#"{"jsonrpc":"2.0","id":2,"method":"sampling/createMessage"}"#).await;
        assert_eq!(resp["error"]["code"], codes::METHOD_NOT_FOUND);
        assert_eq!(resp["id"], 2);

        let resp = call(&session, r#"{"jsonrpc":"2.0","id":3}"#).await;
        assert_eq!(resp["error"]["code"], codes::INVALID_REQUEST);

        let resp = call(
            &session,
            r#"{"jsonrpc":"2.0","id":4,"method":"resources/read","params":{"uri":"weather://today"}}"#,
        )
        .await;
        assert_eq!(resp["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_error() {
        let session = ServerSession::new();
        let resp = call(
            &session,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"divide","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(resp["result"]["content"][0]["text"], "Unknown tool: divide");
    }

    #[tokio::test]
    async fn test_prompt_defaults_to_friendly() {
        let session = ServerSession::new();
        let resp = call(
            &session,
            r#"{"jsonrpc":"2.0","id":6,"method":"prompts/get","params":{"name":"greet_user","arguments":{"name":"Ada"}}}"#,
        )
        .await;
        assert_eq!(
            resp["result"]["messages"][0]["content"]["text"],
            "Please write a warm, friendly greeting for someone named Ada."
        );
    }

    #[tokio::test]
    async fn test_serve_over_duplex() {
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let handle = tokio::spawn(serve(server_read, server_write));

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let reply: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"], json!({}));

        drop(client_write);
        drop(lines);
        handle.await.unwrap().unwrap();
    }
}
