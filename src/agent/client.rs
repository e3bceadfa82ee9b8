//! Model endpoint: the `ChatModel` seam and its Ollama implementation

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent::types::*;
use crate::config::OllamaConfig;
use crate::error::{Error, Result};

/// A language model the agent loop can converse with
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// One blocking round-trip over the full conversation
    async fn invoke(&self, turns: &[ConversationTurn]) -> Result<ModelResponse>;
}

/// Ollama `/api/chat` client
#[derive(Clone)]
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: OllamaConfig,
    /// System prompt prepended to every request
    system_prompt: Option<String>,
    /// Tools advertised to the model
    tools: Vec<ToolDefinition>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OllamaClient {
            client,
            config,
            system_prompt: None,
            tools: Vec::new(),
        })
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Advertise tools for native function calling
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Get the configured model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the wire request for a conversation
    fn build_request(&self, turns: &[ConversationTurn]) -> ChatRequest {
        let mut messages = Vec::with_capacity(turns.len() + 1);

        if let Some(ref system) = self.system_prompt {
            messages.push(ChatMessage {
                role: Role::System,
                content: system.clone(),
                tool_calls: Vec::new(),
                tool_name: None,
            });
        }
        messages.extend(turns.iter().map(to_chat_message));

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            tools: self.tools.clone(),
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn invoke(&self, turns: &[ConversationTurn]) -> Result<ModelResponse> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        let request = self.build_request(turns);

        debug!(
            "Sending request to Ollama: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!("API error ({}): {}", status, error_text)));
        }

        let body = response.bytes().await?;
        Ok(decode_response(&body))
    }
}

/// Decode a 2xx body; anything unrecognizable yields no turns
fn decode_response(body: &[u8]) -> ModelResponse {
    let body: ChatResponse = match serde_json::from_slice(body) {
        Ok(body) => body,
        Err(e) => {
            warn!("Ollama returned an undecodable body: {}", e);
            return ModelResponse { turns: None };
        }
    };
    info!(
        "Ollama response: model={}, done={}, reason={}",
        body.model,
        body.done,
        body.done_reason.as_deref().unwrap_or("unknown")
    );

    let Some(raw) = body.message.filter(|m| !m.is_null()) else {
        return ModelResponse { turns: None };
    };
    match serde_json::from_value::<ChatMessage>(raw) {
        Ok(message) => ModelResponse {
            turns: Some(vec![from_chat_message(message)]),
        },
        Err(e) => {
            warn!("Ollama message could not be decoded: {}", e);
            ModelResponse { turns: None }
        }
    }
}

/// Encode a turn for the wire
fn to_chat_message(turn: &ConversationTurn) -> ChatMessage {
    match turn {
        ConversationTurn::Human(text) => ChatMessage {
            role: Role::User,
            content: text.clone(),
            tool_calls: Vec::new(),
            tool_name: None,
        },
        ConversationTurn::Assistant(message) => ChatMessage {
            role: Role::Assistant,
            content: message.content.clone(),
            tool_calls: message.tool_calls.iter().filter_map(record_to_wire).collect(),
            tool_name: None,
        },
        ConversationTurn::ToolObservation { tool_name, text, .. } => ChatMessage {
            role: Role::Tool,
            content: text.clone(),
            tool_calls: Vec::new(),
            tool_name: Some(tool_name.clone()),
        },
    }
}

/// Decode a wire message into a turn; tool calls become `{name, args, id}` records
fn from_chat_message(message: ChatMessage) -> ConversationTurn {
    match message.role {
        Role::Assistant => {
            let records = message.tool_calls.into_iter().map(wire_to_record).collect();
            ConversationTurn::Assistant(AssistantMessage::with_tool_calls(message.content, records))
        }
        Role::Tool => ConversationTurn::ToolObservation {
            tool_name: message.tool_name.unwrap_or_default(),
            call_id: String::new(),
            text: message.content,
        },
        Role::User | Role::System => ConversationTurn::Human(message.content),
    }
}

fn wire_to_record(call: OllamaToolCall) -> Value {
    // Some models send arguments as a JSON-encoded string
    let args = match call.function.arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    };
    let mut record = json!({
        "name": call.function.name,
        "args": args,
    });
    if let Some(id) = call.id {
        record["id"] = Value::String(id);
    }
    record
}

fn record_to_wire(record: &Value) -> Option<OllamaToolCall> {
    let name = record.get("name")?.as_str()?.to_string();
    let arguments = record
        .get("args")
        .or_else(|| record.get("parameters"))
        .cloned()
        .unwrap_or_else(|| json!({}));
    Some(OllamaToolCall {
        id: record.get("id").and_then(Value::as_str).map(str::to_string),
        function: OllamaFunctionCall { name, arguments },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> OllamaConfig {
        OllamaConfig {
            base_url: base_url.to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new(test_config("http://localhost:11434"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().model(), "llama3.1");
    }

    #[test]
    fn test_request_encoding() {
        let client = OllamaClient::new(test_config("http://localhost:11434"))
            .unwrap()
            .with_system_prompt("be helpful");
        let turns = vec![
            ConversationTurn::human("add 5 and 3"),
            ConversationTurn::assistant(AssistantMessage::with_tool_calls(
                "",
                vec![json!({"name": "add", "args": {"a": 5, "b": 3}, "id": "c1"})],
            )),
            ConversationTurn::ToolObservation {
                tool_name: "add".into(),
                call_id: "c1".into(),
                text: "8".into(),
            },
        ];

        let request = serde_json::to_value(client.build_request(&turns)).unwrap();
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["role"], "user");
        assert_eq!(request["messages"][2]["tool_calls"][0]["function"]["name"], "add");
        assert_eq!(request["messages"][3]["role"], "tool");
        assert_eq!(request["messages"][3]["tool_name"], "add");
        assert_eq!(request["stream"], false);
        assert!(request.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_invoke_maps_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3.1", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        {"function": {"name": "add", "arguments": {"a": 5, "b": 3}}},
                        {"function": {"name": "load_csv", "arguments": "{\"file_path\": \"sample.csv\"}"}}
                    ]
                },
                "done": true,
                "done_reason": "stop"
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(&server.uri())).unwrap();
        let response = client.invoke(&[ConversationTurn::human("hi")]).await.unwrap();

        match response.last_turn() {
            Some(ConversationTurn::Assistant(message)) => {
                assert_eq!(message.tool_calls.len(), 2);
                assert_eq!(message.tool_calls[0]["args"]["a"], 5);
                assert_eq!(message.tool_calls[1]["args"]["file_path"], "sample.csv");
            }
            other => panic!("unexpected turn: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_message_is_no_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(&server.uri())).unwrap();
        let response = client.invoke(&[ConversationTurn::human("hi")]).await.unwrap();
        assert!(response.turns.is_none());
    }

    #[tokio::test]
    async fn test_malformed_message_is_no_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"content": "hi"},
                "done": true
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(&server.uri())).unwrap();
        let response = client.invoke(&[ConversationTurn::human("hi")]).await.unwrap();
        assert!(response.turns.is_none());

        struct NoTools;

        #[async_trait]
        impl crate::agent::ToolSession for NoTools {
            async fn call_tool(
                &self,
                name: &str,
                _arguments: serde_json::Map<String, Value>,
            ) -> Result<crate::mcp::McpToolResult> {
                Err(Error::Internal(format!("unexpected call to {}", name)))
            }
        }

        let outcome = crate::agent::AgentLoop::new(&client, &NoTools).run("q", 3).await;
        assert_eq!(outcome, LoopOutcome::FinalAnswer(String::new()));
    }

    #[tokio::test]
    async fn test_non_json_body_is_no_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(&server.uri())).unwrap();
        let response = client.invoke(&[ConversationTurn::human("hi")]).await.unwrap();
        assert!(response.turns.is_none());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(&server.uri())).unwrap();
        let err = client.invoke(&[ConversationTurn::human("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Model(ref msg) if msg.contains("model not found")));
    }
}
