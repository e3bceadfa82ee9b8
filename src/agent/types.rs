//! Type definitions for the agent module

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message on the model wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing context and instructions
    System,
    /// User message
    User,
    /// Assistant (AI) response
    Assistant,
    /// Tool/function result
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message produced by the model.
///
/// `tool_calls` holds the native structured records as the model emitted
/// them; each is expected to be an object with `name`, `args` (or the
/// legacy `parameters`) and `id`, but nothing is assumed until extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<Value>,
}

impl AssistantMessage {
    /// Plain text answer without tool calls
    pub fn text(content: impl Into<String>) -> Self {
        AssistantMessage {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Message carrying structured tool-call records
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<Value>) -> Self {
        AssistantMessage {
            content: content.into(),
            tool_calls,
        }
    }
}

/// One entry of the conversation the model sees
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationTurn {
    Human(String),
    Assistant(AssistantMessage),
    ToolObservation {
        tool_name: String,
        call_id: String,
        text: String,
    },
}

impl ConversationTurn {
    pub fn human(text: impl Into<String>) -> Self {
        ConversationTurn::Human(text.into())
    }

    pub fn assistant(message: AssistantMessage) -> Self {
        ConversationTurn::Assistant(message)
    }

    /// Wrap an invocation result as an observation turn
    pub fn observation(result: &ToolInvocationResult) -> Self {
        ConversationTurn::ToolObservation {
            tool_name: result.tool_name.clone(),
            call_id: result.call_id.clone(),
            text: result.text.clone(),
        }
    }

    /// Wire role of this turn
    pub fn role(&self) -> Role {
        match self {
            ConversationTurn::Human(_) => Role::User,
            ConversationTurn::Assistant(_) => Role::Assistant,
            ConversationTurn::ToolObservation { .. } => Role::Tool,
        }
    }

    /// Free text carried by the turn
    pub fn text(&self) -> &str {
        match self {
            ConversationTurn::Human(text) => text,
            ConversationTurn::Assistant(message) => &message.content,
            ConversationTurn::ToolObservation { text, .. } => text,
        }
    }
}

/// A request to run one named tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub name: String,
    pub arguments: Map<String, Value>,
    /// Empty when the model supplied none; the loop fills it in
    pub call_id: String,
}

/// Outcome of one tool invocation; failures are data, never faults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub call_id: String,
    pub tool_name: String,
    pub text: String,
    pub failed: bool,
}

/// How a loop run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model answered without requesting tools
    FinalAnswer(String),
    /// `max_iterations` tool rounds ran without a final answer
    IterationLimitReached,
    /// Cancellation was signalled while waiting on the model
    Cancelled,
    /// The model endpoint itself failed
    ModelFailed(String),
}

/// Response of one model round-trip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// `None` when the response carried no recognizable message list
    pub turns: Option<Vec<ConversationTurn>>,
}

impl ModelResponse {
    /// Response consisting of a single assistant message
    pub fn assistant(message: AssistantMessage) -> Self {
        ModelResponse {
            turns: Some(vec![ConversationTurn::Assistant(message)]),
        }
    }

    /// The last returned turn, which is all the loop reads
    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.turns.as_ref().and_then(|turns| turns.last())
    }
}

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (usually "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDefinition,
}

/// Function definition for tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for function parameters
    pub parameters: Value,
}

/// A message on the Ollama chat wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<OllamaToolCall>,
    /// Tool name (for tool messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

/// Tool call as emitted by Ollama
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub function: OllamaFunctionCall,
}

/// Function call details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaFunctionCall {
    pub name: String,
    /// Object, or a JSON-encoded string from some models
    #[serde(default)]
    pub arguments: Value,
}

/// Request to `/api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    pub stream: bool,
    pub options: ChatOptions,
}

/// Sampling options
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
}

/// Response from `/api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    /// Left undecoded; a malformed message is a protocol anomaly, not a transport error
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_roles_and_text() {
        let human = ConversationTurn::human("hi");
        assert_eq!(human.role(), Role::User);
        assert_eq!(human.text(), "hi");

        let result = ToolInvocationResult {
            call_id: "call_0_0".into(),
            tool_name: "add".into(),
            text: "8".into(),
            failed: false,
        };
        let obs = ConversationTurn::observation(&result);
        assert_eq!(obs.role(), Role::Tool);
        assert_eq!(obs.text(), "8");
    }

    #[test]
    fn test_model_response_last_turn() {
        assert!(ModelResponse::default().last_turn().is_none());

        let resp = ModelResponse {
            turns: Some(vec![
                ConversationTurn::human("q"),
                ConversationTurn::assistant(AssistantMessage::text("a")),
            ]),
        };
        assert_eq!(resp.last_turn().unwrap().text(), "a");
    }
}
