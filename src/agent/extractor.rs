//! Tool-call extraction from model messages.
//!
//! Models do not always use the native function-calling format, so
//! extraction runs an ordered chain of strategies and takes the first one
//! that produces a result:
//!
//! 1. [`StructuredToolCalls`]: the message's native `tool_calls` records.
//! 2. [`FencedJsonBlocks`]: ```` ```json ```` blocks in the text.
//! 3. [`BareJsonObject`]: the whole text is a single call object.
//!
//! Nothing here fails. Unparseable input degrades to "no calls".

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

use crate::agent::types::{AssistantMessage, ToolInvocationRequest};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json\s*([\{\[][\s\S]*?[\}\]])\s*```").expect("valid fenced-json pattern")
});

/// One way of recognizing tool calls in a message.
///
/// `None` means the strategy does not apply and the next one should run;
/// `Some` ends the chain, even when the list is empty.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, message: &AssistantMessage) -> Option<Vec<ToolInvocationRequest>>;
}

/// Native structured tool-call records
pub struct StructuredToolCalls;

impl ExtractionStrategy for StructuredToolCalls {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, message: &AssistantMessage) -> Option<Vec<ToolInvocationRequest>> {
        if message.tool_calls.is_empty() {
            return None;
        }
        Some(message.tool_calls.iter().map(request_from_record).collect())
    }
}

/// Fenced ```` ```json ```` blocks, each parsed independently
pub struct FencedJsonBlocks;

impl ExtractionStrategy for FencedJsonBlocks {
    fn name(&self) -> &'static str {
        "fenced-json"
    }

    fn extract(&self, message: &AssistantMessage) -> Option<Vec<ToolInvocationRequest>> {
        let blocks: Vec<&str> = FENCED_JSON
            .captures_iter(&message.content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .collect();

        if blocks.is_empty() {
            return None;
        }

        let mut requests = Vec::new();
        for block in blocks {
            match serde_json::from_str::<Value>(block) {
                Ok(value) => requests.extend(requests_from_value(&value)),
                Err(e) => debug!("Skipping unparseable json block: {}", e),
            }
        }
        Some(requests)
    }
}

/// The entire message text as one call object
pub struct BareJsonObject;

impl ExtractionStrategy for BareJsonObject {
    fn name(&self) -> &'static str {
        "bare-json"
    }

    fn extract(&self, message: &AssistantMessage) -> Option<Vec<ToolInvocationRequest>> {
        let text = message.content.trim();
        let looks_like_call = text.starts_with('{')
            && text.contains("name")
            && (text.contains("parameters") || text.contains("args"));
        if !looks_like_call {
            return None;
        }

        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => Some(vec![request_from_record(&value)]),
            Ok(_) => None,
            Err(e) => {
                debug!("Message looked like a tool call but is not JSON: {}", e);
                None
            }
        }
    }
}

/// Runs the strategy chain over assistant messages
pub struct ToolCallExtractor {
    structured: Box<dyn ExtractionStrategy>,
    textual: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for ToolCallExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolCallExtractor {
    pub fn new() -> Self {
        ToolCallExtractor {
            structured: Box::new(StructuredToolCalls),
            textual: vec![Box::new(FencedJsonBlocks), Box::new(BareJsonObject)],
        }
    }

    /// Extract invocation requests in the order they appear in the message
    pub fn extract(&self, message: &AssistantMessage) -> Vec<ToolInvocationRequest> {
        if let Some(requests) = self.structured.extract(message) {
            debug!("{} tool calls via {}", requests.len(), self.structured.name());
            return requests;
        }

        // Textual fallbacks only run on non-empty content
        if message.content.trim().is_empty() {
            return Vec::new();
        }

        for strategy in &self.textual {
            if let Some(requests) = strategy.extract(message) {
                debug!("{} tool calls via {}", requests.len(), strategy.name());
                return requests;
            }
        }
        Vec::new()
    }
}

/// Flatten an object or a list of objects into requests
fn requests_from_value(value: &Value) -> Vec<ToolInvocationRequest> {
    match value {
        Value::Object(_) => vec![request_from_record(value)],
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .map(request_from_record)
            .collect(),
        _ => Vec::new(),
    }
}

/// Map one call record; missing fields default rather than fail
fn request_from_record(record: &Value) -> ToolInvocationRequest {
    let arguments = match record.get("args").filter(|v| !v.is_null()) {
        Some(args) => args,
        None => record.get("parameters").unwrap_or(&Value::Null),
    };

    ToolInvocationRequest {
        name: string_field(record, "name"),
        arguments: match arguments {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        },
        call_id: string_field(record, "id"),
    }
}

fn string_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(message: AssistantMessage) -> Vec<ToolInvocationRequest> {
        ToolCallExtractor::new().extract(&message)
    }

    #[test]
    fn test_structured_preserves_order_and_prefers_args() {
        let message = AssistantMessage::with_tool_calls(
            "",
            vec![
                json!({"name": "load_csv", "args": {"file_path": "a.csv"}, "parameters": {"file_path": "b.csv"}, "id": "c1"}),
                json!({"name": "add", "parameters": {"a": 1, "b": 2}}),
            ],
        );

        let calls = extract(message);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "load_csv");
        assert_eq!(calls[0].arguments["file_path"], "a.csv");
        assert_eq!(calls[0].call_id, "c1");
        assert_eq!(calls[1].name, "add");
        assert_eq!(calls[1].arguments["b"], 2);
        assert_eq!(calls[1].call_id, "");
    }

    #[test]
    fn test_structured_coerces_bad_records() {
        let message = AssistantMessage::with_tool_calls(
            "",
            vec![json!({"args": "not a map"}), json!(42)],
        );

        let calls = extract(message);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "");
        assert!(calls[0].arguments.is_empty());
        assert_eq!(calls[1].name, "");
    }

    #[test]
    fn test_structured_wins_over_text() {
        let message = AssistantMessage::with_tool_calls(
            "```json\n{\"name\": \"other\", \"args\": {}}\n```",
            vec![json!({"name": "add", "args": {"a": 1, "b": 1}})],
        );
        let calls = extract(message);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "add");
    }

    #[test]
    fn test_single_fenced_block() {
        let message = AssistantMessage::text(
            "I'll add those.\n```json\n{\"name\": \"add\", \"args\": {\"a\": 5, \"b\": 3}}\n```\nDone.",
        );
        let calls = extract(message);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "add");
        assert_eq!(calls[0].arguments["a"], 5);
        assert_eq!(calls[0].arguments["b"], 3);
    }

    #[test]
    fn test_fenced_blocks_skip_broken_and_flatten_lists() {
        let message = AssistantMessage::text(concat!(
            "```json\n{\"name\": \"first\", \"parameters\": {\"x\": 1}}\n```\n",
            "```json\n{\"name\": broken}\n```\n",
            "```json\n[{\"name\": \"second\"}, 7, {\"name\": \"third\", \"id\": \"t\"}]\n```",
        ));

        let names: Vec<String> = extract(message).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fenced_blocks_all_broken_yield_nothing() {
        // Blocks were found, so the bare-object path does not get a turn
        let message = AssistantMessage::text("```json\n{not json}\n```");
        assert!(extract(message).is_empty());
    }

    #[test]
    fn test_bare_object() {
        let message = AssistantMessage::text(
            "  {\"name\": \"csv_stats\", \"parameters\": {\"dataset_id\": \"d1\"}, \"id\": \"x\"}  ",
        );
        let calls = extract(message);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "csv_stats");
        assert_eq!(calls[0].arguments["dataset_id"], "d1");
        assert_eq!(calls[0].call_id, "x");
    }

    #[test]
    fn test_bare_object_parse_failure_is_empty() {
        let message = AssistantMessage::text("{\"name\": \"add\", \"args\": {\"a\": 1,");
        assert!(extract(message).is_empty());
    }

    #[test]
    fn test_plain_prose_is_empty() {
        assert!(extract(AssistantMessage::text("The answer is 8.")).is_empty());
        assert!(extract(AssistantMessage::text("")).is_empty());
        assert!(extract(AssistantMessage::text("{\"answer\": 8}")).is_empty());
    }
}
