//! Addition tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::traits::{parse_arguments, SessionContext, Tool, ToolResult};
use crate::error::Result;

#[derive(Deserialize)]
struct AddArgs {
    a: i64,
    b: i64,
}

/// Built-in tool: add two integers
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer", "description": "First addend" },
                "b": { "type": "integer", "description": "Second addend" }
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, args: Value, _session: &SessionContext) -> Result<ToolResult> {
        let AddArgs { a, b } = parse_arguments(self.name(), args)?;
        match a.checked_add(b) {
            Some(sum) => Ok(ToolResult::success(sum.to_string())),
            None => Ok(ToolResult::failure(format!("{} + {} overflows a 64-bit integer", a, b))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add() {
        let result = AddTool
            .execute(json!({"a": 5, "b": 3}), &SessionContext::default())
            .await
            .unwrap();
        assert_eq!(result.content.as_deref(), Some("8"));
    }

    #[tokio::test]
    async fn test_add_overflow_is_failure() {
        let result = AddTool
            .execute(json!({"a": i64::MAX, "b": 1}), &SessionContext::default())
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let err = AddTool
            .execute(json!({"a": 5}), &SessionContext::default())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
