//! Resources and prompts served alongside the tools

use serde_json::{json, Value};

/// URI scheme of the greeting resource template
const GREETING_SCHEME: &str = "greeting://";

/// Resource templates advertised by `resources/templates/list`
pub fn resource_templates() -> Value {
    json!([{
        "uriTemplate": "greeting://{name}",
        "name": "greeting",
        "description": "Get a personalized greeting",
        "mimeType": "text/plain"
    }])
}

/// Resolve a resource URI to its text, `None` for unknown URIs
pub fn read_resource(uri: &str) -> Option<String> {
    let name = uri.strip_prefix(GREETING_SCHEME)?;
    if name.is_empty() {
        return None;
    }
    Some(format!("Hello, {}!", name))
}

/// Tone of the `greet_user` prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GreetingStyle {
    #[default]
    Friendly,
    Formal,
    Casual,
}

impl GreetingStyle {
    /// Unknown styles fall back to friendly
    pub fn parse(style: &str) -> Self {
        match style {
            "formal" => GreetingStyle::Formal,
            "casual" => GreetingStyle::Casual,
            _ => GreetingStyle::Friendly,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            GreetingStyle::Friendly => "Please write a warm, friendly greeting",
            GreetingStyle::Formal => "Please write a formal, professional greeting",
            GreetingStyle::Casual => "Please write a casual, relaxed greeting",
        }
    }
}

/// Prompts advertised by `prompts/list`
pub fn prompt_definitions() -> Value {
    json!([{
        "name": "greet_user",
        "description": "Generate a greeting prompt",
        "arguments": [
            { "name": "name", "description": "Who to greet", "required": true },
            { "name": "style", "description": "friendly, formal or casual", "required": false }
        ]
    }])
}

/// Render the `greet_user` prompt text
pub fn greet_user(name: &str, style: GreetingStyle) -> String {
    format!("{} for someone named {}.", style.instruction(), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_resource() {
        assert_eq!(read_resource("greeting://Ada").as_deref(), Some("Hello, Ada!"));
        assert!(read_resource("greeting://").is_none());
        assert!(read_resource("weather://today").is_none());
    }

    #[test]
    fn test_greet_user_styles() {
        assert_eq!(
            greet_user("Bob", GreetingStyle::parse("casual")),
            "Please write a casual, relaxed greeting for someone named Bob."
        );
        assert_eq!(GreetingStyle::parse("shouty"), GreetingStyle::Friendly);
        assert_eq!(
            greet_user("Bob", GreetingStyle::default()),
            "Please write a warm, friendly greeting for someone named Bob."
        );
    }
}
