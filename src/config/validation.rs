//! Configuration validation
//!
//! Validates configuration and reports issues.

use super::types::Config;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let result = ConfigValidationResult::valid();
    let result = validate_provider_config(config, result);
    validate_agent_config(config, result)
}

fn validate_provider_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    let ollama = &config.provider.ollama;

    if ollama.model.trim().is_empty() {
        result = result.with_error(
            ValidationIssue::new("provider.ollama.model", "No model configured")
                .with_suggestion("Set OLLAMA_MODEL or provider.ollama.model"),
        );
    }

    if !(ollama.base_url.starts_with("http://") || ollama.base_url.starts_with("https://")) {
        result = result.with_error(
            ValidationIssue::new(
                "provider.ollama.base_url",
                format!("Base URL must start with http:// or https://, got '{}'", ollama.base_url),
            )
            .with_suggestion("e.g. http://localhost:11434"),
        );
    }

    if !(0.0..=2.0).contains(&ollama.temperature) {
        result = result.with_error(ValidationIssue::new(
            "provider.ollama.temperature",
            format!("Temperature {} is outside 0.0..=2.0", ollama.temperature),
        ));
    }

    result
}

fn validate_agent_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.agent.max_iterations == 0 {
        result = result.with_warning(
            ValidationIssue::new(
                "agent.max_iterations",
                "max_iterations is 0; the model will never be called",
            )
            .with_suggestion("Use at least 1"),
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let result = validate_config(&Config::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_provider() {
        let mut config = Config::default();
        config.provider.ollama.model = " ".to_string();
        config.provider.ollama.base_url = "localhost:11434".to_string();
        config.provider.ollama.temperature = 3.5;

        let result = validate_config(&config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[1].to_string().starts_with("provider.ollama.base_url"));
    }

    #[test]
    fn test_zero_iterations_warns() {
        let mut config = Config::default();
        config.agent.max_iterations = 0;

        let result = validate_config(&config);
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "agent.max_iterations");
    }
}
