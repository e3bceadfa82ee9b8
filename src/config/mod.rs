//! Configuration module
//!
//! - types/mod.rs: Core configuration types (Config, AgentConfig, McpServerConfig)
//! - types/provider.rs: Ollama provider configuration
//! - io.rs: Configuration loading and saving
//! - validation.rs: Configuration validation
//! - paths.rs: Configuration file paths

mod io;
mod paths;
mod types;
mod validation;

// Re-export config types
pub use types::{AgentConfig, Config, McpServerConfig};
pub use types::provider::{OllamaConfig, ProviderConfig};

// Re-export IO and utilities
pub use io::{
    apply_env_overrides, load_config, load_config_from_path, load_config_with_env_file,
    sample_config, save_config,
};
pub use paths::{config_dir, config_path, default_server_command, SERVER_BINARY};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};

/// Serializes tests that touch process environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
