//! Configuration I/O - Loading and saving configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;
use tracing::{debug, warn};

use super::types::Config;
use crate::error::{Error, Result};

/// Load configuration with layered precedence:
/// 1. Config file if it exists, otherwise defaults
/// 2. `.env` and environment variable overrides
pub fn load_config() -> Result<Config> {
    load_config_with_env_file(None)
}

/// Like [`load_config`], reading variables from `env_file` instead of `./.env`.
///
/// The env file is read before the config path is resolved, so it may set
/// `MCP_AGENT_CONFIG` or `MCP_AGENT_CONFIG_DIR`.
pub fn load_config_with_env_file(env_file: Option<&Path>) -> Result<Config> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config_path = super::paths::config_path();

    let mut config = if config_path.exists() {
        debug!("Loading config from {}", config_path.display());
        load_config_from_path(&config_path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    // Detect format by extension
    let config: Config = if path.extension().is_some_and(|ext| ext == "json") {
        json5::from_str(&content).map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else {
        json5::from_str(&content)
            .or_else(|_| toml::from_str(&content).map_err(|e| Error::Config(e.to_string())))
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?
    };

    Ok(config)
}

/// Apply process environment overrides to an existing config
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Overlay variables from `lookup` onto `config`
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let ollama = &mut config.provider.ollama;

    if let Some(url) = lookup("OLLAMA_BASE_URL").or_else(|| lookup("OLLAMA_HOST")) {
        ollama.base_url = url;
    }
    if let Some(model) = lookup("OLLAMA_MODEL") {
        ollama.model = model;
    }
    if let Some(temperature) = lookup("OLLAMA_TEMPERATURE") {
        match temperature.parse() {
            Ok(v) => ollama.temperature = v,
            Err(_) => warn!("Ignoring invalid OLLAMA_TEMPERATURE: {}", temperature),
        }
    }
    if let Some(max) = lookup("MCP_AGENT_MAX_ITERATIONS") {
        match max.parse() {
            Ok(v) => config.agent.max_iterations = v,
            Err(_) => warn!("Ignoring invalid MCP_AGENT_MAX_ITERATIONS: {}", max),
        }
    }
    if let Some(command) = lookup("MCP_SERVER_COMMAND") {
        config.mcp.command = Some(command);
    }
}

/// Save configuration to a file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    } else {
        serde_json::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, content)?;
    Ok(())
}

/// The default configuration rendered as JSON
pub fn sample_config() -> Result<String> {
    Ok(serde_json::to_string_pretty(&Config::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.agent.max_iterations = 4;
        save_config(&config, &path).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        assert_eq!(loaded.agent.max_iterations, 4);
        assert_eq!(loaded.provider.ollama.model, config.provider.ollama.model);
    }

    #[test]
    fn test_partial_json5_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            "{\n  // local model\n  provider: { ollama: { model: 'qwen2.5' } },\n}\n",
        )
        .unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.provider.ollama.model, "qwen2.5");
        assert_eq!(config.provider.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.agent.max_iterations, 10);
    }

    #[test]
    fn test_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[mcp]\ncommand = \"/opt/server\"\nargs = [\"--log-level\", \"DEBUG\"]\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.mcp.command.as_deref(), Some("/opt/server"));
        assert_eq!(config.mcp.args.len(), 2);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ agent: ").unwrap();
        assert!(matches!(load_config_from_path(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_file_can_locate_config() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let config_file = dir.path().join("agent.json");
        std::fs::write(&config_file, "{ agent: { max_iterations: 4 } }").unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, format!("MCP_AGENT_CONFIG={}\n", config_file.display())).unwrap();

        std::env::remove_var("MCP_AGENT_CONFIG");
        let loaded = load_config_with_env_file(Some(&env_file));
        std::env::remove_var("MCP_AGENT_CONFIG");

        assert_eq!(loaded.unwrap().agent.max_iterations, 4);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("OLLAMA_TEMPERATURE", "warm"),
            ("MCP_AGENT_MAX_ITERATIONS", "3"),
            ("MCP_SERVER_COMMAND", "/usr/local/bin/server"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.provider.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.provider.ollama.temperature, 0.7);
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.mcp.command.as_deref(), Some("/usr/local/bin/server"));
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = sample_config().unwrap();
        let parsed: Config = serde_json::from_str(&sample).unwrap();
        assert_eq!(parsed.agent.default_question, Config::default().agent.default_question);
    }
}
