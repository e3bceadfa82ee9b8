//! Configuration paths
//!
//! Utilities for resolving configuration file paths.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// File name of the bundled tool server
pub const SERVER_BINARY: &str = "mcp-agent-server";

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    // Check for explicit override
    if let Ok(dir) = std::env::var("MCP_AGENT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    dirs::config_dir()
        .map(|d| d.join("mcp-agent"))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".config").join("mcp-agent"))
                .unwrap_or_else(|| PathBuf::from(".mcp-agent"))
        })
}

/// Get the main configuration file path
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("MCP_AGENT_CONFIG") {
        return PathBuf::from(path);
    }

    config_dir().join("config.json")
}

/// The `mcp-agent-server` binary installed next to the running executable
pub fn default_server_command() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::Config(format!("Executable {} has no parent directory", exe.display())))?;

    let candidate = dir.join(format!("{}{}", SERVER_BINARY, std::env::consts::EXE_SUFFIX));
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(Error::Config(format!(
            "MCP server binary not found at {}; set mcp.command or MCP_SERVER_COMMAND",
            candidate.display()
        )))
    }
}
