//! Tools module - the catalog served by `mcp-agent-server`
//!
//! Each tool is a self-contained module that implements the `Tool` trait.
//! Tools are registered into a `ToolRegistry` and exposed over MCP
//! `tools/list` and `tools/call`.
//!
//! ## Built-in Tools
//!
//! - **add**: Add two integers
//! - **load_csv**: Load a CSV file into the session, returning a `dataset_id`
//! - **csv_stats**: Per-column statistics for a loaded dataset
//!
//! Tool state lives in the `SessionContext` of the calling connection.

mod add;
mod csv;
mod dataset;
mod registry;
mod traits;

// Core trait and types
pub use traits::{parse_arguments, SessionContext, Tool, ToolResult};

// Registry
pub use registry::ToolRegistry;

// Built-in tools
pub use add::AddTool;
pub use csv::{CsvStatsTool, LoadCsvTool};

// Datasets
pub use dataset::{stats_report, ColumnStats, Dataset, DatasetStore};
