//! CSV tools
//!
//! `load_csv` parses a file into the session's dataset store and hands back
//! an opaque `dataset_id`; `csv_stats` takes that id. No dataset is shared
//! between sessions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

use super::dataset::{stats_report, Dataset};
use super::traits::{parse_arguments, SessionContext, Tool, ToolResult};
use crate::error::Result;

#[derive(Deserialize)]
struct LoadCsvArgs {
    file_path: String,
}

#[derive(Deserialize)]
struct CsvStatsArgs {
    dataset_id: String,
}

/// Built-in tool: load a CSV file
pub struct LoadCsvTool;

#[async_trait]
impl Tool for LoadCsvTool {
    fn name(&self) -> &str {
        "load_csv"
    }

    fn description(&self) -> &str {
        "Load a CSV file and return a dataset_id for use with csv_stats"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the CSV file"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult> {
        let LoadCsvArgs { file_path } = parse_arguments(self.name(), args)?;

        if !Path::new(&file_path).is_file() {
            return Ok(ToolResult::failure(format!("File not found: {}", file_path)));
        }

        let content = match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => content,
            Err(e) => return Ok(ToolResult::failure(format!("Failed to read {}: {}", file_path, e))),
        };

        let dataset = match Dataset::parse(file_path.as_str(), &content) {
            Ok(dataset) => dataset,
            Err(e) => return Ok(ToolResult::failure(e.to_string())),
        };

        let summary = dataset.summary();
        let id = session.datasets.insert(dataset).await;
        info!("Loaded {} as dataset {}", file_path, id);

        Ok(ToolResult::success(format!(
            "Loaded {}: {}\ndataset_id: {}",
            file_path, summary, id
        )))
    }
}

/// Built-in tool: statistics for a loaded dataset
pub struct CsvStatsTool;

#[async_trait]
impl Tool for CsvStatsTool {
    fn name(&self) -> &str {
        "csv_stats"
    }

    fn description(&self) -> &str {
        "Show per-column statistics for a dataset loaded with load_csv"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "dataset_id": {
                    "type": "string",
                    "description": "The dataset_id returned by load_csv"
                }
            },
            "required": ["dataset_id"]
        })
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult> {
        let CsvStatsArgs { dataset_id } = parse_arguments(self.name(), args)?;

        match session.datasets.get(&dataset_id).await {
            Some(dataset) => Ok(ToolResult::success(stats_report(&dataset_id, &dataset))),
            None => Ok(ToolResult::failure(format!(
                "Unknown dataset_id: {}. Load a CSV file with load_csv first.",
                dataset_id
            ))),
        }
    }
}
