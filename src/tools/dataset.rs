//! CSV datasets and the per-session store that holds them

use std::collections::HashMap;
use std::fmt::Write as _;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A parsed CSV table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Where the data was loaded from
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Parse CSV text; the first non-empty line is the header
    pub fn parse(source: impl Into<String>, content: &str) -> Result<Self> {
        let source = source.into();
        let mut lines = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let Some(header_line) = lines.next() else {
            return Err(Error::InvalidInput(format!("CSV file {} is empty", source)));
        };
        let headers = split_record(header_line);

        let mut rows = Vec::new();
        for (idx, line) in lines.enumerate() {
            let values = split_record(line);
            if values.len() != headers.len() {
                return Err(Error::InvalidInput(format!(
                    "CSV file {} row {} has {} fields, expected {}",
                    source,
                    idx + 2,
                    values.len(),
                    headers.len()
                )));
            }
            rows.push(values);
        }

        Ok(Dataset { source, headers, rows })
    }

    /// One-line shape summary
    pub fn summary(&self) -> String {
        format!(
            "{} rows x {} columns (columns: {})",
            self.rows.len(),
            self.headers.len(),
            self.headers.join(", ")
        )
    }

    /// Per-column statistics
    pub fn describe(&self) -> Vec<ColumnStats> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = self
                    .rows
                    .iter()
                    .map(|row| row[idx].as_str())
                    .filter(|v| !v.is_empty())
                    .collect();
                ColumnStats::compute(name, &values)
            })
            .collect()
    }
}

/// Statistics for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Numeric {
        name: String,
        count: usize,
        mean: f64,
        /// Sample standard deviation; `None` below two values
        std: Option<f64>,
        min: f64,
        max: f64,
    },
    Text {
        name: String,
        count: usize,
        unique: usize,
        top: Option<String>,
    },
}

impl ColumnStats {
    fn compute(name: &str, values: &[&str]) -> Self {
        let numbers: Option<Vec<f64>> = values.iter().map(|v| v.trim().parse::<f64>().ok()).collect();

        match numbers {
            Some(numbers) if !numbers.is_empty() => {
                let count = numbers.len();
                let mean = numbers.iter().sum::<f64>() / count as f64;
                let std = (count > 1).then(|| {
                    let var = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
                    var.sqrt()
                });
                ColumnStats::Numeric {
                    name: name.to_string(),
                    count,
                    mean,
                    std,
                    min: numbers.iter().copied().fold(f64::INFINITY, f64::min),
                    max: numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            }
            _ => {
                // Most frequent value; ties go to the first seen
                let mut counts: Vec<(&str, usize)> = Vec::new();
                for value in values {
                    match counts.iter_mut().find(|(v, _)| v == value) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((*value, 1)),
                    }
                }
                let top = counts
                    .iter()
                    .fold(None::<(&str, usize)>, |best, &(v, n)| match best {
                        Some((_, m)) if m >= n => best,
                        _ => Some((v, n)),
                    })
                    .map(|(v, _)| v.to_string());
                ColumnStats::Text {
                    name: name.to_string(),
                    count: values.len(),
                    unique: counts.len(),
                    top,
                }
            }
        }
    }
}

impl std::fmt::Display for ColumnStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnStats::Numeric { name, count, mean, std, min, max } => {
                let std = std.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "n/a".to_string());
                write!(
                    f,
                    "- {} (numeric): count={}, mean={:.2}, std={}, min={:.2}, max={:.2}",
                    name, count, mean, std, min, max
                )
            }
            ColumnStats::Text { name, count, unique, top } => write!(
                f,
                "- {} (text): count={}, unique={}, top={}",
                name,
                count,
                unique,
                top.as_deref().unwrap_or("n/a")
            ),
        }
    }
}

/// Render a full statistics report for a dataset
pub fn stats_report(id: &str, dataset: &Dataset) -> String {
    let mut out = format!("Dataset {} ({}): {}\n", id, dataset.source, dataset.summary());
    for column in dataset.describe() {
        let _ = writeln!(out, "{}", column);
    }
    out.trim_end().to_string()
}

/// Datasets loaded in one session, addressed by opaque handles
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: RwLock<HashMap<String, Dataset>>,
}

impl DatasetStore {
    /// Store a dataset and return its handle
    pub async fn insert(&self, dataset: Dataset) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.datasets.write().await.insert(id.clone(), dataset);
        id
    }

    /// Look up a dataset by handle
    pub async fn get(&self, id: &str) -> Option<Dataset> {
        self.datasets.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.datasets.read().await.len()
    }
}

/// Split one CSV record, honoring double-quoted fields
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
