//! JSONL file-backed pace table.
//!
//! One JSON object per line. Malformed lines are logged and skipped so a
//! single bad export row cannot take the whole table offline; a missing
//! file is an empty dataset, not an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{RowSource, SourceError};
use crate::lookup::Row;

/// Local `.jsonl` pace table.
pub struct JsonlTable {
    path: PathBuf,
}

impl JsonlTable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_rows(&self, match_field: &str, limit: usize) -> Result<Vec<Row>, SourceError> {
        if !self.path.exists() {
            debug!("Pace table {:?} does not exist; empty dataset", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let value: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", line_num, self.path, e);
                    continue;
                }
            };

            let Value::Object(row) = value else {
                warn!("Line {} in {:?} is not a JSON object", line_num, self.path);
                continue;
            };

            if row.get(match_field).is_none_or(Value::is_null) {
                continue;
            }

            rows.push(row);
            if rows.len() >= limit {
                break;
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

#[async_trait]
impl RowSource for JsonlTable {
    async fn fetch_rows(&self, match_field: &str, limit: usize) -> Result<Vec<Row>, SourceError> {
        self.read_rows(match_field, limit)
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}
