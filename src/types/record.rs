//! Input records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{HuginnError, Result};

/// Caller-supplied row identifier.
///
/// Opaque to huginn: it is echoed back exactly as received, number or
/// string, so the caller can correlate outcomes with grid rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value.into())
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        RecordId::Number(value.into())
    }
}

/// One unit of text submitted for annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Grid exports name this column `review_text`.
    #[serde(alias = "review_text")]
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Parse records from a JSON array or from JSON lines.
    ///
    /// Blank lines are skipped in JSON-lines input.
    pub fn parse_many(input: &str) -> Result<Vec<Record>> {
        if input.trim_start().starts_with('[') {
            return serde_json::from_str(input)
                .map_err(|e| HuginnError::InvalidInput(format!("invalid record array: {e}")));
        }

        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    HuginnError::InvalidInput(format!("invalid record on line {}: {e}", n + 1))
                })
            })
            .collect()
    }
}
