//! Annotation types produced by the analysis tool

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::RecordId;

/// Overall sentiment of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Sentiment {
    /// All values, in the order declared to the model.
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment, tags and summary for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub sentiment: Sentiment,
    /// 2-4 short keywords, in the order the model produced them.
    pub tags: Vec<String>,
    /// One-sentence summary.
    pub summary: String,
}

/// One element of `analyzed_rows`, exactly as the model reports it.
///
/// All four fields are required; a row missing any of them fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedRow {
    pub id: RecordId,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
    pub summary: String,
}

impl AnalyzedRow {
    /// Drop the model-reported id, keeping the annotation fields.
    pub fn into_annotation(self) -> Annotation {
        Annotation {
            sentiment: self.sentiment,
            tags: self.tags,
            summary: self.summary,
        }
    }
}

/// Argument payload of the `update_grid_with_analysis` tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub analyzed_rows: Vec<AnalyzedRow>,
}
