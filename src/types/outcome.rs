//! Per-record outcomes and bulk events

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::record::RecordId;

/// Result of attempting to annotate one record.
///
/// Serializes to the shape the grid front end consumes:
/// `{"status":"success","id":…,"payload":{…}}` or
/// `{"status":"error","id":…,"message":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success {
        id: RecordId,
        #[serde(rename = "payload")]
        annotation: Annotation,
    },
    #[serde(rename = "error")]
    Failure { id: RecordId, message: String },
}

impl Outcome {
    /// Id of the record this outcome belongs to.
    pub fn id(&self) -> &RecordId {
        match self {
            Outcome::Success { id, .. } | Outcome::Failure { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Outcome::Success { annotation, .. } => Some(annotation),
            Outcome::Failure { .. } => None,
        }
    }
}

/// Totals for a finished bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// One item of a bulk stream.
///
/// A stream yields one `Outcome` per record, then exactly one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum BulkEvent {
    #[serde(rename = "review_analyzed")]
    Outcome(Outcome),
    #[serde(rename = "bulk_analysis_finished")]
    Finished(BatchSummary),
}
