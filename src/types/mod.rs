//! Public types for the Huginn API.

mod annotation;
mod message;
mod options;
mod outcome;
mod record;
mod response;
mod tool;

pub use annotation::{AnalysisPayload, AnalyzedRow, Annotation, Sentiment};
pub use message::{Message, Role};
pub use options::{ChatOptions, DEFAULT_MODEL};
pub use outcome::{BatchSummary, BulkEvent, Outcome};
pub use record::{Record, RecordId};
pub use response::{ChatResponse, FinishReason, Usage};
pub use tool::{ToolCall, ToolChoice, ToolDefinition};
