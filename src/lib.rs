//! Huginn - concurrent AI annotation for review grids
//!
//! Huginn asks an OpenAI-compatible chat model to annotate text records
//! with a sentiment, a few tags and a one-sentence summary, using a
//! structured tool call instead of free text. Records can be annotated one
//! at a time or in bulk; bulk runs keep at most five calls in flight,
//! stream every outcome as soon as it is ready, and isolate failures to
//! the record that caused them.
//!
//! # Example
//!
//! ```rust,no_run
//! use huginn::{Huginn, Outcome, Record};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let orchestrator = Huginn::builder().api_key("sk-your-key").build()?;
//!
//!     // Single mode
//!     let outcome = orchestrator.analyze_one(&Record::new(1i64, "Great app!")).await;
//!     if let Outcome::Success { annotation, .. } = outcome {
//!         println!("{}: {}", annotation.sentiment, annotation.summary);
//!     }
//!
//!     // Bulk mode
//!     let records = vec![
//!         Record::new(2i64, "Crashes on launch."),
//!         Record::new(3i64, "Fine, I guess."),
//!     ];
//!     let summary = orchestrator
//!         .analyze_bulk(
//!             records,
//!             |outcome| println!("{outcome:?}"),
//!             || println!("all rows done"),
//!         )
//!         .await;
//!     println!("{} of {} succeeded", summary.succeeded, summary.total);
//!     Ok(())
//! }
//! ```

pub mod annotator;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use annotator::Annotator;
pub use error::{FailureKind, HuginnError, Result};
pub use orchestrator::{Huginn, HuginnBuilder, MAX_CONCURRENCY, Orchestrator};
pub use providers::{ChatProvider, OpenAiClient};
pub use version::{PKG_VERSION, version_string};

// Re-export all types
pub use types::{
    AnalysisPayload, AnalyzedRow, Annotation, BatchSummary, BulkEvent, ChatOptions, ChatResponse,
    FinishReason, Message, Outcome, Record, RecordId, Role, Sentiment, ToolCall, ToolChoice,
    ToolDefinition, Usage,
};
