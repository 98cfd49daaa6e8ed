//! Annotation client: one record in, one validated analysis out.
//!
//! The pipeline for a record is strictly sequential:
//!
//! 1. send the system + user prompt with the analysis tool declared,
//! 2. require a call to [`TOOL_NAME`] in the response,
//! 3. decode its arguments into [`AnalysisPayload`].
//!
//! Each step maps to one failure class (communication, protocol, format).
//! No retries happen here; a failed call is final for that record.

pub mod prompt;
pub mod schema;

use std::sync::Arc;

use tracing::{debug, warn};

pub use schema::{TOOL_NAME, analysis_tool};

use crate::providers::ChatProvider;
use crate::types::{AnalysisPayload, AnalyzedRow, ChatOptions, Record};
use crate::{HuginnError, Result};

/// Annotates single records through a [`ChatProvider`].
pub struct Annotator {
    provider: Arc<dyn ChatProvider>,
    options: ChatOptions,
}

impl Annotator {
    /// Create an annotator with default chat options.
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            options: ChatOptions::default(),
        }
    }

    /// Replace the chat options (model, temperature, tool choice).
    #[must_use]
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Request an analysis for one record.
    ///
    /// Returns the rows exactly as the model declared them; extracting the
    /// single row (and checking there is one) is up to the caller.
    pub async fn annotate(&self, record: &Record) -> Result<Vec<AnalyzedRow>> {
        let messages = prompt::messages(record);
        let tools = std::slice::from_ref(analysis_tool());

        debug!(id = %record.id, model = %self.options.model, "calling model");
        let response = self
            .provider
            .chat(&messages, Some(tools), &self.options)
            .await?;

        let call = response
            .tool_call(TOOL_NAME)
            .ok_or_else(|| HuginnError::MissingToolCall(TOOL_NAME.to_string()))?;

        let payload: AnalysisPayload = call.parse_arguments().map_err(|e| {
            warn!(id = %record.id, arguments = %call.arguments, "unparseable tool arguments");
            HuginnError::InvalidFormat(e.to_string())
        })?;

        Ok(payload.analyzed_rows)
    }
}
