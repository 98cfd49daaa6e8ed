//! Provider trait for the external AI service.
//!
//! The annotator only needs one capability from the service: a single
//! non-streaming chat completion with a set of declared tools. Keeping it
//! behind a trait lets tests substitute deterministic stubs and lets the
//! concrete HTTP client be swapped for any OpenAI-compatible endpoint.
//!
//! Implementations must be safe to call concurrently; the orchestrator
//! shares one provider across every in-flight record.

use async_trait::async_trait;

use crate::Result;
use crate::types::{ChatOptions, ChatResponse, Message, ToolDefinition};

/// Provider for single-shot chat completion with tool calling.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Non-streaming chat completion.
    ///
    /// Transport, authentication, rate-limit and service errors are all
    /// returned as `Err`; a response without tool calls is still `Ok`.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<ChatResponse>;
}
