//! OpenAI-compatible chat-completions client.
//!
//! Speaks the `/chat/completions` wire format with `tools`, which is also
//! served by most OpenAI-compatible gateways. Point `base_url` at one of
//! those (or at a wiremock server in tests) to switch backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::traits::ChatProvider;
use crate::types::{
    ChatOptions, ChatResponse, FinishReason, Message, Role, ToolCall, ToolChoice, ToolDefinition,
    Usage,
};
use crate::{HuginnError, Result};

/// Default base URL for the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: Option<String>,
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(Some(api_key.into()), DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (proxies, compatible servers, wiremock).
    ///
    /// A trailing slash on `base_url` is ignored. `api_key` may be `None`
    /// for keyless local servers.
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(crate::version::user_agent())
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            api_key,
            http,
            base_url,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response, model: &str) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 | 403 => Err(HuginnError::AuthenticationFailed),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(HuginnError::RateLimited { retry_after })
            }
            404 => Err(HuginnError::Api {
                status: 404,
                message: format!("model or endpoint not found: {model}"),
            }),
            code => Err(HuginnError::Api {
                status: code,
                message: format!("chat completion failed: {status}"),
            }),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "openai.chat", skip_all, fields(model = %options.model))]
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest::new(messages, tools, options);

        let mut request = self.http.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        self.handle_response_errors(&response, &options.model)?;

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let response = completion.into_chat_response()?;
        debug!(
            tool_calls = response.tool_calls.len(),
            finish_reason = ?response.finish_reason,
            "chat completion received"
        );
        Ok(response)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    fn new(
        messages: &'a [Message],
        tools: Option<&'a [ToolDefinition]>,
        options: &'a ChatOptions,
    ) -> Self {
        let tools = tools.unwrap_or_default();
        let tool_choice = match tools.first() {
            None => None,
            Some(first) => Some(match options.tool_choice {
                ToolChoice::Auto => serde_json::json!("auto"),
                ToolChoice::Required => serde_json::json!("required"),
                ToolChoice::Forced => serde_json::json!({
                    "type": "function",
                    "function": { "name": first.name },
                }),
            }),
        };

        Self {
            model: &options.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            tools: tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
            tool_choice,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    function: WireFunctionCall,
}

#[derive(Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl CompletionResponse {
    fn into_chat_response(self) -> Result<ChatResponse> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(HuginnError::EmptyResponse)?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
                .collect(),
            usage: self.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: self.model,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool() -> ToolDefinition {
        ToolDefinition::new("update_grid_with_analysis", "d", json!({"type": "object"}))
    }

    #[test]
    fn request_wraps_tools_in_function_envelope() {
        let messages = [Message::system("sys"), Message::user("hi")];
        let tools = [tool()];
        let options = ChatOptions::default();
        let body = serde_json::to_value(CompletionRequest::new(&messages, Some(&tools), &options))
            .unwrap();

        assert_eq!(body["model"], "gpt-4.1-nano");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(
            body["tools"][0]["function"]["name"],
            "update_grid_with_analysis"
        );
        assert_eq!(body["tool_choice"], "auto");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn forced_tool_choice_names_first_tool() {
        let messages = [Message::user("hi")];
        let tools = [tool()];
        let options = ChatOptions::default().tool_choice(ToolChoice::Forced);
        let body = serde_json::to_value(CompletionRequest::new(&messages, Some(&tools), &options))
            .unwrap();

        assert_eq!(
            body["tool_choice"],
            json!({"type": "function", "function": {"name": "update_grid_with_analysis"}})
        );
    }

    #[test]
    fn no_tools_omits_tool_choice() {
        let messages = [Message::user("hi")];
        let options = ChatOptions::default().tool_choice(ToolChoice::Required);
        let body =
            serde_json::to_value(CompletionRequest::new(&messages, None, &options)).unwrap();

        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn response_without_choices_is_empty() {
        let raw: CompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            raw.into_chat_response(),
            Err(HuginnError::EmptyResponse)
        ));
    }

    #[test]
    fn response_maps_tool_calls_and_usage() {
        let raw: CompletionResponse = serde_json::from_value(json!({
            "model": "gpt-4.1-nano",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "update_grid_with_analysis", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let response = raw.into_chat_response().unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_1");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }
}
