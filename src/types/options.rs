//! Chat options

use super::tool::ToolChoice;
use serde::{Deserialize, Serialize};

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Options for chat requests (provider-agnostic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            tool_choice: ToolChoice::Auto,
        }
    }
}

impl ChatOptions {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}
