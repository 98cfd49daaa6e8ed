//! Declared contract of the `update_grid_with_analysis` tool.
//!
//! The JSON schema sent to the model mirrors [`AnalysisPayload`] field for
//! field, and the sentiment enum is generated from [`Sentiment::ALL`], so
//! decoding the arguments into the typed payload is the whole validation.
//!
//! [`AnalysisPayload`]: crate::types::AnalysisPayload

use std::sync::LazyLock;

use serde_json::json;

use crate::types::{Sentiment, ToolDefinition};

/// Name of the structured-output tool the model must call.
pub const TOOL_NAME: &str = "update_grid_with_analysis";

const TOOL_DESCRIPTION: &str = "Accepts an array of analyzed reviews and returns them to update \
     the grid. Used for bulk analysis as well as for analyzing a single review.";

static ANALYSIS_TOOL: LazyLock<ToolDefinition> = LazyLock::new(|| {
    let sentiments: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();

    ToolDefinition::new(
        TOOL_NAME,
        TOOL_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "analyzed_rows": {
                    "type": "array",
                    "description": "Analysis results, one per row. A single analyzed review \
                                    must still be wrapped in this array.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": ["string", "number"],
                                "description": "The ID of the row in the grid."
                            },
                            "sentiment": {
                                "type": "string",
                                "enum": sentiments,
                                "description": "The sentiment: positive, negative, neutral, or mixed."
                            },
                            "tags": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "A list of 2-4 tags (e.g., 'price', 'shipping', 'bug')."
                            },
                            "summary": {
                                "type": "string",
                                "description": "A very brief summary of the review (1 sentence)."
                            }
                        },
                        "required": ["id", "sentiment", "tags", "summary"]
                    }
                }
            },
            "required": ["analyzed_rows"]
        }),
    )
});

/// The analysis tool definition, built once.
pub fn analysis_tool() -> &'static ToolDefinition {
    &ANALYSIS_TOOL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_require_all_four_fields() {
        let tool = analysis_tool();
        let required = &tool.parameters["properties"]["analyzed_rows"]["items"]["required"];
        assert_eq!(
            required,
            &json!(["id", "sentiment", "tags", "summary"])
        );
    }

    #[test]
    fn sentiment_enum_matches_type() {
        let tool = analysis_tool();
        let values = &tool.parameters["properties"]["analyzed_rows"]["items"]["properties"]
            ["sentiment"]["enum"];
        assert_eq!(values, &json!(["positive", "negative", "neutral", "mixed"]));
    }

    #[test]
    fn payload_root_is_required() {
        assert_eq!(analysis_tool().name, TOOL_NAME);
        assert_eq!(analysis_tool().parameters["required"], json!(["analyzed_rows"]));
    }
}
