//! Prompts sent with every annotation request.

use super::schema::TOOL_NAME;
use crate::types::{Message, Record};

/// Fixed system instruction: the task and the four-field output contract.
pub fn system_prompt() -> String {
    format!(
        "You are an AI assistant for data analysis. Your task is to analyze customer reviews. \
         For each review, determine:\n\
         1. **sentiment**: 'positive', 'negative', 'neutral', or 'mixed'.\n\
         2. **tags**: 2-4 keywords (e.g., 'bugs', 'resources', 'notifications', 'UI/UX').\n\
         3. **summary**: a very brief summary of the review in English.\n\n\
         Always use the provided '{TOOL_NAME}' function to return the result, echoing the \
         review ID unchanged. Even if you are analyzing a single review, return it as an \
         array with one element."
    )
}

/// User instruction embedding the record's id and text.
pub fn user_prompt(record: &Record) -> String {
    format!(
        "Analyze this single review with ID={}: \"{}\". You must call the `{TOOL_NAME}` \
         function with the result.",
        record.id, record.text
    )
}

/// System + user message pair for one record.
pub fn messages(record: &Record) -> [Message; 2] {
    [
        Message::system(system_prompt()),
        Message::user(user_prompt(record)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn user_prompt_embeds_id_and_text() {
        let prompt = user_prompt(&Record::new(42i64, "too many popups"));
        assert!(prompt.contains("ID=42"));
        assert!(prompt.contains("\"too many popups\""));
        assert!(prompt.contains(TOOL_NAME));
    }

    #[test]
    fn empty_text_is_passed_through() {
        let prompt = user_prompt(&Record::new("r1", ""));
        assert!(prompt.contains("ID=r1: \"\""));
    }

    #[test]
    fn messages_are_system_then_user() {
        let [system, user] = messages(&Record::new("r1", "great app"));
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("'positive', 'negative', 'neutral', or 'mixed'"));
        assert_eq!(user.role, Role::User);
    }
}
