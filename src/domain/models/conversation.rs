#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::create_id;
use super::Message;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Conversation {
    pub fn new(title: &str, now: i64) -> Conversation {
        return Conversation {
            id: create_id("conv"),
            title: title.to_string(),
            messages: vec![],
            created_at: now,
            updated_at: now,
        };
    }

    /// A conversation is retitled only while it still carries the placeholder
    /// (or no title at all).
    pub fn needs_title(&self, placeholder: &str) -> bool {
        return self.title.is_empty() || self.title == placeholder;
    }

    /// Title taken from the first user message, cut at `max_chars` characters
    /// with a trailing ellipsis when longer.
    pub fn derive_title(messages: &[Message], max_chars: usize) -> Option<String> {
        let first = messages.iter().find(|m| return m.is_user())?;
        let content = &first.content;

        if content.chars().count() <= max_chars {
            return Some(content.to_string());
        }

        let truncated = content.chars().take(max_chars).collect::<String>();
        return Some(format!("{truncated}..."));
    }
}
