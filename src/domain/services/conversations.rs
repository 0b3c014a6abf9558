#[cfg(test)]
#[path = "conversations_test.rs"]
mod tests;

use std::collections::HashSet;

use chrono::Utc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::create_id;
use crate::domain::models::Conversation;
use crate::domain::models::Message;
use crate::domain::models::MutationError;
use crate::domain::models::PersistenceError;
use crate::domain::models::StoreBox;
use crate::domain::models::ValidationError;

pub const CONVERSATIONS_KEY: &str = "jarvis_conversations";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub placeholder_title: String,
    pub title_max_chars: usize,
}

impl Default for RepositoryOptions {
    fn default() -> RepositoryOptions {
        return RepositoryOptions {
            placeholder_title: "New Chat".to_string(),
            title_max_chars: 50,
        };
    }
}

impl RepositoryOptions {
    pub fn from_config() -> RepositoryOptions {
        let defaults = RepositoryOptions::default();
        let mut placeholder_title = Config::get(ConfigKey::PlaceholderTitle);
        if placeholder_title.trim().is_empty() {
            placeholder_title = defaults.placeholder_title;
        }

        let title_max_chars = Config::get(ConfigKey::TitleMaxLength)
            .parse::<usize>()
            .ok()
            .filter(|e| return *e > 0)
            .unwrap_or(defaults.title_max_chars);

        return RepositoryOptions {
            placeholder_title,
            title_max_chars,
        };
    }
}

fn sort_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| return b.updated_at.cmp(&a.updated_at));
}

/// Owns every conversation and the active-conversation pointer. Every
/// mutation is written through to the store before it is applied in memory,
/// so a failed write leaves the repository exactly as it was.
///
/// Each write re-serializes the whole collection, which is O(total messages)
/// per turn.
pub struct ConversationRepository {
    store: StoreBox,
    options: RepositoryOptions,
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    last_timestamp: i64,
}

impl ConversationRepository {
    /// Restores the collection from the store. A missing key is a first run,
    /// a malformed payload is logged and treated as empty.
    pub fn load(store: StoreBox, options: RepositoryOptions) -> ConversationRepository {
        let mut conversations = match store.get(CONVERSATIONS_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<Conversation>>(&payload) {
                Ok(conversations) => conversations,
                Err(err) => {
                    tracing::warn!(error = ?err, "Stored conversations are malformed, starting empty");
                    vec![]
                }
            },
            Ok(None) => vec![],
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to read stored conversations, starting empty");
                vec![]
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        conversations.retain(|conversation| return seen.insert(conversation.id.to_string()));
        sort_by_recency(&mut conversations);

        let last_timestamp = conversations
            .iter()
            .map(|conversation| return conversation.updated_at.max(conversation.created_at))
            .max()
            .unwrap_or_default();
        let active_id = conversations.first().map(|e| return e.id.to_string());

        return ConversationRepository {
            store,
            options,
            conversations,
            active_id,
            last_timestamp,
        };
    }

    pub fn options(&self) -> &RepositoryOptions {
        return &self.options;
    }

    /// Conversations ordered by `updated_at`, most recent first.
    pub fn list(&self) -> Vec<&Conversation> {
        let mut res = self.conversations.iter().collect::<Vec<&Conversation>>();
        res.sort_by(|a, b| return b.updated_at.cmp(&a.updated_at));
        return res;
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        return self.conversations.iter().find(|e| return e.id == id);
    }

    pub fn active_id(&self) -> Option<&str> {
        return self.active_id.as_deref();
    }

    pub fn active(&self) -> Option<&Conversation> {
        return self.active_id.as_deref().and_then(|id| return self.get(id));
    }

    pub fn create(&mut self) -> Result<String, PersistenceError> {
        let now = self.next_timestamp();
        let mut conversation = Conversation::new(&self.options.placeholder_title, now);
        while self.get(&conversation.id).is_some() {
            conversation.id = create_id("conv");
        }
        let id = conversation.id.to_string();

        let mut next = self.conversations.clone();
        next.insert(0, conversation);
        self.persist(&next)?;

        self.conversations = next;
        self.last_timestamp = now;
        self.active_id = Some(id.to_string());
        tracing::debug!(id = id, "Created conversation");

        return Ok(id);
    }

    /// Unknown ids are ignored. Returns whether the pointer moved.
    pub fn switch_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        self.active_id = Some(id.to_string());
        return true;
    }

    /// Replaces the full message sequence of a conversation, retitling it
    /// while it still has the placeholder title.
    pub fn append_messages(&mut self, id: &str, messages: Vec<Message>) -> Result<(), MutationError> {
        let idx = self
            .conversations
            .iter()
            .position(|e| return e.id == id)
            .ok_or_else(|| return ValidationError::UnknownConversation(id.to_string()))?;

        let now = self.next_timestamp();
        let mut next = self.conversations.clone();
        let conversation = &mut next[idx];

        if !messages.is_empty() && conversation.needs_title(&self.options.placeholder_title) {
            if let Some(title) = Conversation::derive_title(&messages, self.options.title_max_chars) {
                conversation.title = title;
            }
        }
        conversation.messages = messages;
        conversation.updated_at = now.max(conversation.created_at);

        sort_by_recency(&mut next);
        self.persist(&next)?;

        self.conversations = next;
        self.last_timestamp = now;

        return Ok(());
    }

    /// Deleting an unknown id is a no-op. Deleting the active conversation
    /// moves the pointer to the most recently updated remaining one.
    pub fn delete(&mut self, id: &str) -> Result<(), PersistenceError> {
        if self.get(id).is_none() {
            return Ok(());
        }

        let mut next = self
            .conversations
            .iter()
            .filter(|e| return e.id != id)
            .cloned()
            .collect::<Vec<Conversation>>();
        sort_by_recency(&mut next);
        self.persist(&next)?;

        self.conversations = next;
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.conversations.first().map(|e| return e.id.to_string());
        }

        return Ok(());
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.persist(&[])?;
        self.conversations = vec![];
        self.active_id = None;

        return Ok(());
    }

    fn next_timestamp(&self) -> i64 {
        return Utc::now().timestamp_millis().max(self.last_timestamp + 1);
    }

    fn persist(&self, conversations: &[Conversation]) -> Result<(), PersistenceError> {
        let payload =
            serde_json::to_string(conversations).map_err(|err| return PersistenceError::Serialize {
                key: CONVERSATIONS_KEY.to_string(),
                reason: err.to_string(),
            })?;

        return self.store.set(CONVERSATIONS_KEY, &payload);
    }
}
