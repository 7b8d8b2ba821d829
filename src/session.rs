//! Process-scoped UI session state: the conversation transcript and
//! the most recently built blueprint. Mutated only by the single
//! handler servicing a request, never persisted.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. The timestamp is for display only and never
/// reaches the model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Default)]
pub struct Session {
    pub history: Vec<ConversationEntry>,
    pub blueprint: Option<Blueprint>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.history.push(ConversationEntry {
            role,
            content,
            timestamp,
        });
    }

    /// Replace the stored blueprint wholesale; no partial blueprint is
    /// ever observable.
    pub fn set_blueprint(&mut self, blueprint: Blueprint) {
        self.blueprint = Some(blueprint);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
