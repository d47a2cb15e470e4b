use serde::{Deserialize, Serialize};

use super::Timestamp;

/// A report (conversation) as seen by the view.
///
/// `last_read_time` is the server-confirmed read boundary and is owned
/// externally; the view only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub last_read_time: Option<Timestamp>,
    #[serde(default)]
    pub last_visible_action_created: Option<Timestamp>,
    /// `last_visible_action_created` of the linked transaction thread, if any
    #[serde(default)]
    pub transaction_thread_last_visible_action_created: Option<Timestamp>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default = "default_can_write")]
    pub can_write: bool,
}

fn default_can_write() -> bool {
    true
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_read_time: None,
            last_visible_action_created: None,
            transaction_thread_last_visible_action_created: None,
            is_archived: false,
            can_write: true,
        }
    }

    pub fn with_last_read_time(mut self, time: Timestamp) -> Self {
        self.last_read_time = Some(time);
        self
    }

    pub fn with_last_visible_action_created(mut self, time: Timestamp) -> Self {
        self.last_visible_action_created = Some(time);
        self
    }

    /// Whether there is visible activity newer than the read boundary.
    pub fn is_unread(&self) -> bool {
        match (self.last_visible_action_created, self.last_read_time) {
            (Some(last_visible), Some(last_read)) => last_visible > last_read,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Newest visible action across this report and its transaction thread.
    pub fn newest_visible_action_created(&self) -> Option<Timestamp> {
        match (
            self.last_visible_action_created,
            self.transaction_thread_last_visible_action_created,
        ) {
            (Some(own), Some(thread)) => Some(own.max(thread)),
            (own, thread) => own.or(thread),
        }
    }
}
