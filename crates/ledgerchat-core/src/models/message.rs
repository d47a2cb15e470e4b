use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Kind of a report action as far as the unread engine cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    /// Plain chat comment
    #[default]
    Comment,
    /// Aggregate preview of a child report (expense report, IOU)
    ReportPreview,
    /// The "report created" action at the very start of a conversation
    Created,
    /// Root action of a money-request transaction thread
    TransactionThreadRoot,
    /// Automated system action (policy change, report closed, ...)
    System,
    /// Whisper that asks the viewer to act (join request, ...)
    ActionableWhisper,
    /// Bookkeeping action that is never rendered
    InternalMarker,
}

impl MessageKind {
    /// Capability-based visibility for this kind.
    pub fn is_visible(&self, can_write: bool) -> bool {
        match self {
            MessageKind::InternalMarker => false,
            MessageKind::ActionableWhisper => can_write,
            _ => true,
        }
    }

    /// Kinds that never carry the "new messages" marker.
    pub fn hides_unread_marker(&self) -> bool {
        matches!(self, MessageKind::Created | MessageKind::InternalMarker)
    }
}

/// Pending offline operation on a message (not yet acknowledged by server)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingAction {
    Add,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub created_at: Timestamp,
    pub author_id: String,
    #[serde(default)]
    pub kind: MessageKind,
    /// Locally created and not yet confirmed by the server
    #[serde(default)]
    pub is_optimistic: bool,
    #[serde(default)]
    pub pending_action: Option<PendingAction>,
    /// The last write failed; stays visible so the user can retry or dismiss
    #[serde(default)]
    pub has_errors: bool,
    /// Deleted thread root kept as a placeholder
    #[serde(default)]
    pub is_deleted_parent: bool,
    /// For previews: who wrote the latest message in the child report
    #[serde(default)]
    pub child_last_author_id: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>, created_at: Timestamp, author_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at,
            author_id: author_id.into(),
            kind: MessageKind::Comment,
            is_optimistic: false,
            pending_action: None,
            has_errors: false,
            is_deleted_parent: false,
            child_last_author_id: None,
        }
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn optimistic(mut self) -> Self {
        self.is_optimistic = true;
        self.pending_action = Some(PendingAction::Add);
        self
    }

    pub fn with_pending_action(mut self, action: PendingAction) -> Self {
        self.pending_action = Some(action);
        self
    }

    pub fn with_child_author(mut self, author_id: impl Into<String>) -> Self {
        self.child_last_author_id = Some(author_id.into());
        self
    }

    /// Author used for "was this written by me" checks.
    /// Previews count as written by whoever wrote the child's latest message.
    pub fn effective_author(&self) -> &str {
        match (self.kind, self.child_last_author_id.as_deref()) {
            (MessageKind::ReportPreview, Some(child_author)) => child_author,
            _ => &self.author_id,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.effective_author() == user_id
    }

    pub fn is_pending_delete(&self) -> bool {
        self.pending_action == Some(PendingAction::Delete)
    }

    /// Whether this message counts as unread against `marker_time`.
    ///
    /// With no read time at all everything is unread except the
    /// conversation's own `Created` action.
    pub fn is_unread(&self, marker_time: Option<Timestamp>) -> bool {
        match marker_time {
            Some(marker) => self.created_at > marker,
            None => self.kind != MessageKind::Created,
        }
    }
}
