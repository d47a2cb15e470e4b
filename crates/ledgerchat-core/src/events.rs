use serde::{Deserialize, Serialize};

use crate::models::Timestamp;
use crate::view::pagination::PageRequest;

/// Live notification for one conversation, delivered through the
/// subscription registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LiveEvent {
    /// A new action arrived over the push channel
    #[serde(rename_all = "camelCase")]
    NewAction { is_from_current_user: bool },
    /// Another part of the app marked the conversation unread from `time`
    UnreadAnnounced { time: Timestamp },
    /// The newest action was read (here or on another device) at `time`
    ReadNewestAnnounced { time: Timestamp },
}

/// Side effect the host must carry out on behalf of a conversation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewCommand {
    /// Persist "read up to the newest action"
    #[serde(rename_all = "camelCase")]
    MarkAsRead { conversation_id: String },
    /// Persist "unread from this message"
    #[serde(rename_all = "camelCase")]
    MarkAsUnread {
        conversation_id: String,
        from_message_id: String,
    },
    /// Scroll the list to the newest message
    ScrollToBottom,
    /// Navigate to the newest page of the conversation (reload from newest)
    #[serde(rename_all = "camelCase")]
    OpenNewest { conversation_id: String },
    /// Ask the loader for another page
    LoadPage(PageRequest),
    /// The push-notification referrer was consumed; drop it from the route
    ClearNotificationReferrer,
}
