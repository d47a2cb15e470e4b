//! Replays a recorded event script through a conversation view.

use std::path::Path;

use anyhow::{Context, Result};
use ledgerchat_core::models::{Conversation, Message, NetworkStatus, Timestamp};
use ledgerchat_core::view::{Edge, OpenOptions};
use ledgerchat_core::{ConversationView, EngineConfig, LiveEvent, SubscriptionRegistry, ViewCommand, ViewSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    pub current_user_id: String,
    pub conversation: Conversation,
    #[serde(default)]
    pub from_notification: bool,
    #[serde(default)]
    pub loading_initial: bool,
    /// When the view opens; defaults to the wall clock
    #[serde(default)]
    pub opened_at: Option<Timestamp>,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplayStep {
    SetMessages {
        messages: Vec<Message>,
    },
    UpsertMessage {
        message: Message,
    },
    #[serde(rename_all = "camelCase")]
    RemoveMessage {
        message_id: String,
    },
    OlderPage {
        messages: Vec<Message>,
    },
    NewerPage {
        messages: Vec<Message>,
    },
    UpdateConversation {
        conversation: Conversation,
    },
    Network {
        status: NetworkStatus,
    },
    #[serde(rename_all = "camelCase")]
    Visibility {
        is_visible: bool,
        is_focused: bool,
        now: Timestamp,
    },
    Scroll {
        offset: f64,
    },
    /// Published through the subscription registry, then drained
    LiveEvent {
        event: LiveEvent,
        now: Timestamp,
    },
    #[serde(rename_all = "camelCase")]
    MarkUnread {
        message_id: String,
    },
    ScrollToBottom,
    EdgeFlags {
        edge: Edge,
        loading: bool,
        error: bool,
    },
    RequestOlder,
    RequestNewer,
    Retry {
        edge: Edge,
    },
    Close,
}

impl ReplayStep {
    fn name(&self) -> &'static str {
        match self {
            ReplayStep::SetMessages { .. } => "setMessages",
            ReplayStep::UpsertMessage { .. } => "upsertMessage",
            ReplayStep::RemoveMessage { .. } => "removeMessage",
            ReplayStep::OlderPage { .. } => "olderPage",
            ReplayStep::NewerPage { .. } => "newerPage",
            ReplayStep::UpdateConversation { .. } => "updateConversation",
            ReplayStep::Network { .. } => "network",
            ReplayStep::Visibility { .. } => "visibility",
            ReplayStep::Scroll { .. } => "scroll",
            ReplayStep::LiveEvent { .. } => "liveEvent",
            ReplayStep::MarkUnread { .. } => "markUnread",
            ReplayStep::ScrollToBottom => "scrollToBottom",
            ReplayStep::EdgeFlags { .. } => "edgeFlags",
            ReplayStep::RequestOlder => "requestOlder",
            ReplayStep::RequestNewer => "requestNewer",
            ReplayStep::Retry { .. } => "retry",
            ReplayStep::Close => "close",
        }
    }
}

/// What one step produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutput {
    /// 0 is the open itself
    pub index: usize,
    pub step: &'static str,
    pub commands: Vec<ViewCommand>,
    pub snapshot: ViewSnapshot,
}

pub fn load_script(path: &Path) -> Result<ReplayScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse replay script: {}", path.display()))
}

/// Run `script` step by step against a fresh view.
///
/// Each replay gets its own registry so concurrent replays can't steal each
/// other's subscriptions.
pub fn run_replay(script: ReplayScript, config: &EngineConfig) -> Vec<StepOutput> {
    let registry = SubscriptionRegistry::new();
    let opened_at = script.opened_at.unwrap_or_else(Timestamp::now);
    let conversation_id = script.conversation.id.clone();

    let (mut view, commands) = ConversationView::open(
        *config,
        script.current_user_id,
        script.conversation,
        &registry,
        OpenOptions {
            from_notification: script.from_notification,
            is_loading_initial: script.loading_initial,
        },
        opened_at,
    );

    let mut outputs = vec![StepOutput {
        index: 0,
        step: "open",
        commands,
        snapshot: view.render(),
    }];

    for (i, step) in script.steps.into_iter().enumerate() {
        let name = step.name();
        tracing::debug!(index = i + 1, step = name, "replaying step");

        let commands = match step {
            ReplayStep::SetMessages { messages } => view.set_messages(messages),
            ReplayStep::UpsertMessage { message } => view.upsert_message(message),
            ReplayStep::RemoveMessage { message_id } => view.remove_message(&message_id),
            ReplayStep::OlderPage { messages } => view.prepend_older_page(messages),
            ReplayStep::NewerPage { messages } => view.append_newer_page(messages),
            ReplayStep::UpdateConversation { conversation } => view.update_conversation(conversation),
            ReplayStep::Network { status } => view.set_network_status(status),
            ReplayStep::Visibility {
                is_visible,
                is_focused,
                now,
            } => view.on_visibility_changed(is_visible, is_focused, now),
            ReplayStep::Scroll { offset } => view.on_scroll(offset),
            ReplayStep::LiveEvent { event, now } => {
                registry.publish(&conversation_id, &event);
                view.drain_live_events(now)
            }
            ReplayStep::MarkUnread { message_id } => view.mark_as_unread_from(&message_id),
            ReplayStep::ScrollToBottom => view.scroll_to_bottom_and_mark_read(),
            ReplayStep::EdgeFlags { edge, loading, error } => {
                view.set_edge_flags(edge, loading, error);
                Vec::new()
            }
            ReplayStep::RequestOlder => view.request_older(),
            ReplayStep::RequestNewer => view.request_newer(),
            ReplayStep::Retry { edge } => view.retry(edge),
            ReplayStep::Close => {
                view.close();
                Vec::new()
            }
        };

        outputs.push(StepOutput {
            index: i + 1,
            step: name,
            commands,
            snapshot: view.render(),
        });
    }

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "currentUserId": "me",
        "openedAt": "2024-05-01 12:00:00.000",
        "conversation": {
            "id": "r1",
            "lastReadTime": "2024-05-01 09:00:00.000",
            "lastVisibleActionCreated": "2024-05-01 11:00:00.000"
        },
        "steps": [
            {"type": "setMessages", "messages": [
                {"id": "c", "createdAt": "2024-05-01 11:00:00.000", "authorId": "bob"},
                {"id": "b", "createdAt": "2024-05-01 10:00:00.000", "authorId": "bob"},
                {"id": "a", "createdAt": "2024-05-01 08:00:00.000", "authorId": "bob"}
            ]},
            {"type": "liveEvent", "now": "2024-05-01 12:01:00.000",
             "event": {"type": "readNewestAnnounced", "time": "2024-05-01 11:00:00.000"}},
            {"type": "markUnread", "messageId": "c"},
            {"type": "edgeFlags", "edge": "older", "loading": true, "error": false},
            {"type": "requestOlder"},
            {"type": "close"}
        ]
    }"#;

    #[test]
    fn test_replay_script() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).unwrap();
        let outputs = run_replay(script, &EngineConfig::default());
        assert_eq!(outputs.len(), 7);

        assert_eq!(outputs[0].step, "open");
        assert_eq!(outputs[1].snapshot.boundary_message_id.as_deref(), Some("b"));

        // Read on another device: marker moves past everything
        assert_eq!(outputs[2].snapshot.boundary_message_id, None);

        assert_eq!(outputs[3].snapshot.boundary_message_id.as_deref(), Some("c"));
        assert!(matches!(
            outputs[3].commands.as_slice(),
            [ViewCommand::MarkAsUnread { .. }]
        ));

        assert!(outputs[4].snapshot.older.loading);
        assert!(outputs[5].commands.is_empty());
        assert_eq!(outputs[6].step, "close");
    }

    #[test]
    fn test_load_script_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_script(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("script.json"));
    }
}
