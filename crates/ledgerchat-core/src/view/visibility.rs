//! Visible subsequence of a conversation's messages.

use crate::models::Message;

/// Whether a single message should be rendered.
///
/// Offline, pending deletes may never reach the server, so everything is
/// kept. Deleted thread roots stay as placeholders and errored messages stay
/// so the user can retry or dismiss them.
pub fn is_message_visible(message: &Message, is_offline: bool, can_write: bool) -> bool {
    let survives_delete = is_offline
        || message.is_deleted_parent
        || !message.is_pending_delete()
        || message.has_errors;

    survives_delete && message.kind.is_visible(can_write)
}

/// Filter `messages` down to the visible ones, preserving order.
pub fn filter_visible(messages: &[Message], is_offline: bool, can_write: bool) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| is_message_visible(m, is_offline, can_write))
        .cloned()
        .collect()
}

/// Id of the oldest visible message (the first one a reader scrolling up
/// would reach), if any.
pub fn first_visible_message_id(messages: &[Message], is_offline: bool) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| is_offline || m.is_deleted_parent || !m.is_pending_delete() || m.has_errors)
        .map(|m| m.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageKind, PendingAction, Timestamp};

    fn msg(id: &str, ms: i64) -> Message {
        Message::new(id, Timestamp::from_millis(ms), "alice")
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_pending_delete_hidden_online() {
        let messages = vec![msg("b", 2).with_pending_action(PendingAction::Delete), msg("a", 1)];
        assert_eq!(ids(&filter_visible(&messages, false, true)), vec!["a"]);
    }

    #[test]
    fn test_offline_keeps_pending_delete() {
        let messages = vec![msg("b", 2).with_pending_action(PendingAction::Delete), msg("a", 1)];
        assert_eq!(ids(&filter_visible(&messages, true, true)), vec!["b", "a"]);
    }

    #[test]
    fn test_deleted_parent_and_errored_survive() {
        let mut parent = msg("p", 3).with_pending_action(PendingAction::Delete);
        parent.is_deleted_parent = true;
        let mut errored = msg("e", 2).with_pending_action(PendingAction::Delete);
        errored.has_errors = true;

        let messages = vec![parent, errored];
        assert_eq!(ids(&filter_visible(&messages, false, true)), vec!["p", "e"]);
    }

    #[test]
    fn test_kind_predicate_applies_even_offline() {
        let messages = vec![
            msg("w", 3).with_kind(MessageKind::ActionableWhisper),
            msg("i", 2).with_kind(MessageKind::InternalMarker),
            msg("c", 1),
        ];
        assert_eq!(ids(&filter_visible(&messages, true, false)), vec!["c"]);
        assert_eq!(ids(&filter_visible(&messages, true, true)), vec!["w", "c"]);
    }

    #[test]
    fn test_filter_is_stable() {
        let messages = vec![msg("c", 3), msg("b", 2).with_pending_action(PendingAction::Delete), msg("a", 1)];
        assert_eq!(
            filter_visible(&messages, false, true),
            filter_visible(&messages, false, true)
        );
    }

    #[test]
    fn test_first_visible_is_oldest_surviving() {
        let messages = vec![msg("b", 2), msg("a", 1).with_pending_action(PendingAction::Delete)];
        assert_eq!(first_visible_message_id(&messages, false), Some("b"));
        assert_eq!(first_visible_message_id(&messages, true), Some("a"));
        assert_eq!(first_visible_message_id(&[], false), None);
    }
}
