//! Placement of the "new messages" marker.
//!
//! The marker renders above exactly one message: the oldest unread one in
//! the loaded window. Resolution is a pure function of [`BoundaryInputs`], so
//! the view recomputes it after every event without accumulating state.
//!
//! ## Ordering
//! `messages` is in inverted-list order (index 0 = newest). Scanning
//! therefore walks from newer to older, and the "successor" of index `i` is
//! `i + 1`, the next older message. A message gets the marker when it is
//! unread and the message just older than it is not.

use std::collections::HashMap;

use crate::models::{Message, Timestamp};

/// Visible messages from the previous evaluation, keyed by id.
///
/// Diffing against this snapshot tells apart messages that just appeared
/// (or just settled from optimistic) from ones that were already on screen.
#[derive(Debug, Clone, Default)]
pub struct VisibleSnapshot {
    by_id: HashMap<String, Message>,
}

impl VisibleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            by_id: messages.iter().map(|m| (m.id.clone(), m.clone())).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.by_id.get(id)
    }
}

/// Everything the resolver looks at.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryInputs<'a> {
    /// Visible messages, newest first
    pub messages: &'a [Message],
    /// Working read boundary; `None` when the conversation was never read
    pub marker_time: Option<Timestamp>,
    /// Index into `messages` of the earliest offline arrival
    pub earliest_offline_index: Option<usize>,
    pub current_user_id: &'a str,
    pub previous_visible: &'a VisibleSnapshot,
    /// Whether the previous evaluation in this session produced a boundary
    pub has_previous_boundary: bool,
    /// Distance from the newest end of the list
    pub scroll_offset: f64,
    /// When the user started watching this conversation
    pub user_active_since: Timestamp,
    pub is_offline: bool,
    pub msg_visible_threshold: f64,
}

impl<'a> BoundaryInputs<'a> {
    fn is_unread_at(&self, index: usize) -> bool {
        self.messages
            .get(index)
            .is_some_and(|m| m.is_unread(self.marker_time))
    }

    /// Own messages that just appeared (or just got confirmed) must not open
    /// a marker when none exists yet: the marker time was bumped for the
    /// optimistic copy, but the server timestamp lands slightly later.
    fn is_self_echo(&self, message: &Message) -> bool {
        if self.has_previous_boundary || !message.is_authored_by(self.current_user_id) {
            return false;
        }

        match self.previous_visible.get(&message.id) {
            None => true,
            Some(previous) => previous.is_optimistic && !message.is_optimistic,
        }
    }

    fn hides_marker(&self, message: &Message) -> bool {
        message.kind.hides_unread_marker() || (!self.is_offline && message.is_pending_delete())
    }

    /// While the user sits at the newest end, only messages that were
    /// already there before they started watching can be "new" to them.
    fn is_within_visible_threshold(&self, message: &Message) -> bool {
        if self.scroll_offset < self.msg_visible_threshold {
            message.created_at < self.user_active_since
        } else {
            true
        }
    }

    fn should_display_marker(&self, index: usize, message: &Message) -> bool {
        let is_next_unread = self.is_unread_at(index + 1);

        if self.earliest_offline_index == Some(index) && !is_next_unread {
            return !self.is_self_echo(message);
        }

        if self.hides_marker(message) || !self.is_within_visible_threshold(message) {
            return false;
        }

        if !message.is_unread(self.marker_time) || is_next_unread {
            return false;
        }

        !self.is_self_echo(message)
    }
}

/// Id of the message that should carry the unread marker, if any.
///
/// Scans from the earliest offline arrival (or the newest message) towards
/// older ones; the first qualifying index wins.
pub fn resolve_unread_boundary(inputs: &BoundaryInputs<'_>) -> Option<String> {
    let start = inputs.earliest_offline_index.unwrap_or(0);

    inputs
        .messages
        .iter()
        .enumerate()
        .skip(start)
        .find(|(index, message)| inputs.should_display_marker(*index, message))
        .map(|(_, message)| message.id.clone())
}
