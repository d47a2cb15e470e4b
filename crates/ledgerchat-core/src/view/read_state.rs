//! Read-state controller for one conversation view.
//!
//! Owns the working marker time and decides when the conversation gets
//! marked as read upstream.
//!
//! ## Update rules
//! - **switch**: `marker_time` = the conversation's read time,
//!   `user_active_since` = now
//! - **unread announced**: `marker_time` = payload, `user_active_since` = now
//! - **read-newest announced**: `marker_time` = payload
//! - **newest message changed, no boundary**: `marker_time` advances to it
//! - **mark unread from X**: `marker_time` = X.created_at - 1ms
//!
//! Live events are applied last-write-wins in arrival order.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::MARK_UNREAD_EPSILON_MS;
use crate::events::ViewCommand;
use crate::models::{Conversation, Message, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadState {
    /// App hidden or another screen focused
    Unfocused,
    FocusedUnread,
    FocusedRead,
}

/// What the controller needs to know about the view at decision time.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'a> {
    pub conversation: &'a Conversation,
    /// Visible messages, newest first
    pub visible: &'a [Message],
    pub current_user_id: &'a str,
    pub scroll_offset: f64,
    pub config: &'a EngineConfig,
}

#[derive(Debug, Clone)]
pub struct ReadStateController {
    marker_time: Option<Timestamp>,
    user_active_since: Timestamp,
    is_visible: bool,
    is_focused: bool,
    /// A mark-as-read was skipped because the user was scrolled away
    read_action_skipped: bool,
    /// Newest message time when the view lost visibility or focus
    newest_when_hidden: Option<Timestamp>,
    floating_counter_visible: bool,
    /// `last_visible_action_created` the last mark-as-read was issued for
    marked_read_through: Option<Option<Timestamp>>,
}

impl ReadStateController {
    pub fn new(conversation: &Conversation, now: Timestamp) -> Self {
        Self {
            marker_time: conversation.last_read_time,
            user_active_since: now,
            is_visible: true,
            is_focused: true,
            read_action_skipped: false,
            newest_when_hidden: None,
            floating_counter_visible: false,
            marked_read_through: None,
        }
    }

    /// Reset for a different conversation. Visibility carries over.
    pub fn switch_conversation(&mut self, conversation: &Conversation, now: Timestamp) {
        self.marker_time = conversation.last_read_time;
        self.user_active_since = now;
        self.read_action_skipped = false;
        self.newest_when_hidden = None;
        self.floating_counter_visible = false;
        self.marked_read_through = None;
    }

    // ===== Getters =====

    pub fn marker_time(&self) -> Option<Timestamp> {
        self.marker_time
    }

    pub fn user_active_since(&self) -> Timestamp {
        self.user_active_since
    }

    pub fn is_read_deferred(&self) -> bool {
        self.read_action_skipped
    }

    pub fn is_floating_counter_visible(&self) -> bool {
        self.floating_counter_visible
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_visible_and_focused(&self) -> bool {
        self.is_visible && self.is_focused
    }

    pub fn state(&self, conversation: &Conversation) -> ReadState {
        if !self.is_visible_and_focused() {
            ReadState::Unfocused
        } else if conversation.is_unread() {
            ReadState::FocusedUnread
        } else {
            ReadState::FocusedRead
        }
    }

    // ===== Live events =====

    pub fn on_unread_announced(&mut self, time: Timestamp, now: Timestamp) {
        tracing::debug!(marker_time = %time, "unread announced");
        self.marker_time = Some(time);
        self.user_active_since = now;
        self.marked_read_through = None;
    }

    pub fn on_read_newest_announced(&mut self, time: Timestamp) {
        tracing::debug!(marker_time = %time, "read-newest announced");
        self.marker_time = Some(time);
    }

    /// Keep the marker from trailing once the boundary clears: when nothing
    /// resolves as boundary and the newest message is newer than the
    /// marker, move the marker up to it. Returns whether it moved.
    pub fn advance_marker(&mut self, newest_created: Option<Timestamp>, has_boundary: bool) -> bool {
        if has_boundary {
            return false;
        }
        let Some(newest) = newest_created else {
            return false;
        };
        if self.marker_time.is_some_and(|marker| newest <= marker) {
            return false;
        }

        tracing::debug!(marker_time = %newest, "advancing unread marker to newest message");
        self.marker_time = Some(newest);
        true
    }

    // ===== Read decisions =====

    /// Mark-as-read for the conversation's current newest action, at most
    /// once per `last_visible_action_created` value.
    fn mark_read_once(&mut self, conversation: &Conversation) -> Option<ViewCommand> {
        let key = Some(conversation.last_visible_action_created);
        if self.marked_read_through == key {
            return None;
        }
        Some(self.mark_read(conversation))
    }

    fn mark_read(&mut self, conversation: &Conversation) -> ViewCommand {
        tracing::info!(conversation_id = %conversation.id, "marking conversation as read");
        self.marked_read_through = Some(conversation.last_visible_action_created);
        ViewCommand::MarkAsRead {
            conversation_id: conversation.id.clone(),
        }
    }

    /// The conversation's newest action changed (or the view just opened,
    /// or visibility flipped).
    ///
    /// Reads immediately when the user can see the newest messages; a push
    /// notification referrer counts as visible because the notification
    /// center may be covering the app. Otherwise the read is deferred until
    /// the user scrolls back down.
    pub fn on_conversation_updated(
        &mut self,
        ctx: &ReadContext<'_>,
        from_notification: bool,
    ) -> Vec<ViewCommand> {
        let mut commands = Vec::new();
        if !ctx.conversation.is_unread() {
            return commands;
        }

        let near_newest = ctx.scroll_offset < ctx.config.msg_visible_threshold;
        if (self.is_visible || from_notification) && near_newest {
            commands.extend(self.mark_read_once(ctx.conversation));
            if from_notification {
                commands.push(ViewCommand::ClearNotificationReferrer);
            }
        } else {
            tracing::debug!(conversation_id = %ctx.conversation.id, "deferring mark-as-read");
            self.read_action_skipped = true;
        }
        commands
    }

    /// App visibility or screen focus changed.
    ///
    /// When the user comes back and new messages from others are in view,
    /// the conversation is read. If the newest message seen before leaving
    /// is newer than the conversation's read time, another device read in
    /// the meantime and `user_active_since` is the better reference.
    pub fn on_visibility_changed(
        &mut self,
        is_visible: bool,
        is_focused: bool,
        ctx: &ReadContext<'_>,
        now: Timestamp,
    ) -> Vec<ViewCommand> {
        self.is_visible = is_visible;
        self.is_focused = is_focused;

        if !self.is_visible_and_focused() {
            if self.newest_when_hidden.is_none() {
                self.newest_when_hidden = ctx.visible.first().map(|m| m.created_at);
            }
            return Vec::new();
        }

        let last_read = ctx.conversation.last_read_time;
        let reference = match (self.newest_when_hidden.take(), last_read) {
            (Some(newest), Some(read)) if newest > read => Some(self.user_active_since),
            _ => last_read,
        };

        let has_new_messages_in_view = ctx.scroll_offset < ctx.config.msg_visible_threshold;
        let has_unread_from_others = reference.is_some_and(|reference| {
            ctx.visible
                .iter()
                .any(|m| m.created_at > reference && !m.is_authored_by(ctx.current_user_id))
        });

        if !ctx.conversation.is_archived && (!has_new_messages_in_view || !has_unread_from_others) {
            return Vec::new();
        }

        let commands: Vec<ViewCommand> = self.mark_read_once(ctx.conversation).into_iter().collect();
        if !commands.is_empty() {
            self.user_active_since = now;
        }
        commands
    }

    /// Scroll position changed. Drives the floating "new messages" counter
    /// and flushes a deferred read once the user is back near the bottom.
    pub fn on_scroll(
        &mut self,
        scroll_offset: f64,
        has_boundary: bool,
        conversation: &Conversation,
        config: &EngineConfig,
    ) -> Vec<ViewCommand> {
        let mut commands = Vec::new();

        if scroll_offset > config.vertical_offset_threshold
            && !self.floating_counter_visible
            && has_boundary
        {
            self.floating_counter_visible = true;
        }

        if scroll_offset < config.vertical_offset_threshold && self.floating_counter_visible {
            if self.read_action_skipped {
                self.read_action_skipped = false;
                commands.extend(self.mark_read_once(conversation));
            }
            self.floating_counter_visible = false;
        }

        commands
    }

    /// Explicit "mark as unread from here".
    pub fn mark_as_unread_from(&mut self, message: &Message, conversation_id: &str) -> ViewCommand {
        let marker = message.created_at.minus_millis(MARK_UNREAD_EPSILON_MS);
        tracing::info!(
            conversation_id = %conversation_id,
            message_id = %message.id,
            marker_time = %marker,
            "marking conversation as unread"
        );
        self.marker_time = Some(marker);
        self.marked_read_through = None;
        ViewCommand::MarkAsUnread {
            conversation_id: conversation_id.to_string(),
            from_message_id: message.id.clone(),
        }
    }

    /// The floating counter (or "jump to newest") was tapped.
    pub fn scroll_to_bottom_and_mark_read(
        &mut self,
        conversation: &Conversation,
        has_newest: bool,
    ) -> Vec<ViewCommand> {
        if !has_newest {
            return vec![
                ViewCommand::OpenNewest {
                    conversation_id: conversation.id.clone(),
                },
                ViewCommand::ScrollToBottom,
            ];
        }

        self.read_action_skipped = false;
        vec![ViewCommand::ScrollToBottom, self.mark_read(conversation)]
    }
}
