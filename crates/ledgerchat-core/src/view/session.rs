//! One open conversation view.
//!
//! `ConversationView` owns the loaded messages and the per-view state
//! machines, recomputes the unread boundary after every event and hands the
//! resulting side effects back to the host as [`ViewCommand`]s.

use std::sync::mpsc::{self, Receiver};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::events::{LiveEvent, ViewCommand};
use crate::models::{Conversation, Message, MessageStream, NetworkStatus, Timestamp};
use crate::subscriptions::{Subscription, SubscriptionRegistry};

use super::offline::find_earliest_offline_arrival;
use super::pagination::{
    AutoScrollTracker, BoundaryLoader, Edge, EdgeStatus, PaginationBoundaries, PaginationContext,
};
use super::read_state::{ReadContext, ReadState, ReadStateController};
use super::unread_marker::{resolve_unread_boundary, BoundaryInputs, VisibleSnapshot};
use super::visibility::{filter_visible, first_visible_message_id};

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// The view was opened by tapping a push notification
    pub from_notification: bool,
    /// The host is still loading the first page
    pub is_loading_initial: bool,
}

/// Render-ready state of the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub conversation_id: String,
    pub boundary_message_id: Option<String>,
    pub marker_time: Option<Timestamp>,
    pub read_state: ReadState,
    pub older: EdgeStatus,
    pub newer: EdgeStatus,
    pub footer: BoundaryLoader,
    pub header: BoundaryLoader,
    pub floating_counter_visible: bool,
    pub show_scroll_to_bottom: bool,
    pub has_newest: bool,
    pub first_visible_message_id: Option<String>,
    pub visible_count: usize,
}

pub struct ConversationView {
    config: EngineConfig,
    current_user_id: String,
    conversation: Conversation,
    stream: MessageStream,
    /// Visible messages, newest first
    visible: Vec<Message>,
    /// Visible list as it was before its last change
    previous_visible: VisibleSnapshot,
    boundary_id: Option<String>,
    previous_newest_created: Option<Timestamp>,
    /// Conversation id, newest action time and visibility the read
    /// decision last ran for
    read_trigger: Option<(String, Option<Timestamp>, bool)>,
    network: NetworkStatus,
    scroll_offset: f64,
    from_notification: bool,
    read_state: ReadStateController,
    pagination: PaginationBoundaries,
    auto_scroll: AutoScrollTracker,
    live_events: Receiver<LiveEvent>,
    subscription: Option<Subscription>,
}

impl ConversationView {
    /// Open a view on `conversation` and subscribe it to live events.
    ///
    /// Returns the view and the commands produced by the initial read
    /// decision.
    pub fn open(
        config: EngineConfig,
        current_user_id: impl Into<String>,
        conversation: Conversation,
        registry: &SubscriptionRegistry,
        options: OpenOptions,
        now: Timestamp,
    ) -> (Self, Vec<ViewCommand>) {
        let (tx, rx) = mpsc::channel();
        let subscription = registry.acquire(&conversation.id, move |event| {
            let _ = tx.send(event.clone());
        });

        let mut pagination = PaginationBoundaries::new();
        pagination.set_loading_initial(options.is_loading_initial);

        tracing::info!(conversation_id = %conversation.id, "opening conversation view");

        let mut view = Self {
            config,
            current_user_id: current_user_id.into(),
            read_state: ReadStateController::new(&conversation, now),
            conversation,
            stream: MessageStream::new(),
            visible: Vec::new(),
            previous_visible: VisibleSnapshot::new(),
            boundary_id: None,
            previous_newest_created: None,
            read_trigger: None,
            network: NetworkStatus::online(),
            scroll_offset: 0.0,
            from_notification: options.from_notification,
            pagination,
            auto_scroll: AutoScrollTracker::default(),
            live_events: rx,
            subscription: Some(subscription),
        };

        let mut commands = view.recompute();
        commands.extend(view.conversation_updated());
        (view, commands)
    }

    /// Point the view at a different conversation, dropping all loaded
    /// messages and per-conversation state.
    pub fn switch_conversation(
        &mut self,
        conversation: Conversation,
        registry: &SubscriptionRegistry,
        now: Timestamp,
    ) -> Vec<ViewCommand> {
        tracing::info!(
            from = %self.conversation.id,
            to = %conversation.id,
            "switching conversation"
        );

        if let Some(mut subscription) = self.subscription.take() {
            subscription.release();
        }
        let (tx, rx) = mpsc::channel();
        self.subscription = Some(registry.acquire(&conversation.id, move |event| {
            let _ = tx.send(event.clone());
        }));
        self.live_events = rx;

        self.read_state.switch_conversation(&conversation, now);
        self.conversation = conversation;
        self.stream.clear();
        self.visible.clear();
        self.previous_visible = VisibleSnapshot::new();
        self.boundary_id = None;
        self.previous_newest_created = None;
        self.read_trigger = None;
        self.scroll_offset = 0.0;
        self.from_notification = false;
        self.pagination = PaginationBoundaries::new();
        self.auto_scroll = AutoScrollTracker::default();

        let mut commands = self.recompute();
        commands.extend(self.conversation_updated());
        commands
    }

    /// Release the live-event subscription. Further events are dropped.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            tracing::info!(conversation_id = %self.conversation.id, "closing conversation view");
            subscription.release();
        }
    }

    // ===== Getters =====

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn visible_messages(&self) -> &[Message] {
        &self.visible
    }

    pub fn boundary_message_id(&self) -> Option<&str> {
        self.boundary_id.as_deref()
    }

    pub fn marker_time(&self) -> Option<Timestamp> {
        self.read_state.marker_time()
    }

    pub fn user_active_since(&self) -> Timestamp {
        self.read_state.user_active_since()
    }

    pub fn read_state(&self) -> ReadState {
        self.read_state.state(&self.conversation)
    }

    pub fn edge_status(&self, edge: Edge) -> EdgeStatus {
        self.pagination.edge_status(edge)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Whether the newest loaded message is the conversation's newest action.
    pub fn has_newest(&self) -> bool {
        let Some(newest_action) = self.conversation.newest_visible_action_created() else {
            return true;
        };
        let Some(newest) = self.visible.first() else {
            return false;
        };

        newest.created_at == newest_action
    }

    // ===== Message updates =====

    /// Replace the loaded messages. Ends the initial load.
    pub fn set_messages(&mut self, messages: impl IntoIterator<Item = Message>) -> Vec<ViewCommand> {
        self.stream = MessageStream::from_messages(messages);
        self.pagination.set_loading_initial(false);
        self.recompute()
    }

    /// Insert or replace one message (live arrival, optimistic send or
    /// server confirmation).
    pub fn upsert_message(&mut self, message: Message) -> Vec<ViewCommand> {
        self.stream.upsert(message);
        self.recompute()
    }

    pub fn remove_message(&mut self, message_id: &str) -> Vec<ViewCommand> {
        if self.stream.remove(message_id).is_none() {
            return Vec::new();
        }
        self.recompute()
    }

    /// An older page finished loading. Clears the older edge's flags.
    pub fn prepend_older_page(&mut self, page: impl IntoIterator<Item = Message>) -> Vec<ViewCommand> {
        self.stream.prepend_older_page(page);
        self.pagination.set_edge_flags(Edge::Older, false, false);
        self.recompute()
    }

    /// A newer page finished loading. Clears the newer edge's flags.
    pub fn append_newer_page(&mut self, page: impl IntoIterator<Item = Message>) -> Vec<ViewCommand> {
        self.stream.append_newer_page(page);
        self.pagination.set_edge_flags(Edge::Newer, false, false);
        self.recompute()
    }

    /// The conversation record changed (read time, newest action, archive).
    ///
    /// Only a new newest action re-runs the read decision; a read-time sync
    /// alone must not undo an explicit mark-as-unread.
    pub fn update_conversation(&mut self, conversation: Conversation) -> Vec<ViewCommand> {
        self.conversation = conversation;
        let mut commands = self.recompute();
        commands.extend(self.conversation_updated());
        commands
    }

    pub fn set_network_status(&mut self, network: NetworkStatus) -> Vec<ViewCommand> {
        if network.is_offline != self.network.is_offline {
            tracing::info!(
                conversation_id = %self.conversation.id,
                is_offline = network.is_offline,
                "network status changed"
            );
        }
        self.network = network;
        self.recompute()
    }

    // ===== User and app events =====

    pub fn on_visibility_changed(
        &mut self,
        is_visible: bool,
        is_focused: bool,
        now: Timestamp,
    ) -> Vec<ViewCommand> {
        let ctx = ReadContext {
            conversation: &self.conversation,
            visible: &self.visible,
            current_user_id: &self.current_user_id,
            scroll_offset: self.scroll_offset,
            config: &self.config,
        };
        let mut commands = self.read_state.on_visibility_changed(is_visible, is_focused, &ctx, now);
        commands.extend(self.conversation_updated());
        commands.extend(self.recompute());
        commands
    }

    /// `offset` is the distance from the newest end of the list.
    pub fn on_scroll(&mut self, offset: f64) -> Vec<ViewCommand> {
        self.scroll_offset = offset.max(0.0);
        let mut commands = self.read_state.on_scroll(
            self.scroll_offset,
            self.boundary_id.is_some(),
            &self.conversation,
            &self.config,
        );
        commands.extend(self.recompute());
        commands
    }

    /// Apply one live event.
    pub fn on_live_event(&mut self, event: &LiveEvent, now: Timestamp) -> Vec<ViewCommand> {
        match event {
            LiveEvent::NewAction {
                is_from_current_user,
            } => {
                if !is_from_current_user {
                    return Vec::new();
                }
                // Own message: follow it to the bottom, reloading from the
                // newest page if it isn't loaded
                if self.has_newest() {
                    vec![ViewCommand::ScrollToBottom]
                } else {
                    vec![ViewCommand::OpenNewest {
                        conversation_id: self.conversation.id.clone(),
                    }]
                }
            }
            LiveEvent::UnreadAnnounced { time } => {
                self.read_state.on_unread_announced(*time, now);
                self.recompute()
            }
            LiveEvent::ReadNewestAnnounced { time } => {
                self.read_state.on_read_newest_announced(*time);
                self.recompute()
            }
        }
    }

    /// Apply every live event queued through the subscription, in arrival
    /// order.
    pub fn drain_live_events(&mut self, now: Timestamp) -> Vec<ViewCommand> {
        let events: Vec<LiveEvent> = self.live_events.try_iter().collect();
        let mut commands = Vec::new();
        for event in &events {
            commands.extend(self.on_live_event(event, now));
        }
        commands
    }

    /// Mark the conversation unread starting at `message_id`.
    pub fn mark_as_unread_from(&mut self, message_id: &str) -> Vec<ViewCommand> {
        let Some(message) = self.stream.get(message_id).cloned() else {
            tracing::warn!(
                conversation_id = %self.conversation.id,
                message_id,
                "mark as unread for unknown message"
            );
            return Vec::new();
        };

        let mut commands = vec![self.read_state.mark_as_unread_from(&message, &self.conversation.id)];
        commands.extend(self.recompute());
        commands
    }

    pub fn scroll_to_bottom_and_mark_read(&mut self) -> Vec<ViewCommand> {
        let has_newest = self.has_newest();
        self.read_state.scroll_to_bottom_and_mark_read(&self.conversation, has_newest)
    }

    // ===== Pagination =====

    /// The list reached its oldest end.
    pub fn request_older(&mut self) -> Vec<ViewCommand> {
        self.request_page(Edge::Older, false)
    }

    /// The list reached its newest end.
    pub fn request_newer(&mut self) -> Vec<ViewCommand> {
        self.request_page(Edge::Newer, false)
    }

    /// Explicit retry after an error at `edge`.
    pub fn retry(&mut self, edge: Edge) -> Vec<ViewCommand> {
        self.request_page(edge, true)
    }

    fn request_page(&self, edge: Edge, force: bool) -> Vec<ViewCommand> {
        let ctx = self.pagination_context();
        let request = if force {
            self.pagination.retry(edge, &ctx)
        } else {
            self.pagination.request_more(edge, false, &ctx)
        };
        request
            .map(ViewCommand::LoadPage)
            .into_iter()
            .collect()
    }

    pub fn set_edge_flags(&mut self, edge: Edge, loading: bool, error: bool) {
        if error {
            tracing::warn!(conversation_id = %self.conversation.id, ?edge, "page load failed");
        }
        self.pagination.set_edge_flags(edge, loading, error);
    }

    pub fn set_loading_initial(&mut self, loading: bool) {
        self.pagination.set_loading_initial(loading);
    }

    fn pagination_context(&self) -> PaginationContext<'_> {
        PaginationContext {
            messages: self.stream.as_slice(),
            is_offline: self.network.is_offline,
            has_newest: self.has_newest(),
        }
    }

    // ===== Rendering =====

    /// Current render state. Advances the boundary loaders' first-render
    /// latch, so call it once per rendered frame.
    pub fn render(&mut self) -> ViewSnapshot {
        let is_offline = self.network.is_offline;
        let footer = self.pagination.footer(is_offline);
        let header = self.pagination.header(is_offline);

        let ctx = self.pagination_context();
        let can_scroll_to_newer = self.pagination.can_scroll_to_newer(&ctx, &self.config);
        let has_newest = ctx.has_newest;

        let floating_counter_visible =
            self.read_state.is_floating_counter_visible() && self.boundary_id.is_some();

        ViewSnapshot {
            conversation_id: self.conversation.id.clone(),
            boundary_message_id: self.boundary_id.clone(),
            marker_time: self.read_state.marker_time(),
            read_state: self.read_state(),
            older: self.pagination.edge_status(Edge::Older),
            newer: self.pagination.edge_status(Edge::Newer),
            footer,
            header,
            floating_counter_visible,
            show_scroll_to_bottom: floating_counter_visible || can_scroll_to_newer,
            has_newest,
            first_visible_message_id: first_visible_message_id(self.stream.as_slice(), is_offline)
                .map(str::to_string),
            visible_count: self.visible.len(),
        }
    }

    // ===== Internals =====

    /// Run the read decision if the conversation, its newest action or the
    /// view's visibility changed since it last ran.
    fn conversation_updated(&mut self) -> Vec<ViewCommand> {
        let trigger = (
            self.conversation.id.clone(),
            self.conversation.last_visible_action_created,
            self.read_state.is_visible(),
        );
        if self.read_trigger.as_ref() == Some(&trigger) {
            return Vec::new();
        }
        self.read_trigger = Some(trigger);

        let ctx = ReadContext {
            conversation: &self.conversation,
            visible: &self.visible,
            current_user_id: &self.current_user_id,
            scroll_offset: self.scroll_offset,
            config: &self.config,
        };
        let commands = self.read_state.on_conversation_updated(&ctx, self.from_notification);
        if commands.contains(&ViewCommand::ClearNotificationReferrer) {
            self.from_notification = false;
        }
        commands
    }

    /// Re-derive the visible list and the boundary from current state.
    fn recompute(&mut self) -> Vec<ViewCommand> {
        let is_offline = self.network.is_offline;
        let visible = filter_visible(self.stream.as_slice(), is_offline, self.conversation.can_write);
        if visible != self.visible {
            self.previous_visible = VisibleSnapshot::from_messages(&self.visible);
            self.visible = visible;
        }

        let earliest_offline_index =
            find_earliest_offline_arrival(&self.visible, &self.network, &self.current_user_id);
        let boundary = resolve_unread_boundary(&BoundaryInputs {
            messages: &self.visible,
            marker_time: self.read_state.marker_time(),
            earliest_offline_index,
            current_user_id: &self.current_user_id,
            previous_visible: &self.previous_visible,
            has_previous_boundary: self.boundary_id.is_some(),
            scroll_offset: self.scroll_offset,
            user_active_since: self.read_state.user_active_since(),
            is_offline,
            msg_visible_threshold: self.config.msg_visible_threshold,
        });

        let newest_created = self.visible.first().map(|m| m.created_at);
        if newest_created != self.previous_newest_created {
            self.previous_newest_created = newest_created;
            self.read_state.advance_marker(newest_created, boundary.is_some());
        }

        if boundary != self.boundary_id {
            tracing::debug!(
                conversation_id = %self.conversation.id,
                previous = ?self.boundary_id,
                boundary = ?boundary,
                "unread boundary changed"
            );
            self.boundary_id = boundary;
        }

        let has_newest = self.has_newest();
        let mut commands = Vec::new();
        if self
            .auto_scroll
            .observe(&self.visible, self.scroll_offset, has_newest, &self.config)
        {
            commands.push(ViewCommand::ScrollToBottom);
        }
        commands
    }
}

impl Drop for ConversationView {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConversationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationView")
            .field("conversation_id", &self.conversation.id)
            .field("boundary_id", &self.boundary_id)
            .field("visible", &self.visible.len())
            .field("scroll_offset", &self.scroll_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: &str = "me";

    fn ts(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn msg(id: &str, ms: i64, author: &str) -> Message {
        Message::new(id, ts(ms), author)
    }

    fn open(conversation: Conversation) -> (ConversationView, SubscriptionRegistry) {
        let registry = SubscriptionRegistry::new();
        let (view, _) = ConversationView::open(
            EngineConfig::default(),
            ME,
            conversation,
            &registry,
            OpenOptions::default(),
            ts(1000),
        );
        (view, registry)
    }

    fn read_conversation() -> Conversation {
        Conversation::new("r1")
            .with_last_read_time(ts(100))
            .with_last_visible_action_created(ts(300))
    }

    #[test]
    fn test_boundary_on_oldest_unread() {
        let (mut view, _registry) = open(read_conversation());
        view.set_messages(vec![
            msg("c", 300, "bob"),
            msg("b", 200, "bob"),
            msg("a", 50, "bob"),
        ]);
        assert_eq!(view.boundary_message_id(), Some("b"));
        assert!(view.has_newest());
    }

    #[test]
    fn test_marker_advances_when_no_boundary() {
        let conv = Conversation::new("r1")
            .with_last_read_time(ts(100))
            .with_last_visible_action_created(ts(1500));
        let (mut view, _registry) = open(conv);
        view.set_messages(vec![msg("a", 50, "bob")]);

        // Arrives while the user watches the newest end: seen, not unread
        view.upsert_message(msg("b", 1500, "bob"));
        assert_eq!(view.boundary_message_id(), None);
        assert_eq!(view.marker_time(), Some(ts(1500)));
    }

    #[test]
    fn test_live_events_arrive_through_subscription() {
        let (mut view, registry) = open(read_conversation());
        view.set_messages(vec![msg("b", 200, "bob"), msg("a", 50, "bob")]);
        assert_eq!(view.boundary_message_id(), Some("b"));

        assert!(registry.publish("r1", &LiveEvent::ReadNewestAnnounced { time: ts(200) }));
        assert!(view.drain_live_events(ts(1100)).is_empty());
        assert_eq!(view.marker_time(), Some(ts(200)));
        assert_eq!(view.boundary_message_id(), None);
    }

    #[test]
    fn test_own_new_action_scrolls_or_opens_newest() {
        let (mut view, _registry) = open(read_conversation());
        view.set_messages(vec![msg("a", 50, "bob")]);
        let own = LiveEvent::NewAction {
            is_from_current_user: true,
        };
        assert_eq!(
            view.on_live_event(&own, ts(1100)),
            vec![ViewCommand::OpenNewest {
                conversation_id: "r1".to_string()
            }]
        );

        view.upsert_message(msg("c", 300, "bob"));
        assert_eq!(view.on_live_event(&own, ts(1100)), vec![ViewCommand::ScrollToBottom]);

        let other = LiveEvent::NewAction {
            is_from_current_user: false,
        };
        assert!(view.on_live_event(&other, ts(1100)).is_empty());
    }

    fn is_mark_read(command: &ViewCommand) -> bool {
        matches!(command, ViewCommand::MarkAsRead { .. })
    }

    #[test]
    fn test_read_time_sync_keeps_mark_unread() {
        let conv = Conversation::new("r1")
            .with_last_read_time(ts(500))
            .with_last_visible_action_created(ts(400));
        let (mut view, _registry) = open(conv);
        view.set_messages(vec![
            msg("d", 400, "bob"),
            msg("c", 300, "bob"),
            msg("b", 200, "bob"),
        ]);
        view.mark_as_unread_from("c");

        // The server echoes the earlier read time back
        let synced = Conversation::new("r1")
            .with_last_read_time(ts(299))
            .with_last_visible_action_created(ts(400));
        let commands = view.update_conversation(synced);
        assert!(!commands.iter().any(is_mark_read));
        assert_eq!(view.boundary_message_id(), Some("c"));

        // A genuinely new action is read as usual
        view.upsert_message(msg("e", 500, "bob"));
        let newer = Conversation::new("r1")
            .with_last_read_time(ts(299))
            .with_last_visible_action_created(ts(500));
        let commands = view.update_conversation(newer);
        assert!(commands.iter().any(is_mark_read));
    }

    #[test]
    fn test_read_time_sync_after_unread_announced() {
        let conv = Conversation::new("r1")
            .with_last_read_time(ts(300))
            .with_last_visible_action_created(ts(300));
        let (mut view, _registry) = open(conv);
        view.set_messages(vec![msg("c", 300, "bob"), msg("b", 200, "bob")]);

        view.on_live_event(&LiveEvent::UnreadAnnounced { time: ts(150) }, ts(1100));
        let synced = Conversation::new("r1")
            .with_last_read_time(ts(150))
            .with_last_visible_action_created(ts(300));
        assert!(!view.update_conversation(synced).iter().any(is_mark_read));
        assert_eq!(view.marker_time(), Some(ts(150)));
    }

    #[test]
    fn test_has_newest_compares_against_thread_newest() {
        let mut conv = read_conversation().with_last_visible_action_created(ts(400));
        conv.transaction_thread_last_visible_action_created = Some(ts(900));
        let (mut view, _registry) = open(conv.clone());
        view.set_messages(vec![msg("b", 400, "bob"), msg("a", 50, "bob")]);
        assert!(!view.has_newest());

        let own = LiveEvent::NewAction {
            is_from_current_user: true,
        };
        assert_eq!(
            view.on_live_event(&own, ts(1100)),
            vec![ViewCommand::OpenNewest {
                conversation_id: "r1".to_string()
            }]
        );

        conv.transaction_thread_last_visible_action_created = None;
        view.update_conversation(conv);
        assert!(view.has_newest());
    }

    #[test]
    fn test_switch_conversation_moves_subscription_and_resets() {
        let (mut view, registry) = open(read_conversation());
        view.set_messages(vec![msg("b", 200, "bob"), msg("a", 50, "bob")]);
        view.on_scroll(600.0);
        assert_eq!(view.boundary_message_id(), Some("b"));

        let other = Conversation::new("r2").with_last_read_time(ts(50));
        view.switch_conversation(other, &registry, ts(2000));

        assert!(!registry.has_subscriber("r1"));
        assert!(registry.has_subscriber("r2"));
        assert!(view.is_subscribed());
        assert_eq!(view.conversation().id, "r2");
        assert_eq!(view.marker_time(), Some(ts(50)));
        assert_eq!(view.user_active_since(), ts(2000));
        assert_eq!(view.boundary_message_id(), None);
        assert!(view.visible_messages().is_empty());

        assert!(registry.publish("r2", &LiveEvent::ReadNewestAnnounced { time: ts(70) }));
        view.drain_live_events(ts(2100));
        assert_eq!(view.marker_time(), Some(ts(70)));
    }

    #[test]
    fn test_close_releases_subscription() {
        let (mut view, registry) = open(read_conversation());
        assert!(view.is_subscribed());
        view.close();
        assert!(!view.is_subscribed());
        assert!(!registry.has_subscriber("r1"));
    }

    #[test]
    fn test_open_from_notification_consumes_referrer() {
        let registry = SubscriptionRegistry::new();
        let (_view, commands) = ConversationView::open(
            EngineConfig::default(),
            ME,
            read_conversation(),
            &registry,
            OpenOptions {
                from_notification: true,
                is_loading_initial: true,
            },
            ts(1000),
        );
        assert_eq!(
            commands,
            vec![
                ViewCommand::MarkAsRead {
                    conversation_id: "r1".to_string()
                },
                ViewCommand::ClearNotificationReferrer,
            ]
        );
    }

    #[test]
    fn test_auto_scroll_when_optimistic_message_dropped() {
        // The optimistic send is not part of the conversation record yet
        let conv = Conversation::new("r1")
            .with_last_read_time(ts(100))
            .with_last_visible_action_created(ts(200));
        let (mut view, _registry) = open(conv);
        view.set_messages(vec![
            msg("opt", 300, ME).optimistic(),
            msg("b", 200, "bob"),
            msg("a", 50, "bob"),
        ]);
        let commands = view.remove_message("opt");
        assert_eq!(commands, vec![ViewCommand::ScrollToBottom]);
    }

    #[test]
    fn test_render_reports_edges_and_affordances() {
        let (mut view, _registry) = open(read_conversation());
        view.set_messages(vec![msg("b", 200, "bob"), msg("a", 50, "bob")]);
        view.set_edge_flags(Edge::Newer, false, true);

        let snapshot = view.render();
        assert_eq!(snapshot.conversation_id, "r1");
        assert_eq!(snapshot.boundary_message_id.as_deref(), Some("b"));
        assert!(snapshot.newer.error);
        assert!(snapshot.header.visible);
        assert!(!snapshot.footer.visible);
        assert!(!snapshot.has_newest);
        // Too few messages loaded for the scroll-to-newer button
        assert!(!snapshot.show_scroll_to_bottom);
        assert_eq!(snapshot.first_visible_message_id.as_deref(), Some("a"));
        assert_eq!(snapshot.visible_count, 2);
    }
}
