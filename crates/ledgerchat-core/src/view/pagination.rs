//! Pagination boundaries at both ends of the message list.
//!
//! Loading and error flags come from the external page loader; this module
//! only maps them to boundary UI state and decides whether a page request
//! should go out at all. It never retries on its own.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{Message, MessageKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Edge {
    /// Older history, rendered as the list footer
    Older,
    /// Newer messages, rendered as the list header
    Newer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryState {
    Idle,
    Loading,
    Error,
}

impl BoundaryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, BoundaryState::Loading)
    }

    pub fn has_error(&self) -> bool {
        matches!(self, BoundaryState::Error)
    }
}

/// Loader-reported flags for one edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStatus {
    pub loading: bool,
    pub error: bool,
}

impl EdgeStatus {
    pub fn state(&self) -> BoundaryState {
        if self.loading {
            BoundaryState::Loading
        } else if self.error {
            BoundaryState::Error
        } else {
            BoundaryState::Idle
        }
    }
}

/// A page the loader should fetch, anchored at the edge-most loaded message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub edge: Edge,
    /// Explicit retry; bypasses the error and offline guards
    pub force: bool,
    pub anchor_message_id: String,
}

/// Whether and how to draw the loader at one end of the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryLoader {
    pub visible: bool,
    pub state: BoundaryState,
}

/// List facts the request guards depend on.
#[derive(Debug, Clone, Copy)]
pub struct PaginationContext<'a> {
    /// Raw (unfiltered) messages, newest first
    pub messages: &'a [Message],
    pub is_offline: bool,
    /// The newest loaded message is the conversation's newest action
    pub has_newest: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PaginationBoundaries {
    older: EdgeStatus,
    newer: EdgeStatus,
    is_loading_initial: bool,
    footer_rendered: bool,
    header_rendered: bool,
}

impl PaginationBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    fn edge_mut(&mut self, edge: Edge) -> &mut EdgeStatus {
        match edge {
            Edge::Older => &mut self.older,
            Edge::Newer => &mut self.newer,
        }
    }

    // ===== Loader flags =====

    pub fn set_edge_flags(&mut self, edge: Edge, loading: bool, error: bool) {
        *self.edge_mut(edge) = EdgeStatus { loading, error };
    }

    pub fn set_loading_initial(&mut self, loading: bool) {
        self.is_loading_initial = loading;
    }

    pub fn is_loading_initial(&self) -> bool {
        self.is_loading_initial
    }

    pub fn edge_status(&self, edge: Edge) -> EdgeStatus {
        match edge {
            Edge::Older => self.older,
            Edge::Newer => self.newer,
        }
    }

    pub fn edge_state(&self, edge: Edge) -> BoundaryState {
        self.edge_status(edge).state()
    }

    // ===== Requests =====

    /// Decide whether a page request for `edge` should go out.
    ///
    /// Non-forced requests come from the list reaching an edge and are
    /// dropped while offline or after an error; a forced request is an
    /// explicit retry. Nothing goes out while the edge or the initial load
    /// is in flight, or when there is nothing more to fetch at that end.
    pub fn request_more(
        &self,
        edge: Edge,
        force: bool,
        ctx: &PaginationContext<'_>,
    ) -> Option<PageRequest> {
        let status = self.edge_status(edge);
        if status.loading || self.is_loading_initial {
            return None;
        }
        if !force && (status.error || ctx.is_offline) {
            return None;
        }

        let anchor = match edge {
            Edge::Older => {
                let oldest = ctx.messages.last()?;
                // Already at the beginning of the history
                if oldest.kind == MessageKind::Created {
                    return None;
                }
                oldest
            }
            Edge::Newer => {
                let newest = ctx.messages.first()?;
                if ctx.has_newest || (!force && newest.is_pending_delete()) {
                    return None;
                }
                newest
            }
        };

        tracing::debug!(?edge, force, anchor = %anchor.id, "requesting page");
        Some(PageRequest {
            edge,
            force,
            anchor_message_id: anchor.id.clone(),
        })
    }

    /// Retry after an error reported at `edge`.
    pub fn retry(&self, edge: Edge, ctx: &PaginationContext<'_>) -> Option<PageRequest> {
        self.request_more(edge, true, ctx)
    }

    // ===== Boundary loaders =====

    /// Footer (older edge) loader.
    ///
    /// Skipped on the first render while online: it is not yet known whether
    /// more history will load, so a skeleton would be misleading. Errors
    /// always show.
    pub fn footer(&mut self, is_offline: bool) -> BoundaryLoader {
        let state = self.older.state();
        if !is_offline && !self.footer_rendered && !self.older.error {
            self.footer_rendered = true;
            return BoundaryLoader { visible: false, state };
        }
        BoundaryLoader { visible: true, state }
    }

    /// Header (newer edge) loader: shown once offline or after its first
    /// render, and always on error.
    pub fn header(&mut self, is_offline: bool) -> BoundaryLoader {
        let state = self.newer.state();
        let can_show = is_offline || self.header_rendered;
        if !can_show && !self.newer.error {
            self.header_rendered = true;
            return BoundaryLoader { visible: false, state };
        }
        BoundaryLoader { visible: true, state }
    }

    /// Whether the "scroll to newer messages" affordance may show.
    ///
    /// A linked-message load starts with a small window; until more than
    /// `min_messages_for_newer_affordance` messages are loaded the button
    /// would only flicker.
    pub fn can_scroll_to_newer(&self, ctx: &PaginationContext<'_>, config: &EngineConfig) -> bool {
        let newest_pending_delete = ctx.messages.first().is_some_and(|m| m.is_pending_delete());
        !self.is_loading_initial
            && !ctx.has_newest
            && ctx.messages.len() > config.min_messages_for_newer_affordance
            && !newest_pending_delete
    }
}

/// Follows the list to the bottom when its newest end changes under a user
/// sitting near the bottom.
#[derive(Debug, Clone, Default)]
pub struct AutoScrollTracker {
    previous_newest_id: Option<String>,
    previous_len: usize,
}

impl AutoScrollTracker {
    /// Record the current visible list; returns whether to scroll to bottom.
    pub fn observe(
        &mut self,
        visible: &[Message],
        scroll_offset: f64,
        has_newest: bool,
        config: &EngineConfig,
    ) -> bool {
        let newest_id = visible.first().map(|m| m.id.clone());
        let should_scroll = scroll_offset < config.autoscroll_to_top_threshold
            && self.previous_newest_id != newest_id
            && self.previous_len > visible.len()
            && has_newest;

        self.previous_newest_id = newest_id;
        self.previous_len = visible.len();
        should_scroll
    }
}
