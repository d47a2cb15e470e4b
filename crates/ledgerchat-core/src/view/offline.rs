//! Messages that arrived while the client was offline.

use crate::models::{Message, NetworkStatus};

/// Whether `message` was written by someone else during the last offline
/// window.
pub fn was_received_while_offline(
    message: &Message,
    network: &NetworkStatus,
    current_user_id: &str,
) -> bool {
    !message.is_authored_by(current_user_id) && network.was_offline_at(message.created_at)
}

/// Index (into `messages`) of the earliest-created offline arrival.
///
/// The unread marker should start at that message when the user reconnects.
/// Ties on `created_at` resolve to the older list position (higher index).
/// Instants are compared in UTC, so the viewer's locale cannot reorder them.
pub fn find_earliest_offline_arrival(
    messages: &[Message],
    network: &NetworkStatus,
    current_user_id: &str,
) -> Option<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| was_received_while_offline(m, network, current_user_id))
        .min_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ib.cmp(ia)))
        .map(|(index, _)| index)
}
