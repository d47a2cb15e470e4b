use std::cmp::Ordering;

use super::Message;

/// Ordered message list for one conversation, newest first.
///
/// This is the order the inverted list renders in: index 0 is the newest
/// message and the last index is the oldest loaded one.
#[derive(Debug, Clone, Default)]
pub struct MessageStream {
    messages: Vec<Message>,
}

/// Newest first; equal timestamps fall back to id so the order is total.
fn view_order(a: &Message, b: &Message) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

impl MessageStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary batch, coalescing duplicate ids (last wins).
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut stream = Self::new();
        stream.extend(messages);
        stream
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    // ===== Getters =====

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn newest(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn oldest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    // ===== Mutations =====

    /// Insert or replace by id.
    ///
    /// A confirmed message replacing its optimistic version keeps the same
    /// id, so it keeps its identity even if the server moved its timestamp.
    pub fn upsert(&mut self, message: Message) {
        if let Some(pos) = self.messages.iter().position(|m| m.id == message.id) {
            self.messages.remove(pos);
        }
        let pos = self
            .messages
            .partition_point(|m| view_order(m, &message) == Ordering::Less);
        self.messages.insert(pos, message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            self.upsert(message);
        }
    }

    /// Add a page of older history.
    pub fn prepend_older_page(&mut self, page: impl IntoIterator<Item = Message>) {
        self.extend(page);
    }

    /// Add a page of newer messages.
    pub fn append_newer_page(&mut self, page: impl IntoIterator<Item = Message>) {
        self.extend(page);
    }

    pub fn remove(&mut self, id: &str) -> Option<Message> {
        let pos = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;

    fn msg(id: &str, ms: i64) -> Message {
        Message::new(id, Timestamp::from_millis(ms), "alice")
    }

    fn ids(stream: &MessageStream) -> Vec<&str> {
        stream.as_slice().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_newest_first_order() {
        let stream = MessageStream::from_messages([msg("a", 1), msg("c", 3), msg("b", 2)]);
        assert_eq!(ids(&stream), vec!["c", "b", "a"]);
        assert_eq!(stream.newest().unwrap().id, "c");
        assert_eq!(stream.oldest().unwrap().id, "a");
    }

    #[test]
    fn test_duplicate_ids_coalesce_to_latest_version() {
        let mut stream = MessageStream::from_messages([msg("a", 1), msg("b", 2).optimistic()]);

        // Server confirms "b" with a later timestamp
        stream.upsert(msg("b", 5));

        assert_eq!(stream.len(), 2);
        let b = stream.get("b").unwrap();
        assert!(!b.is_optimistic);
        assert_eq!(b.created_at, Timestamp::from_millis(5));
        assert_eq!(ids(&stream), vec!["b", "a"]);
    }

    #[test]
    fn test_pages_merge_in_order() {
        let mut stream = MessageStream::from_messages([msg("m5", 5), msg("m6", 6)]);
        stream.prepend_older_page([msg("m1", 1), msg("m2", 2)]);
        stream.append_newer_page([msg("m9", 9)]);
        assert_eq!(ids(&stream), vec!["m9", "m6", "m5", "m2", "m1"]);
    }

    #[test]
    fn test_equal_timestamps_order_by_id() {
        let stream = MessageStream::from_messages([msg("a", 1), msg("b", 1)]);
        assert_eq!(ids(&stream), vec!["b", "a"]);
    }

    #[test]
    fn test_remove() {
        let mut stream = MessageStream::from_messages([msg("a", 1), msg("b", 2)]);
        assert!(stream.remove("a").is_some());
        assert!(stream.remove("a").is_none());
        assert_eq!(ids(&stream), vec!["b"]);
    }
}
