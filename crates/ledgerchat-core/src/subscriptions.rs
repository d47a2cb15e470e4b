//! Process-wide registry of live-event subscriptions, keyed by conversation.
//!
//! At most one subscriber per conversation id. Acquiring an id that is
//! already held supersedes the previous holder; a superseded handle that is
//! released later leaves the new holder in place.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::events::LiveEvent;

type Handler = Arc<dyn Fn(&LiveEvent) + Send + Sync>;

struct Entry {
    token: u64,
    handler: Handler,
}

#[derive(Default)]
struct Inner {
    next_token: u64,
    entries: HashMap<String, Entry>,
}

#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<Mutex<Inner>>,
}

static GLOBAL: OnceLock<SubscriptionRegistry> = OnceLock::new();

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every view in the process.
    pub fn global() -> &'static SubscriptionRegistry {
        GLOBAL.get_or_init(SubscriptionRegistry::new)
    }

    /// Register `handler` as the sole subscriber for `conversation_id`.
    pub fn acquire<F>(&self, conversation_id: &str, handler: F) -> Subscription
    where
        F: Fn(&LiveEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.next_token += 1;
        let token = inner.next_token;

        let previous = inner.entries.insert(
            conversation_id.to_string(),
            Entry {
                token,
                handler: Arc::new(handler),
            },
        );
        if previous.is_some() {
            tracing::info!(conversation_id, "superseding existing live-event subscription");
        } else {
            tracing::debug!(conversation_id, "live-event subscription acquired");
        }

        Subscription {
            registry: self.clone(),
            conversation_id: conversation_id.to_string(),
            token,
            released: false,
        }
    }

    /// Deliver `event` to the subscriber for `conversation_id`.
    ///
    /// Returns false when nobody is subscribed. The handler runs outside the
    /// registry lock so it may acquire or release subscriptions itself.
    pub fn publish(&self, conversation_id: &str, event: &LiveEvent) -> bool {
        let handler = {
            let inner = self.inner.lock();
            inner.entries.get(conversation_id).map(|entry| entry.handler.clone())
        };

        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => {
                tracing::warn!(conversation_id, ?event, "no subscriber for live event");
                false
            }
        }
    }

    pub fn has_subscriber(&self, conversation_id: &str) -> bool {
        self.inner.lock().entries.contains_key(conversation_id)
    }

    fn release(&self, conversation_id: &str, token: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.get(conversation_id) {
            Some(entry) if entry.token == token => {
                inner.entries.remove(conversation_id);
                tracing::debug!(conversation_id, "live-event subscription released");
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SubscriptionRegistry")
            .field("subscribers", &inner.entries.len())
            .finish()
    }
}

/// Handle to one registration. Released on drop.
#[derive(Debug)]
pub struct Subscription {
    registry: SubscriptionRegistry,
    conversation_id: String,
    token: u64,
    released: bool,
}

impl Subscription {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Whether this handle is still the registered subscriber.
    pub fn is_active(&self) -> bool {
        if self.released {
            return false;
        }
        let inner = self.registry.inner.lock();
        inner
            .entries
            .get(&self.conversation_id)
            .is_some_and(|entry| entry.token == self.token)
    }

    /// Unregister. A no-op if this handle was already superseded.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.registry.release(&self.conversation_id, self.token);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&LiveEvent) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move |_: &LiveEvent| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn event() -> LiveEvent {
        LiveEvent::NewAction {
            is_from_current_user: false,
        }
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let registry = SubscriptionRegistry::new();
        let (count, handler) = counter();
        let _sub = registry.acquire("r1", handler);

        assert!(registry.publish("r1", &event()));
        assert!(!registry.publish("r2", &event()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_acquire_supersedes_previous_holder() {
        let registry = SubscriptionRegistry::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();

        let mut old = registry.acquire("r1", first);
        let new = registry.acquire("r1", second);
        assert!(!old.is_active());
        assert!(new.is_active());

        // Releasing the superseded handle must not drop the new one
        old.release();
        assert!(registry.has_subscriber("r1"));

        registry.publish("r1", &event());
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let registry = SubscriptionRegistry::new();
        let (_, handler) = counter();
        {
            let _sub = registry.acquire("r1", handler);
            assert!(registry.has_subscriber("r1"));
        }
        assert!(!registry.has_subscriber("r1"));
    }

    #[test]
    fn test_global_is_shared() {
        let a = SubscriptionRegistry::global();
        let b = SubscriptionRegistry::global();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }

    #[test]
    fn test_handler_may_touch_registry() {
        let registry = SubscriptionRegistry::new();
        let inner = registry.clone();
        let _sub = registry.acquire("r1", move |_| {
            assert!(inner.has_subscriber("r1"));
        });
        assert!(registry.publish("r1", &event()));
    }
}
