#![forbid(unsafe_code)]

//! Topic registry with persistent and one-shot subscriber lists.
//!
//! # Design
//!
//! [`TopicRegistry`] owns the [`TopicSet`] of subscribable paths plus two
//! maps from topic to ordered subscriber list. Subscribers are held as
//! `Rc<dyn Subscriber>`; identity is pointer identity, so subscribing the
//! same handle twice is a no-op while two distinct handles over equal state
//! are two subscribers.
//!
//! Delivery is synchronous and ordered: the persistent list first, then the
//! one-shot list, each in registration order. Both lists are snapshotted
//! before the first `receive` call, so a notification in flight always
//! completes against the lists as they stood when it began.
//!
//! # Invariants
//!
//! 1. Subscribe and notify on a path outside the topic set are logged
//!    no-ops; they never panic and never deliver.
//! 2. No subscriber appears twice in one list for one topic.
//! 3. A one-shot subscriber is consumed by the delivery that reaches it.
//! 4. Invalidating a subtree discards the subscriber lists of every removed
//!    topic; a topic re-created later starts with no subscribers.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown topic on subscribe | topic not in set | debug log, no-op |
//! | Unknown topic on unsubscribe | topic not in set | warn log, no-op |
//! | Unknown topic on notify | topic not in set | warn log, 0 deliveries |

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::path::TopicPath;
use crate::subscriber::{Event, Subscriber};
use crate::topic_set::TopicSet;

type SubscriberList = Vec<Rc<dyn Subscriber>>;

/// Publish/subscribe registry over a set of topic paths.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use pathbus_core::{HandlerRegistry, Subscriber, TopicPath, TopicRegistry};
///
/// let topic = TopicPath::parse("/ticker").unwrap();
/// let mut registry = TopicRegistry::with_topics([topic.clone()]);
///
/// let handlers: Rc<dyn Subscriber> =
///     Rc::new(HandlerRegistry::new().with_handler(topic.clone(), |_, _| None));
/// registry.subscribe(&topic, &handlers, false);
/// assert_eq!(registry.notify(&topic, &serde_json::json!(1)), 1);
/// ```
#[derive(Default)]
pub struct TopicRegistry {
    topics: TopicSet,
    persistent: HashMap<TopicPath, SubscriberList>,
    one_shot: HashMap<TopicPath, SubscriberList>,
}

impl TopicRegistry {
    /// Create an empty registry with no subscribable topics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-seeded with subscribable topics.
    #[must_use]
    pub fn with_topics(topics: impl IntoIterator<Item = TopicPath>) -> Self {
        let mut registry = Self::new();
        for topic in topics {
            registry.topics.insert(&topic);
        }
        registry
    }

    /// Make `topic` subscribable. Returns `true` if it was new.
    pub fn add_topic(&mut self, topic: &TopicPath) -> bool {
        self.topics.insert(topic)
    }

    /// Whether `topic` is subscribable.
    #[must_use]
    pub fn has_topic(&self, topic: &TopicPath) -> bool {
        self.topics.contains(topic)
    }

    /// Number of subscribable topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// All subscribable topics in lexicographic segment order.
    #[must_use]
    pub fn topics(&self) -> Vec<TopicPath> {
        self.topics.topics()
    }

    /// Register `subscriber` for notifications on `topic`.
    ///
    /// Unknown topics are silently ignored (debug-logged): subscribing to a
    /// topic invalidated moments earlier is an expected race, not an error.
    /// Re-subscribing the same handle to the same topic and mode is a no-op.
    pub fn subscribe(&mut self, topic: &TopicPath, subscriber: &Rc<dyn Subscriber>, once: bool) {
        if !self.topics.contains(topic) {
            tracing::debug!(topic = %topic, "subscribe to unknown topic ignored");
            return;
        }
        let list = self
            .list_mut(once)
            .entry(topic.clone())
            .or_default();
        if !list.iter().any(|s| Rc::ptr_eq(s, subscriber)) {
            list.push(Rc::clone(subscriber));
        }
    }

    /// Remove `subscriber` from `topic`'s lists.
    ///
    /// With `once == false` the subscriber is removed from **both** lists;
    /// with `once == true` only from the one-shot list. Unknown topics are
    /// a recoverable error: logged, and the call is a no-op.
    pub fn unsubscribe(&mut self, topic: &TopicPath, subscriber: &Rc<dyn Subscriber>, once: bool) {
        if !self.topics.contains(topic) {
            tracing::warn!(topic = %topic, "unsubscribe from unknown topic");
            return;
        }
        if !once {
            Self::remove_from(self.persistent.get_mut(topic), subscriber);
        }
        Self::remove_from(self.one_shot.get_mut(topic), subscriber);
    }

    /// Deliver `event` to every subscriber of `topic`. Returns the number
    /// of deliveries made.
    ///
    /// Persistent subscribers are invoked first, then one-shot subscribers,
    /// each group in registration order. Every one-shot subscriber reached
    /// is unsubscribed by this call. Unknown topics are a recoverable
    /// error: logged, zero deliveries.
    pub fn notify(&mut self, topic: &TopicPath, event: &Event) -> usize {
        if !self.topics.contains(topic) {
            tracing::warn!(topic = %topic, "notify on unknown topic");
            return 0;
        }
        // Snapshot both lists before the first receive() call.
        let persistent: SubscriberList = self.persistent.get(topic).cloned().unwrap_or_default();
        let one_shot: SubscriberList = self.one_shot.remove(topic).unwrap_or_default();

        let mut delivered = 0;
        for subscriber in &persistent {
            subscriber.receive(topic, event);
            delivered += 1;
        }
        for subscriber in &one_shot {
            subscriber.receive(topic, event);
            delivered += 1;
        }
        delivered
    }

    /// Remove every topic below `path` (and `path` itself when
    /// `include_root` is set), discarding the subscriber lists of each
    /// removed topic. Returns the number of topics removed.
    pub fn invalidate_subtree(&mut self, path: &TopicPath, include_root: bool) -> usize {
        let removed = self.topics.remove_subtree(path, include_root);
        for topic in &removed {
            self.persistent.remove(topic);
            self.one_shot.remove(topic);
        }
        if !removed.is_empty() {
            tracing::debug!(path = %path, count = removed.len(), "invalidated topic subtree");
        }
        removed.len()
    }

    /// Number of persistent subscribers registered on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &TopicPath) -> usize {
        self.persistent.get(topic).map_or(0, Vec::len)
    }

    /// Number of one-shot subscribers registered on `topic`.
    #[must_use]
    pub fn once_subscriber_count(&self, topic: &TopicPath) -> usize {
        self.one_shot.get(topic).map_or(0, Vec::len)
    }

    fn list_mut(&mut self, once: bool) -> &mut HashMap<TopicPath, SubscriberList> {
        if once { &mut self.one_shot } else { &mut self.persistent }
    }

    fn remove_from(list: Option<&mut SubscriberList>, subscriber: &Rc<dyn Subscriber>) {
        if let Some(list) = list {
            list.retain(|s| !Rc::ptr_eq(s, subscriber));
        }
    }
}

impl fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("topic_count", &self.topics.len())
            .field("persistent_lists", &self.persistent.len())
            .field("one_shot_lists", &self.one_shot.len())
            .finish_non_exhaustive()
    }
}
