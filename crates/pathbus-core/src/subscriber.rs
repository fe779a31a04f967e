#![forbid(unsafe_code)]

//! The subscriber capability and handler-table dispatch.
//!
//! Anything that wants notifications implements [`Subscriber`]: a single
//! `receive(topic, event)` entry point. Persistent versus one-shot is a
//! property of the subscription, not of the subscriber type.
//!
//! [`HandlerRegistry`] is the stock implementation: a table mapping topic
//! paths to handler closures, invoked with `(topic, event)`. Receiving a
//! topic with no mapped handler yields `None`.

use std::collections::HashMap;
use std::fmt;

use crate::path::TopicPath;

/// Notification payload: the value at the notified path.
pub type Event = serde_json::Value;

/// A handler closure dispatched by [`HandlerRegistry`].
pub type Handler = Box<dyn Fn(&TopicPath, &Event) -> Option<Event>>;

/// The capability any notification receiver implements.
///
/// `receive` takes `&self`: subscribers keep their own state behind interior
/// mutability (`Cell`/`RefCell`), which is what keeps delivery re-entrancy
/// out of the registry's hands.
pub trait Subscriber {
    /// Handle a notification for `topic`. The return value is the handler's
    /// result, or `None` when the subscriber has nothing to say.
    fn receive(&self, topic: &TopicPath, event: &Event) -> Option<Event>;
}

/// Table-dispatch subscriber: topic path → handler closure.
///
/// # Example
///
/// ```
/// use pathbus_core::{HandlerRegistry, Subscriber, TopicPath};
///
/// let handlers = HandlerRegistry::new().with_handler(
///     TopicPath::parse("/x/a").unwrap(),
///     |_topic, event| Some(event.clone()),
/// );
/// let topic = TopicPath::parse("/x/a").unwrap();
/// let echoed = handlers.receive(&topic, &serde_json::json!(1));
/// assert_eq!(echoed, Some(serde_json::json!(1)));
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TopicPath, Handler>,
}

impl HandlerRegistry {
    /// Create an empty handler table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `topic`, replacing any previous one.
    pub fn insert(
        &mut self,
        topic: TopicPath,
        handler: impl Fn(&TopicPath, &Event) -> Option<Event> + 'static,
    ) {
        self.handlers.insert(topic, Box::new(handler));
    }

    /// Builder: register a handler.
    #[must_use]
    pub fn with_handler(
        mut self,
        topic: TopicPath,
        handler: impl Fn(&TopicPath, &Event) -> Option<Event> + 'static,
    ) -> Self {
        self.insert(topic, handler);
        self
    }

    /// Remove the handler for `topic`. Returns whether one was present.
    pub fn remove(&mut self, topic: &TopicPath) -> bool {
        self.handlers.remove(topic).is_some()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Subscriber for HandlerRegistry {
    fn receive(&self, topic: &TopicPath, event: &Event) -> Option<Event> {
        self.handlers.get(topic).and_then(|h| h(topic, event))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handler_count", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
