#![forbid(unsafe_code)]

//! Reactive store over a nested JSON tree.
//!
//! # Design
//!
//! [`ReactiveStore`] owns a [`TopicRegistry`] and a JSON data tree. At
//! construction every property reachable through object branches is
//! *instrumented*: its canonical path is added to the registry's topic set.
//! [`ReactiveStore::set`] is the explicit accessor pair over those paths —
//! the store maintains the path-addressed mapping itself instead of
//! rewriting properties in place.
//!
//! Setting an observed path runs the invalidation protocol inside the call
//! stack of `set`: descendant topics are discarded (subscriber lists
//! included), the new value's object branches are instrumented, and the
//! registry notifies the path's subscribers with the new value.
//!
//! # State machine
//!
//! A property is *plain* or *observed*. Plain → observed happens only when
//! instrumentation walks over it (construction, `add_data_set`, or an
//! ancestor re-assignment). An observed property stays observed when
//! re-assigned; only `remove_data_set` discards whole subtrees of topics.
//! Keys written through `set` after their container was instrumented are
//! plain until an ancestor is re-assigned.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `PathNotFound` | a segment is missing or not an object | `Err`, fatal to the call |
//! | `DatasetExists` | `add_data_set` on an existing key | `Err`, fatal to the call |
//! | `DatasetNotFound` | `remove_data_set` on a missing key | `Err`, fatal to the call |
//! | `InvalidPath` | malformed path string | `Err`, fatal to the call |
//! | Unknown topic on subscribe/notify | invalidated moments earlier | logged no-op (registry) |

use std::fmt;
use std::rc::Rc;

use pathbus_core::{Event, PathError, Subscriber, TopicPath, TopicRegistry};
use serde_json::{Map, Value};

use crate::config::StoreConfig;

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `add_data_set` on a name that already exists.
    DatasetExists(String),
    /// `remove_data_set` on a name that does not exist.
    DatasetNotFound(String),
    /// A path segment did not resolve against the data tree.
    PathNotFound(TopicPath),
    /// A path string failed to parse.
    InvalidPath(PathError),
    /// The data tree (or a root replacement) was not a JSON object.
    RootNotObject,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatasetExists(name) => write!(f, "dataset '{name}' already exists"),
            Self::DatasetNotFound(name) => write!(f, "dataset '{name}' does not exist"),
            Self::PathNotFound(path) => write!(f, "path '{path}' does not resolve to data"),
            Self::InvalidPath(err) => write!(f, "invalid path: {err}"),
            Self::RootNotObject => write!(f, "store data must be a JSON object"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PathError> for StoreError {
    fn from(err: PathError) -> Self {
        Self::InvalidPath(err)
    }
}

/// What a successful [`ReactiveStore::set`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The new value equals the current one; nothing happened.
    Unchanged,
    /// An observed path changed; subscribers were notified (delivery count).
    Notified(usize),
    /// The path resolves but is not observed; stored as plain data.
    Plain,
}

/// A nested JSON tree whose properties notify subscribers on change.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use pathbus_core::{HandlerRegistry, Subscriber, TopicPath};
/// use pathbus_store::{ReactiveStore, StoreConfig};
/// use serde_json::json;
///
/// let mut store = ReactiveStore::new(
///     StoreConfig::default().with_data(json!({ "x": 1, "y": { "z": 2 } })),
/// )
/// .unwrap();
///
/// // Replace `x` with an object: "/x/a" and "/x/b" become observable.
/// store.set("/x", json!({ "a": 1, "b": 2 })).unwrap();
///
/// let seen: Rc<dyn Subscriber> = Rc::new(HandlerRegistry::new().with_handler(
///     TopicPath::parse("/x/a").unwrap(),
///     |_topic, event| Some(event.clone()),
/// ));
/// store.subscribe("/x/a", &seen, false);
///
/// store.set("/x/a", json!(7)).unwrap();
/// assert_eq!(store.get("/x/a").unwrap(), &json!(7));
/// ```
pub struct ReactiveStore {
    registry: TopicRegistry,
    /// Invariant: always a `Value::Object`.
    data: Value,
    version: u64,
}

impl ReactiveStore {
    /// Build a store from `config`, instrumenting the initial tree.
    ///
    /// Fails with [`StoreError::RootNotObject`] when the configured data is
    /// not a JSON object.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let data = config
            .data
            .unwrap_or_else(|| Value::Object(Map::new()));
        if !data.is_object() {
            return Err(StoreError::RootNotObject);
        }
        let mut registry = TopicRegistry::new();
        let root = TopicPath::root();
        registry.add_topic(&root);
        Self::instrument(&mut registry, &root, &data);
        Ok(Self {
            registry,
            data,
            version: 0,
        })
    }

    /// Build a store directly from an initial tree.
    pub fn with_data(data: Value) -> Result<Self, StoreError> {
        Self::new(StoreConfig::new().with_data(data))
    }

    /// Resolve `path` against the data tree.
    ///
    /// Fails with [`StoreError::PathNotFound`] when any segment —
    /// intermediate or final — is missing or indexes into a non-object.
    /// `get("/")` returns the whole tree.
    pub fn get(&self, path: &str) -> Result<&Value, StoreError> {
        let topic = TopicPath::parse(path)?;
        Self::resolve(&self.data, &topic)
    }

    /// Assign `value` at `path`.
    ///
    /// For an observed path this is the reactive protocol: a value-equal
    /// assignment is a complete no-op; otherwise descendant topics are
    /// invalidated (their subscriber lists discarded), the new value's
    /// object branches are instrumented, and subscribers of `path` are
    /// notified with the new value. Setting `"/"` replaces the whole tree
    /// (the replacement must be an object).
    ///
    /// A path that resolves but was never instrumented is written as plain
    /// data: no topics, no notification.
    pub fn set(&mut self, path: &str, value: Value) -> Result<SetOutcome, StoreError> {
        let topic = TopicPath::parse(path)?;
        let (Some(parent), Some(leaf)) = (topic.parent(), topic.leaf()) else {
            return self.replace_root(value);
        };
        let key = leaf.to_string();
        let observed = self.registry.has_topic(&topic);

        let container = Self::resolve_object_mut(&mut self.data, &parent, &topic)?;
        if !observed {
            container.insert(key, value);
            tracing::debug!(path = %topic, "plain write to unobserved path");
            return Ok(SetOutcome::Plain);
        }
        if container.get(&key).is_some_and(|current| *current == value) {
            return Ok(SetOutcome::Unchanged);
        }
        container.insert(key, value);

        self.registry.invalidate_subtree(&topic, false);
        let current = Self::resolve(&self.data, &topic)?;
        Self::instrument(&mut self.registry, &topic, current);
        self.version += 1;
        let delivered = self.registry.notify(&topic, current);
        Ok(SetOutcome::Notified(delivered))
    }

    /// Add a named top-level dataset and instrument its subtree.
    ///
    /// `name` may be written with or without the leading `/`. `data`
    /// defaults to an empty object. Fails with [`StoreError::DatasetExists`]
    /// when the key is already present.
    pub fn add_data_set(&mut self, name: &str, data: Option<Value>) -> Result<(), StoreError> {
        let key = name.strip_prefix('/').unwrap_or(name);
        let topic = TopicPath::root().child(key)?;

        let Value::Object(root) = &mut self.data else {
            return Err(StoreError::RootNotObject);
        };
        if root.contains_key(key) {
            return Err(StoreError::DatasetExists(key.to_string()));
        }
        let value = data.unwrap_or_else(|| Value::Object(Map::new()));
        root.insert(key.to_string(), value);

        self.registry.add_topic(&topic);
        let current = Self::resolve(&self.data, &topic)?;
        Self::instrument(&mut self.registry, &topic, current);
        self.version += 1;
        Ok(())
    }

    /// Remove a named top-level dataset, discarding its topics and their
    /// subscribers.
    ///
    /// Fails with [`StoreError::DatasetNotFound`] when the key is absent.
    pub fn remove_data_set(&mut self, name: &str) -> Result<(), StoreError> {
        let key = name.strip_prefix('/').unwrap_or(name);
        let topic = TopicPath::root().child(key)?;

        let Value::Object(root) = &self.data else {
            return Err(StoreError::RootNotObject);
        };
        if !root.contains_key(key) {
            return Err(StoreError::DatasetNotFound(key.to_string()));
        }

        self.registry.invalidate_subtree(&topic, true);
        if let Value::Object(root) = &mut self.data {
            root.remove(key);
        }
        self.version += 1;
        Ok(())
    }

    /// Register `subscriber` for notifications on `topic`.
    ///
    /// Malformed and unknown topics are logged no-ops (see
    /// [`TopicRegistry::subscribe`]).
    pub fn subscribe(&mut self, topic: &str, subscriber: &Rc<dyn Subscriber>, once: bool) {
        match TopicPath::parse(topic) {
            Ok(parsed) => self.registry.subscribe(&parsed, subscriber, once),
            Err(error) => {
                tracing::warn!(topic, error = %error, "subscribe with malformed topic ignored");
            }
        }
    }

    /// Remove `subscriber` from `topic`'s lists (both lists when
    /// `once == false`, only the one-shot list when `once == true`).
    pub fn unsubscribe(&mut self, topic: &str, subscriber: &Rc<dyn Subscriber>, once: bool) {
        match TopicPath::parse(topic) {
            Ok(parsed) => self.registry.unsubscribe(&parsed, subscriber, once),
            Err(error) => {
                tracing::warn!(topic, error = %error, "unsubscribe with malformed topic ignored");
            }
        }
    }

    /// Deliver `event` to `topic`'s subscribers. Returns the delivery count.
    pub fn notify(&mut self, topic: &str, event: &Event) -> usize {
        match TopicPath::parse(topic) {
            Ok(parsed) => self.registry.notify(&parsed, event),
            Err(error) => {
                tracing::warn!(topic, error = %error, "notify with malformed topic ignored");
                0
            }
        }
    }

    /// Whether `path` parses and is currently an observed topic.
    #[must_use]
    pub fn has_topic(&self, path: &str) -> bool {
        TopicPath::parse(path).is_ok_and(|topic| self.registry.has_topic(&topic))
    }

    /// Number of observed topics (the root topic included).
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.registry.topic_count()
    }

    /// The whole data tree.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Monotonic mutation counter: increments once per effective mutation.
    /// Useful for dirty-checking in render loops.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The owned topic registry.
    #[must_use]
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Mutable access to the owned topic registry.
    pub fn registry_mut(&mut self) -> &mut TopicRegistry {
        &mut self.registry
    }

    /// Replace the whole tree: invalidate every descendant topic,
    /// instrument the replacement, notify the root topic.
    fn replace_root(&mut self, value: Value) -> Result<SetOutcome, StoreError> {
        if !value.is_object() {
            return Err(StoreError::RootNotObject);
        }
        if self.data == value {
            return Ok(SetOutcome::Unchanged);
        }
        self.data = value;

        let root = TopicPath::root();
        self.registry.invalidate_subtree(&root, false);
        Self::instrument(&mut self.registry, &root, &self.data);
        self.version += 1;
        let delivered = self.registry.notify(&root, &self.data);
        Ok(SetOutcome::Notified(delivered))
    }

    /// Register topics for every property of `value`'s object branches,
    /// rooted at `parent`. Arrays and scalars are leaves. Keys that cannot
    /// form a path segment stay plain data.
    fn instrument(registry: &mut TopicRegistry, parent: &TopicPath, value: &Value) {
        let Some(map) = value.as_object() else {
            return;
        };
        for (key, child_value) in map {
            match parent.child(key) {
                Ok(child) => {
                    registry.add_topic(&child);
                    Self::instrument(registry, &child, child_value);
                }
                Err(error) => {
                    tracing::warn!(
                        parent = %parent,
                        key = key.as_str(),
                        error = %error,
                        "key not observable; left as plain data"
                    );
                }
            }
        }
    }

    /// Walk `topic`'s segments from `root`.
    fn resolve<'a>(root: &'a Value, topic: &TopicPath) -> Result<&'a Value, StoreError> {
        let mut current = root;
        for segment in topic.segments() {
            current = current
                .as_object()
                .and_then(|map| map.get(segment))
                .ok_or_else(|| StoreError::PathNotFound(topic.clone()))?;
        }
        Ok(current)
    }

    /// Walk to the object at `parent`, reporting failures against `full`.
    fn resolve_object_mut<'a>(
        root: &'a mut Value,
        parent: &TopicPath,
        full: &TopicPath,
    ) -> Result<&'a mut Map<String, Value>, StoreError> {
        let mut current = root;
        for segment in parent.segments() {
            current = current
                .as_object_mut()
                .and_then(|map| map.get_mut(segment))
                .ok_or_else(|| StoreError::PathNotFound(full.clone()))?;
        }
        current
            .as_object_mut()
            .ok_or_else(|| StoreError::PathNotFound(full.clone()))
    }
}

impl Default for ReactiveStore {
    fn default() -> Self {
        let mut registry = TopicRegistry::new();
        registry.add_topic(&TopicPath::root());
        Self {
            registry,
            data: Value::Object(Map::new()),
            version: 0,
        }
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("version", &self.version)
            .field("topic_count", &self.registry.topic_count())
            .finish_non_exhaustive()
    }
}
