#![forbid(unsafe_code)]

//! Topic pub/sub core for Pathbus.
//!
//! This crate provides the publish/subscribe half of the Pathbus reactive
//! store:
//!
//! - [`TopicPath`]: canonical `/`-separated paths addressing locations in a
//!   data tree.
//! - [`TopicSet`]: the set of subscribable paths, stored as a segment trie.
//! - [`Subscriber`]: the capability any notification receiver implements,
//!   with [`HandlerRegistry`] as the stock table-dispatch implementation.
//! - [`TopicRegistry`]: persistent and one-shot subscriber lists per topic,
//!   with synchronous, ordered delivery.
//!
//! # Architecture
//!
//! Everything here is single-threaded and synchronous. Subscribers are held
//! as `Rc<dyn Subscriber>`; subscriber identity is pointer identity, which
//! is what makes re-subscribing the same handle idempotent. Delivery
//! snapshots the subscriber list before the first `receive` call, so a
//! notification in flight always completes against the list as it stood
//! when the notification began.
//!
//! # Invariants
//!
//! 1. A path must be a member of the topic set before subscribe or notify
//!    on it is accepted; operations on unknown topics are logged no-ops.
//! 2. No subscriber appears twice in one list for one topic.
//! 3. Persistent subscribers are notified strictly before one-shot
//!    subscribers, each group in registration order.
//! 4. A one-shot subscriber is removed by the delivery that reaches it.

/// Canonical topic paths and path errors.
pub mod path;
/// Persistent/one-shot subscriber lists and notification delivery.
pub mod registry;
/// The subscriber capability and handler-table dispatch.
pub mod subscriber;
/// Segment-trie set of subscribable paths.
pub mod topic_set;

pub use path::{PathError, TopicPath};
pub use registry::TopicRegistry;
pub use subscriber::{Event, Handler, HandlerRegistry, Subscriber};
pub use topic_set::TopicSet;
