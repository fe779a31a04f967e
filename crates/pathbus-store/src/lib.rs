#![forbid(unsafe_code)]

//! Reactive path-addressed data store for Pathbus.
//!
//! [`ReactiveStore`] wraps a nested JSON tree and instruments every property
//! reachable through object branches as a subscribable topic. Mutating an
//! observed path through [`ReactiveStore::set`] invalidates the replaced
//! subtree's topics, instruments the new value, and notifies the owned
//! [`TopicRegistry`](pathbus_core::TopicRegistry) synchronously.
//!
//! # Invariants
//!
//! 1. Assigning a value equal to the current one is a complete no-op: no
//!    invalidation, no notification, no version bump.
//! 2. Replacing a subtree discards every descendant topic together with its
//!    subscriber lists; the new subtree's topics start unsubscribed.
//! 3. Instrumentation and notification happen within the `set` call stack;
//!    there is no queue and no suspension point.
//! 4. `version()` increments exactly once per effective mutation.

/// Construction-time options.
pub mod config;
/// The reactive store and its error type.
pub mod store;

pub use config::StoreConfig;
pub use store::{ReactiveStore, SetOutcome, StoreError};
