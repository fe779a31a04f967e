#![forbid(unsafe_code)]

//! Construction-time options for [`ReactiveStore`](crate::ReactiveStore).

use serde_json::Value;

/// Options accepted by [`ReactiveStore::new`](crate::ReactiveStore::new).
///
/// # Example
///
/// ```
/// use pathbus_store::{ReactiveStore, StoreConfig};
/// use serde_json::json;
///
/// let store = ReactiveStore::new(
///     StoreConfig::default().with_data(json!({ "x": 1 })),
/// )
/// .unwrap();
/// assert!(store.has_topic("/x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Initial data tree. Must be a JSON object when present; an empty
    /// object is used otherwise.
    pub data: Option<Value>,
}

impl StoreConfig {
    /// Create the default configuration (empty data tree).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the initial data tree.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}
