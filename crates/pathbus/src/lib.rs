#![forbid(unsafe_code)]

//! Pathbus: a reactive path-addressed data store with topic pub/sub.
//!
//! This umbrella crate re-exports the public API of the workspace:
//!
//! - [`ReactiveStore`]: a nested JSON tree whose properties notify
//!   subscribers on change.
//! - [`TopicRegistry`]: the underlying publish/subscribe registry, also
//!   usable standalone with an explicit topic list.
//! - [`Subscriber`] / [`HandlerRegistry`]: the receiver capability and its
//!   stock table-dispatch implementation.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use pathbus::{HandlerRegistry, ReactiveStore, Subscriber, TopicPath};
//! use serde_json::json;
//!
//! let mut store = ReactiveStore::with_data(json!({ "x": 1, "y": { "z": 2 } })).unwrap();
//!
//! // Growing `x` into an object makes "/x/a" observable.
//! store.set("/x", json!({ "a": 1, "b": 2 })).unwrap();
//!
//! let handlers: Rc<dyn Subscriber> = Rc::new(HandlerRegistry::new().with_handler(
//!     TopicPath::parse("/x/a").unwrap(),
//!     |topic, event| {
//!         println!("{topic} changed: {event}");
//!         None
//!     },
//! ));
//! store.subscribe("/x/a", &handlers, false);
//!
//! store.set("/x/a", json!(3)).unwrap(); // handler fires with ("/x/a", 3)
//! assert_eq!(store.get("/x/a").unwrap(), &json!(3));
//! ```

pub use pathbus_core::{
    Event, Handler, HandlerRegistry, PathError, Subscriber, TopicPath, TopicRegistry, TopicSet,
};
pub use pathbus_store::{ReactiveStore, SetOutcome, StoreConfig, StoreError};
