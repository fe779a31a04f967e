//! End-to-end scenarios: a store, a handler-table subscriber, and the
//! dataset lifecycle, exercised together the way an application runtime
//! drives them.

use pathbus_core::{Event, HandlerRegistry, Subscriber, TopicPath, TopicRegistry};
use pathbus_store::{ReactiveStore, SetOutcome, StoreConfig, StoreError};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Records every delivery it receives.
#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<(String, Event)>>,
}

impl Subscriber for Recorder {
    fn receive(&self, topic: &TopicPath, event: &Event) -> Option<Event> {
        self.seen
            .borrow_mut()
            .push((topic.as_str().to_string(), event.clone()));
        None
    }
}

fn recorder() -> (Rc<Recorder>, Rc<dyn Subscriber>) {
    let recorder = Rc::new(Recorder::default());
    let subscriber: Rc<dyn Subscriber> = Rc::clone(&recorder) as Rc<dyn Subscriber>;
    (recorder, subscriber)
}

#[test]
fn grow_a_scalar_into_a_subtree_and_observe_it() {
    // Start with a scalar `x`, grow it into an object, then watch one of
    // the new leaves.
    let mut store = ReactiveStore::new(
        StoreConfig::default().with_data(json!({ "x": 1, "y": { "z": 2 } })),
    )
    .unwrap();

    store.set("/x", json!({ "a": 1, "b": 2 })).unwrap();

    let handlers: Rc<dyn Subscriber> = Rc::new(HandlerRegistry::new().with_handler(
        TopicPath::parse("/x/a").unwrap(),
        |topic, event| Some(json!({ "topic": topic.as_str(), "event": event })),
    ));
    store.subscribe("/x/a", &handlers, false);

    let outcome = store.set("/x/a", json!(1)).unwrap();
    // `a` already holds 1: nothing may fire.
    assert_eq!(outcome, SetOutcome::Unchanged);

    let outcome = store.set("/x/a", json!(3)).unwrap();
    assert_eq!(outcome, SetOutcome::Notified(1));
    assert_eq!(store.get("/x/a").unwrap(), &json!(3));
    assert_eq!(store.get("/y/z").unwrap(), &json!(2));
}

#[test]
fn persistent_and_one_shot_across_mutations() {
    let mut store = ReactiveStore::with_data(json!({ "counter": 0 })).unwrap();
    let (persistent, persistent_sub) = recorder();
    let (once, once_sub) = recorder();

    store.subscribe("/counter", &persistent_sub, false);
    store.subscribe("/counter", &once_sub, true);

    store.set("/counter", json!(1)).unwrap();
    store.set("/counter", json!(2)).unwrap();

    assert_eq!(
        *persistent.seen.borrow(),
        vec![
            ("/counter".to_string(), json!(1)),
            ("/counter".to_string(), json!(2)),
        ]
    );
    assert_eq!(
        *once.seen.borrow(),
        vec![("/counter".to_string(), json!(1))]
    );
}

#[test]
fn subscription_does_not_survive_subtree_replacement() {
    let mut store = ReactiveStore::with_data(json!({ "a": { "b": 1 } })).unwrap();
    let (old, old_sub) = recorder();
    store.subscribe("/a/b", &old_sub, false);

    // Replacing `a` tears down `/a/b` and re-creates it for the new value.
    store.set("/a", json!({ "b": 10 })).unwrap();

    let (fresh, fresh_sub) = recorder();
    store.subscribe("/a/b", &fresh_sub, false);
    store.set("/a/b", json!(11)).unwrap();

    assert!(old.seen.borrow().is_empty());
    assert_eq!(
        *fresh.seen.borrow(),
        vec![("/a/b".to_string(), json!(11))]
    );
}

#[test]
fn dataset_lifecycle() {
    let mut store = ReactiveStore::default();
    store
        .add_data_set("session", Some(json!({ "user": { "name": "ada" } })))
        .unwrap();

    assert_eq!(
        store.add_data_set("session", None).unwrap_err(),
        StoreError::DatasetExists("session".to_string())
    );

    let (seen, sub) = recorder();
    store.subscribe("/session/user", &sub, false);
    store
        .set("/session/user", json!({ "name": "grace" }))
        .unwrap();
    assert_eq!(seen.seen.borrow().len(), 1);

    store.remove_data_set("session").unwrap();
    assert_eq!(
        store.remove_data_set("session").unwrap_err(),
        StoreError::DatasetNotFound("session".to_string())
    );

    // The dataset's topics are gone with their subscribers.
    assert_eq!(store.notify("/session/user", &json!(null)), 0);
    assert_eq!(seen.seen.borrow().len(), 1);

    // The name is reusable and starts clean.
    store.add_data_set("session", None).unwrap();
    assert_eq!(store.notify("/session", &json!(null)), 0);
}

#[test]
fn bare_registry_round_trip() {
    // The registry also works standalone, seeded with explicit topics.
    let ticker = TopicPath::parse("/app/ticker").unwrap();
    let status = TopicPath::parse("/app/status").unwrap();
    let mut registry = TopicRegistry::with_topics([ticker.clone(), status.clone()]);

    let (seen, sub) = recorder();
    registry.subscribe(&ticker, &sub, false);
    registry.subscribe(&status, &sub, true);

    registry.notify(&ticker, &json!("tick"));
    registry.notify(&status, &json!("ok"));
    registry.notify(&status, &json!("gone"));

    assert_eq!(
        *seen.seen.borrow(),
        vec![
            ("/app/ticker".to_string(), json!("tick")),
            ("/app/status".to_string(), json!("ok")),
        ]
    );
}

#[test]
fn notification_carries_the_subtree_value() {
    let mut store = ReactiveStore::with_data(json!({ "doc": { "title": "a" } })).unwrap();
    let (seen, sub) = recorder();
    store.subscribe("/doc", &sub, false);

    store
        .set("/doc", json!({ "title": "b", "body": "text" }))
        .unwrap();

    assert_eq!(
        *seen.seen.borrow(),
        vec![(
            "/doc".to_string(),
            json!({ "title": "b", "body": "text" })
        )]
    );
}
