use super::*;
use crate::entity::{Entity, EntityAttributes};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(3 * 60 * 60);

fn make_entity(id: &str, state: &str) -> Entity {
    Entity {
        id: id.to_string(),
        state: state.to_string(),
        attributes: EntityAttributes {
            device_class: Some("temperature".to_string()),
            friendly_name: Some(format!("{} Temperature", id)),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn make_store() -> (EntityStore, ManualClock) {
    let clock = ManualClock::new();
    let store = EntityStore::with_clock(TTL, Arc::new(clock.clone()));
    (store, clock)
}

#[test]
fn test_set_and_get() {
    let (store, _clock) = make_store();

    store.set("sensor.kitchen", make_entity("sensor.kitchen", "21.5"));

    let entity = store.get("sensor.kitchen").unwrap();
    assert_eq!(entity.state, "21.5");
    assert!(store.get("sensor.attic").is_none());
}

#[test]
fn test_entry_visible_until_ttl_elapses() {
    let (store, clock) = make_store();
    store.set("sensor.kitchen", make_entity("sensor.kitchen", "21.5"));

    clock.advance(TTL - Duration::from_millis(1));
    assert_eq!(store.snapshot().len(), 1);
    assert!(store.get("sensor.kitchen").is_some());

    clock.advance(Duration::from_millis(1));
    assert!(store.snapshot().is_empty());
    assert!(store.get("sensor.kitchen").is_none());
}

#[test]
fn test_set_replaces_value_and_restarts_ttl() {
    let (store, clock) = make_store();
    store.set("sensor.kitchen", make_entity("sensor.kitchen", "20.0"));

    clock.advance(TTL / 2);
    store.set("sensor.kitchen", make_entity("sensor.kitchen", "22.0"));

    // Past the first write's expiry, inside the second's
    clock.advance(TTL / 2 + Duration::from_secs(1));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].state, "22.0");

    clock.advance(TTL / 2);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_snapshot_is_ordered_by_id() {
    let (store, _clock) = make_store();
    store.set("sensor.c", make_entity("sensor.c", "1"));
    store.set("sensor.a", make_entity("sensor.a", "2"));
    store.set("sensor.b", make_entity("sensor.b", "3"));

    let ids: Vec<String> = store.snapshot().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["sensor.a", "sensor.b", "sensor.c"]);
}

#[test]
fn test_snapshot_skips_only_expired_entries() {
    let (store, clock) = make_store();
    store.set("sensor.old", make_entity("sensor.old", "1"));

    clock.advance(TTL / 2);
    store.set("sensor.new", make_entity("sensor.new", "2"));

    clock.advance(TTL / 2);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "sensor.new");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_purge_expired() {
    let (store, clock) = make_store();
    store.set("sensor.a", make_entity("sensor.a", "1"));
    store.set("sensor.b", make_entity("sensor.b", "2"));

    assert_eq!(store.purge_expired(), 0);

    clock.advance(TTL / 2);
    store.set("sensor.b", make_entity("sensor.b", "3"));
    clock.advance(TTL / 2);

    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
}

#[test]
fn test_snapshot_is_independent_of_store() {
    let (store, _clock) = make_store();
    store.set("sensor.a", make_entity("sensor.a", "1"));

    let snapshot = store.snapshot();
    store.set("sensor.a", make_entity("sensor.a", "2"));

    assert_eq!(snapshot[0].state, "1");
    assert_eq!(store.get("sensor.a").unwrap().state, "2");
}

#[test]
fn test_concurrent_writer_and_readers() {
    let store = Arc::new(EntityStore::new(TTL));
    let mut handles = vec![];

    let writer = Arc::clone(&store);
    handles.push(thread::spawn(move || {
        for round in 0..200 {
            for i in 0..10 {
                let id = format!("sensor.room_{}", i);
                writer.set(id.clone(), make_entity(&id, &round.to_string()));
            }
        }
    }));

    for _ in 0..4 {
        let reader = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                for entity in reader.snapshot() {
                    // Whole-value replacement: name and id always agree
                    assert_eq!(
                        entity.friendly_name(),
                        format!("{} Temperature", entity.id)
                    );
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 10);
    assert!(store.snapshot().iter().all(|e| e.state == "199"));
}

#[test]
fn test_unrepresentable_ttl_never_expires() {
    let clock = ManualClock::new();
    let store = EntityStore::with_clock(Duration::from_secs(u64::MAX), Arc::new(clock.clone()));

    store.set("sensor.kitchen", make_entity("sensor.kitchen", "21.5"));

    clock.advance(Duration::from_secs(100 * 365 * 24 * 60 * 60));
    assert_eq!(store.snapshot().len(), 1);
    assert_eq!(store.purge_expired(), 0);
    assert_eq!(store.get("sensor.kitchen").unwrap().state, "21.5");
}
