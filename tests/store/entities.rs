//! Integration tests for entity lifecycle and tombstone semantics.

use worldgraph_foundation::{EntityId, EntityKind, ErrorKind};
use worldgraph_store::EntityStore;

#[test]
fn lifecycle_spawn_destroy_revive() {
    let mut store = EntityStore::new();
    let e = store.spawn(EntityKind::Character);

    assert!(store.exists(e));
    store.destroy(e).unwrap();
    assert!(!store.exists(e));

    // The identifier still names the same (dead) entity.
    assert!(matches!(
        store.validate(e).unwrap_err().kind,
        ErrorKind::Tombstone(_)
    ));

    store.revive(e).unwrap();
    assert!(store.exists(e));
    assert_eq!(store.kind_of(e).unwrap(), EntityKind::Character);
}

#[test]
fn identifiers_survive_churn_without_reuse() {
    let mut store = EntityStore::new();
    let mut seen = Vec::new();

    for round in 0..10 {
        let e = store.spawn(EntityKind::Note);
        assert!(
            !seen.contains(&e),
            "identifier reused on round {round}: {e}"
        );
        seen.push(e);
        store.destroy(e).unwrap();
    }
    assert_eq!(store.tombstone_count(), 10);
}

#[test]
fn two_entities_of_same_kind_never_share_an_identifier() {
    let mut store = EntityStore::new();
    let a = store.spawn(EntityKind::Faction);
    let b = store.spawn(EntityKind::Faction);
    assert_ne!(a, b);
}

#[test]
fn insert_reconstructs_persisted_identifiers() {
    let mut store = EntityStore::new();
    store.insert(EntityId::from_raw(0), EntityKind::Location).unwrap();
    store.insert(EntityId::from_raw(3), EntityKind::Character).unwrap();

    assert_eq!(store.len(), 2);
    // The gap stays dead; fresh allocation continues after the high-water mark.
    assert!(!store.exists(EntityId::from_raw(1)));
    assert_eq!(store.spawn(EntityKind::Note).raw(), 4);
}
