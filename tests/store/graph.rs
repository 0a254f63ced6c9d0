//! Integration tests for the unified graph.

use std::sync::Arc;

use worldgraph_foundation::{EntityKind, ErrorKind, Value};
use worldgraph_store::{Graph, catalog};

fn graph() -> Graph {
    Graph::new(Arc::new(catalog::standard_schema()))
}

fn named(name: &str) -> Vec<(Arc<str>, Value)> {
    vec![(Arc::from("name"), Value::from(name))]
}

#[test]
fn standard_schema_defaults_apply() {
    let mut g = graph();
    let port = g.create(EntityKind::Location, &named("Port City")).unwrap();
    let mira = g.create(EntityKind::Character, &named("Mira")).unwrap();

    assert_eq!(g.field(port, "elevation").unwrap(), Value::Int(0));
    assert_eq!(g.field(mira, "status").unwrap(), Value::choice("alive"));
    // No default declared: reads as nil.
    assert_eq!(g.field(mira, "biography").unwrap(), Value::Nil);
}

#[test]
fn slots_read_through_canonical_and_inverse_names() {
    let mut g = graph();
    let port = g.create(EntityKind::Location, &named("Port City")).unwrap();
    let tide = g.create(EntityKind::Faction, &named("The Tide")).unwrap();
    g.add_reference(tide, "controls", port).unwrap();

    assert_eq!(g.slot(tide, "controls").unwrap(), vec![port]);
    assert_eq!(g.slot(port, "controlled-by").unwrap(), vec![tide]);
}

#[test]
fn delete_tombstones_and_reads_fail() {
    let mut g = graph();
    let port = g.create(EntityKind::Location, &named("Port City")).unwrap();
    g.delete(port).unwrap();

    assert!(matches!(
        g.field(port, "name").unwrap_err().kind,
        ErrorKind::Tombstone(_)
    ));
    assert!(matches!(
        g.slot(port, "residents").unwrap_err().kind,
        ErrorKind::Tombstone(_)
    ));
}

#[test]
fn delete_restore_is_exact_under_heavy_linking() {
    let mut g = graph();
    let port = g.create(EntityKind::Location, &named("Port City")).unwrap();
    let tide = g.create(EntityKind::Faction, &named("The Tide")).unwrap();
    g.add_reference(tide, "controls", port).unwrap();

    let mut residents = Vec::new();
    for i in 0..5 {
        let c = g
            .create(
                EntityKind::Character,
                &named(&format!("Resident {i}")),
            )
            .unwrap();
        g.add_reference(c, "resides-in", port).unwrap();
        residents.push(c);
    }
    let before = g.clone();

    let snapshot = g.delete(port).unwrap();
    for c in &residents {
        assert!(g.slot(*c, "resides-in").unwrap().is_empty());
    }
    assert!(g.slot(tide, "controls").unwrap().is_empty());

    g.restore(snapshot).unwrap();
    assert_eq!(g, before);
}

#[test]
fn field_edits_are_isolated_per_entity() {
    let mut g = graph();
    let a = g.create(EntityKind::Location, &named("A")).unwrap();
    let b = g.create(EntityKind::Location, &named("B")).unwrap();

    g.set_field(a, "description", &Value::text("First.")).unwrap();
    assert_eq!(g.field(b, "description").unwrap(), Value::Nil);
    assert_eq!(g.revision(a).unwrap(), 1);
    assert_eq!(g.revision(b).unwrap(), 0);
}
