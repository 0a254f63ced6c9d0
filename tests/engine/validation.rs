//! Integration tests for post-transaction validation and rollback.

use worldgraph_engine::{Command, Session, Transaction, check_invariants};
use worldgraph_foundation::{EntityId, EntityKind, ErrorKind, Violation};

fn create_location(session: &mut Session, name: &str) -> EntityId {
    let receipt = session
        .execute(Transaction::single(
            format!("Create {name}"),
            Command::create(EntityKind::Location).field("name", name),
        ))
        .unwrap();
    *receipt.changes.created.iter().next().unwrap()
}

// =============================================================================
// Rollback at the invariant boundary
// =============================================================================

#[test]
fn second_residence_applies_per_command_but_fails_validation() {
    let mut session = Session::standard();
    let a = create_location(&mut session, "A");
    let b = create_location(&mut session, "B");
    let receipt = session
        .execute(Transaction::single(
            "Create Mira",
            Command::create(EntityKind::Character)
                .field("name", "Mira")
                .reference("resides-in", a),
        ))
        .unwrap();
    let mira = *receipt.changes.created.iter().next().unwrap();
    let before = session.graph().clone();

    // The add itself succeeds; only the end-state check can reject it, so
    // this exercises the rollback path at the invariant boundary.
    let err = session
        .execute(Transaction::single(
            "Second home",
            Command::add_reference(mira, "resides-in", b),
        ))
        .unwrap_err();
    let ErrorKind::ValidationFailed(violations) = err.kind else {
        panic!("expected validation failure");
    };
    assert!(violations
        .iter()
        .all(|v| matches!(v, Violation::CardinalityExceeded { .. })));

    assert_eq!(session.graph(), &before);
    assert!(check_invariants(session.graph())
        .iter()
        .all(|v| !v.is_blocking()));
}

#[test]
fn kind_mismatch_rolls_back() {
    let mut session = Session::standard();
    let a = create_location(&mut session, "A");
    let b = create_location(&mut session, "B");
    let before = session.graph().clone();

    // Locations cannot reside anywhere.
    let err = session
        .execute(Transaction::single(
            "Nonsense residence",
            Command::add_reference(a, "resides-in", b),
        ))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ValidationFailed(_)));
    assert_eq!(session.graph(), &before);
}

#[test]
fn unique_name_collision_rolls_back_renames_too() {
    let mut session = Session::standard();
    create_location(&mut session, "Port City");
    let gray = create_location(&mut session, "Graywall");
    let before = session.graph().clone();

    let err = session
        .execute(Transaction::single(
            "Rename into collision",
            Command::set_field(gray, "name", "Port City"),
        ))
        .unwrap_err();
    let ErrorKind::ValidationFailed(violations) = err.kind else {
        panic!("expected validation failure");
    };
    assert!(matches!(
        violations[0],
        Violation::DuplicateUnique { kind: EntityKind::Location, .. }
    ));
    assert_eq!(session.graph(), &before);
}

// =============================================================================
// Warning severity
// =============================================================================

#[test]
fn cascade_delete_reports_missing_required_site_without_blocking() {
    let mut session = Session::standard();
    let port = create_location(&mut session, "Port City");
    session
        .execute(Transaction::single(
            "Create The Flood",
            Command::create(EntityKind::Event)
                .field("name", "The Flood")
                .reference("located-at", port),
        ))
        .unwrap();

    // Deleting the site leaves the event without its required location:
    // reported, never repaired, never blocking.
    let receipt = session
        .execute(Transaction::single("Delete Port City", Command::delete(port)))
        .unwrap();
    assert_eq!(receipt.warnings.len(), 1);
    assert!(matches!(
        receipt.warnings[0],
        Violation::MissingRequiredReference { .. }
    ));
    assert!(!session.graph().exists(port));
}
