//! Integration tests for undo/redo as atomic transactions.

use worldgraph_engine::{Command, Session, Transaction};
use worldgraph_foundation::{EntityId, EntityKind, Value};

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
// Linear history
// =============================================================================

#[test]
fn undo_all_then_redo_all_restores_identical_state() {
    let mut session = Session::standard();

    let port = create_location(&mut session, "Port City");
    let mira = {
        let receipt = session
            .execute(Transaction::single(
                "Create Mira",
                Command::create(EntityKind::Character)
                    .field("name", "Mira")
                    .reference("resides-in", port),
            ))
            .unwrap();
        *receipt.changes.created.iter().next().unwrap()
    };
    session
        .execute(Transaction::single(
            "Rename Mira",
            Command::set_field(mira, "name", "Mira Vasko"),
        ))
        .unwrap();
    session
        .execute(Transaction::single("Delete Port City", Command::delete(port)))
        .unwrap();

    let final_state = session.graph().clone();
    let n = 4;

    for _ in 0..n {
        assert!(session.undo().unwrap().is_some());
    }
    assert!(session.graph().is_empty());
    assert!(!session.can_undo());

    for _ in 0..n {
        assert!(session.redo().unwrap().is_some());
    }
    assert_eq!(session.graph(), &final_state);
    assert!(!session.can_redo());
}

#[test]
fn undo_of_delete_revives_the_same_identifier_and_edges() {
    let mut session = Session::standard();
    let port = create_location(&mut session, "Port City");
    let receipt = session
        .execute(Transaction::single(
            "Create Mira",
            Command::create(EntityKind::Character)
                .field("name", "Mira")
                .reference("resides-in", port),
        ))
        .unwrap();
    let mira = *receipt.changes.created.iter().next().unwrap();

    session
        .execute(Transaction::single("Delete Port City", Command::delete(port)))
        .unwrap();
    assert!(!session.graph().exists(port));

    let notification = session.undo().unwrap().unwrap();
    assert!(notification.created.contains(&port));
    assert!(session.graph().exists(port));
    assert_eq!(session.graph().slot(port, "residents").unwrap(), vec![mira]);
}

#[test]
fn redo_of_create_reinstates_the_same_identifier() {
    let mut session = Session::standard();
    let port = create_location(&mut session, "Port City");

    session.undo().unwrap().unwrap();
    assert!(!session.graph().exists(port));

    let notification = session.redo().unwrap().unwrap();
    assert!(notification.created.contains(&port));
    assert!(session.graph().exists(port));

    // Fresh allocations never collide with the revived identifier.
    let other = create_location(&mut session, "Graywall");
    assert_ne!(other, port);
}

#[test]
fn rename_undo_redo_then_manual_edit_clears_redo() {
    let mut session = Session::standard();
    let receipt = session
        .execute(Transaction::single(
            "Create Mira",
            Command::create(EntityKind::Character).field("name", "Mira"),
        ))
        .unwrap();
    let mira = *receipt.changes.created.iter().next().unwrap();

    session
        .execute(Transaction::single(
            "Rename",
            Command::set_field(mira, "name", "Mira Vasko"),
        ))
        .unwrap();

    session.undo().unwrap().unwrap();
    assert_eq!(
        session.graph().field(mira, "name").unwrap(),
        Value::from("Mira")
    );

    session.redo().unwrap().unwrap();
    assert_eq!(
        session.graph().field(mira, "name").unwrap(),
        Value::from("Mira Vasko")
    );

    // A direct edit (not via redo) forks nothing: redo dies.
    session.undo().unwrap().unwrap();
    session
        .execute(Transaction::single(
            "Different rename",
            Command::set_field(mira, "name", "Mira of the Tide"),
        ))
        .unwrap();
    assert!(!session.can_redo());
    assert_eq!(session.redo().unwrap(), None);
}

#[test]
fn undo_notification_is_the_inverse_shape() {
    let mut session = Session::standard();
    let port = create_location(&mut session, "Port City");

    let notification = session.undo().unwrap().unwrap();
    assert!(notification.deleted.contains(&port));
    assert!(notification.created.is_empty());

    let notification = session.redo().unwrap().unwrap();
    assert!(notification.created.contains(&port));
    assert!(notification.deleted.is_empty());
}

#[test]
fn interleaved_undo_redo_keeps_depths_consistent() {
    let mut session = Session::standard();
    create_location(&mut session, "A");
    create_location(&mut session, "B");
    create_location(&mut session, "C");

    session.undo().unwrap().unwrap();
    session.undo().unwrap().unwrap();
    session.redo().unwrap().unwrap();

    assert_eq!(session.undo_label(), Some("Create B"));
    assert_eq!(session.redo_label(), Some("Create C"));
    assert_eq!(session.graph().len(), 2);
}
