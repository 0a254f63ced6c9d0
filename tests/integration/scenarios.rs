//! Editor-shaped scenarios driven through the facade crate.

use worldgraph::codec::{from_json_str, to_json_string};
use worldgraph::engine::{Command, Session, Transaction};
use worldgraph::foundation::{EntityId, EntityKind, Value};

fn created_id(session: &mut Session, label: &str, command: Command) -> EntityId {
    let receipt = session
        .execute(Transaction::single(label, command))
        .unwrap();
    *receipt.changes.created.iter().next().unwrap()
}

// =============================================================================
// The Port City scenarios
// =============================================================================

#[test]
fn deleting_a_location_cascades_through_its_residents() {
    let mut session = Session::standard();

    let port = created_id(
        &mut session,
        "Create Port City",
        Command::create(EntityKind::Location).field("name", "Port City"),
    );
    let mira = created_id(
        &mut session,
        "Create Mira",
        Command::create(EntityKind::Character)
            .field("name", "Mira")
            .reference("resides-in", port),
    );

    // The inverse index shows the residence immediately.
    assert_eq!(session.graph().slot(port, "residents").unwrap(), vec![mira]);

    // Deleting the location cascades: the character's slot empties and the
    // identifier stops resolving.
    let receipt = session
        .execute(Transaction::single("Delete Port City", Command::delete(port)))
        .unwrap();
    assert!(receipt.changes.deleted.contains(&port));
    assert!(receipt.changes.modified.contains(&mira));

    assert!(session.graph().slot(mira, "resides-in").unwrap().is_empty());
    assert!(session.graph().record(port).is_err());
    assert!(session.graph().kind_of(port).is_err());
}

#[test]
fn rename_undo_redo_then_direct_edit_kills_redo() {
    let mut session = Session::standard();
    let mira = created_id(
        &mut session,
        "Create Mira",
        Command::create(EntityKind::Character).field("name", "Mira"),
    );

    session
        .execute(Transaction::single(
            "Rename Mira",
            Command::set_field(mira, "name", "Mira Vasko"),
        ))
        .unwrap();

    assert!(session.undo().unwrap().is_some());
    assert_eq!(
        session.graph().field(mira, "name").unwrap(),
        Value::from("Mira")
    );

    assert!(session.redo().unwrap().is_some());
    assert_eq!(
        session.graph().field(mira, "name").unwrap(),
        Value::from("Mira Vasko")
    );

    session.undo().unwrap().unwrap();
    session
        .execute(Transaction::single(
            "Give biography",
            Command::set_field(mira, "biography", Value::text("Dockhand.")),
        ))
        .unwrap();
    assert!(session.redo().unwrap().is_none());
}

// =============================================================================
// A full editing session
// =============================================================================

#[test]
fn edit_save_load_edit() {
    let mut session = Session::standard();

    let port = created_id(
        &mut session,
        "Create Port City",
        Command::create(EntityKind::Location)
            .field("name", "Port City")
            .field("terrain", Value::choice("sand")),
    );
    let tide = created_id(
        &mut session,
        "Create The Tide",
        Command::create(EntityKind::Faction)
            .field("name", "The Tide")
            .reference("controls", port),
    );
    let mira = created_id(
        &mut session,
        "Create Mira",
        Command::create(EntityKind::Character)
            .field("name", "Mira")
            .reference("resides-in", port)
            .reference("member-of", tide),
    );
    created_id(
        &mut session,
        "Create The Flood",
        Command::create(EntityKind::Event)
            .field("name", "The Flood")
            .reference("located-at", port)
            .reference("involves", mira),
    );

    let json = to_json_string(session.graph()).unwrap();

    // Reopen as a new document.
    let mut reopened = Session::standard();
    let graph = from_json_str(reopened.graph().schema_handle(), &json).unwrap();
    reopened.replace_graph(graph);

    assert_eq!(reopened.graph().len(), 4);
    assert_eq!(reopened.graph().slot(port, "residents").unwrap(), vec![mira]);
    assert_eq!(reopened.graph().slot(mira, "member-of").unwrap(), vec![tide]);
    assert!(!reopened.can_undo());

    // Editing continues on stable identifiers.
    reopened
        .execute(Transaction::single(
            "Promote Mira",
            Command::set_field(mira, "biography", Value::text("Captain now.")),
        ))
        .unwrap();
    assert_eq!(reopened.undo_label(), Some("Promote Mira"));

    // And the edited world still round-trips.
    let json = to_json_string(reopened.graph()).unwrap();
    let reloaded = from_json_str(reopened.graph().schema_handle(), &json).unwrap();
    assert_eq!(
        reloaded.field(mira, "biography").unwrap(),
        Value::text("Captain now.")
    );
}

// =============================================================================
// Property: undo/redo is an exact inverse pair
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// One scripted editor gesture.
    #[derive(Clone, Debug)]
    enum Gesture {
        CreateLocation,
        CreateCharacter(u8),
        Rename(u8, u8),
        Rehome(u8),
        Delete(u8),
    }

    fn gesture() -> impl Strategy<Value = Gesture> {
        prop_oneof![
            Just(Gesture::CreateLocation),
            any::<u8>().prop_map(Gesture::CreateCharacter),
            (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Gesture::Rename(a, b)),
            any::<u8>().prop_map(Gesture::Rehome),
            any::<u8>().prop_map(Gesture::Delete),
        ]
    }

    fn pick(ids: &[EntityId], seed: u8) -> Option<EntityId> {
        if ids.is_empty() {
            None
        } else {
            Some(ids[seed as usize % ids.len()])
        }
    }

    /// Applies a gesture if its precondition holds; failed transactions
    /// are fine too (they must leave no trace by construction).
    fn perform(session: &mut Session, gesture: &Gesture, n: usize) -> Option<()> {
        let graph = session.graph();
        let locations: Vec<_> = graph
            .entities()
            .iter()
            .filter(|(_, k)| *k == EntityKind::Location)
            .map(|(id, _)| id)
            .collect();
        let characters: Vec<_> = graph
            .entities()
            .iter()
            .filter(|(_, k)| *k == EntityKind::Character)
            .map(|(id, _)| id)
            .collect();

        let transaction = match gesture {
            Gesture::CreateLocation => Transaction::single(
                "create location",
                Command::create(EntityKind::Location).field("name", format!("Place {n}")),
            ),
            Gesture::CreateCharacter(seed) => {
                let mut command =
                    Command::create(EntityKind::Character).field("name", format!("Person {n}"));
                if let Some(home) = pick(&locations, *seed) {
                    command = command.reference("resides-in", home);
                }
                Transaction::single("create character", command)
            }
            Gesture::Rename(seed, suffix) => {
                let id = pick(&characters, *seed)?;
                Transaction::single(
                    "rename",
                    Command::set_field(id, "name", format!("Renamed {suffix}")),
                )
            }
            Gesture::Rehome(seed) => {
                let id = pick(&characters, *seed)?;
                let home = pick(&locations, seed.wrapping_add(1))?;
                let old = session.graph().slot(id, "resides-in").ok()?;
                let mut tx = Transaction::new("rehome");
                for previous in old {
                    tx.push(Command::remove_reference(id, "resides-in", previous));
                }
                tx.push(Command::add_reference(id, "resides-in", home));
                tx
            }
            Gesture::Delete(seed) => {
                let all: Vec<_> = session.graph().entities().iter().map(|(id, _)| id).collect();
                let id = pick(&all, *seed)?;
                Transaction::single("delete", Command::delete(id))
            }
        };

        let _ = session.execute(transaction);
        Some(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn undo_all_redo_all_is_identity(gestures in proptest::collection::vec(gesture(), 1..12)) {
            let mut session = Session::standard();
            for (n, g) in gestures.iter().enumerate() {
                perform(&mut session, g, n);
            }
            let final_state = session.graph().clone();

            let mut undone = 0;
            while session.undo().unwrap().is_some() {
                undone += 1;
            }
            prop_assert!(session.graph().is_empty());

            for _ in 0..undone {
                prop_assert!(session.redo().unwrap().is_some());
            }
            prop_assert_eq!(session.graph(), &final_state);
        }
    }
}
