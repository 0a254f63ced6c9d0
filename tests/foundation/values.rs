//! Integration tests for values and type descriptors.

use chrono::NaiveDate;
use worldgraph_foundation::{EntityId, EntityKind, Severity, Type, Value, Violation};

// =============================================================================
// Identifiers
// =============================================================================

#[test]
fn identifiers_are_ordered_by_allocation() {
    let ids: Vec<_> = (0..5).map(EntityId::from_raw).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn every_kind_name_round_trips() {
    for kind in EntityKind::ALL {
        assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        assert_eq!(format!("{kind}"), kind.as_str());
    }
}

// =============================================================================
// Values and Types
// =============================================================================

#[test]
fn field_values_report_their_types() {
    assert_eq!(Value::from("Mira").value_type(), Type::String);
    assert_eq!(Value::text("Long ago...").value_type(), Type::Text);
    assert_eq!(Value::Int(12).value_type(), Type::Int);
    assert_eq!(Value::choice("grass").value_type(), Type::Choice);
    assert_eq!(
        Value::Date(NaiveDate::from_ymd_opt(1021, 3, 4).unwrap()).value_type(),
        Type::Date
    );
}

#[test]
fn type_promotions() {
    // Numbers widen, prose accepts plain strings, nothing else crosses.
    assert!(Type::Float.accepts(&Type::Int));
    assert!(Type::Text.accepts(&Type::String));
    assert!(!Type::Int.accepts(&Type::Float));
    assert!(!Type::String.accepts(&Type::Text));
    assert!(!Type::Date.accepts(&Type::String));
}

#[test]
fn optional_types_accept_nil() {
    let ty = Type::option(Type::Date);
    assert!(ty.accepts(&Type::Nil));
    assert!(ty.accepts(&Type::Date));
    assert!(!ty.accepts(&Type::Bool));
}

// =============================================================================
// Violations
// =============================================================================

#[test]
fn only_missing_required_reference_is_tolerated() {
    let warning = Violation::MissingRequiredReference {
        entity: EntityId::from_raw(1),
        relationship: "located-at".to_string(),
    };
    assert_eq!(warning.severity(), Severity::Warning);

    let blocking = [
        Violation::DanglingReference {
            source: EntityId::from_raw(1),
            relationship: "resides-in".to_string(),
            target: EntityId::from_raw(2),
        },
        Violation::CardinalityExceeded {
            source: EntityId::from_raw(1),
            relationship: "resides-in".to_string(),
            count: 2,
        },
        Violation::KindMismatch {
            relationship: "resides-in".to_string(),
            entity: EntityId::from_raw(1),
            kind: EntityKind::Faction,
        },
        Violation::DuplicateUnique {
            kind: EntityKind::Location,
            field: "name".to_string(),
            value: Value::from("Port City"),
            entities: vec![EntityId::from_raw(1), EntityId::from_raw(2)],
        },
    ];
    for violation in blocking {
        assert_eq!(violation.severity(), Severity::Blocking, "{violation}");
    }
}
