//! The standard world-building schema.
//!
//! Declares the six entity kinds and the relationships the editor ships
//! with. Custom schemas can be assembled through [`crate::schema`] directly;
//! everything here is plain registration.

use worldgraph_foundation::{EntityKind, Type, Value};

use crate::schema::{Cardinality, FieldSchema, KindSchema, RelationshipSchema, WorldSchema};

/// Terrain tokens for locations.
pub const TERRAIN_TOKENS: &[&str] = &[
    "water", "foam", "rocks", "sand", "grass", "shadow", "stairs", "plateau", "wall", "bridge",
    "deco",
];

/// Media tokens for assets.
pub const MEDIA_TOKENS: &[&str] = &["image", "audio", "video", "document"];

/// Status tokens for characters.
pub const STATUS_TOKENS: &[&str] = &["alive", "dead", "missing", "unknown"];

/// Builds the standard schema: all six kinds and the stock relationships.
///
/// # Panics
///
/// Panics if the built-in declarations collide, which would be a bug in
/// this module rather than a runtime condition.
#[must_use]
pub fn standard_schema() -> WorldSchema {
    let mut schema = WorldSchema::new();

    let kinds = [
        KindSchema::new(EntityKind::Location)
            .with_field(FieldSchema::required("name", Type::String).unique())
            .with_field(FieldSchema::optional("description", Type::Text))
            .with_field(FieldSchema::optional("terrain", Type::Choice).with_choices(TERRAIN_TOKENS))
            .with_field(FieldSchema::optional("elevation", Type::Int).with_default(Value::Int(0)))
            .with_field(FieldSchema::optional("founded", Type::Date)),
        KindSchema::new(EntityKind::Character)
            .with_field(FieldSchema::required("name", Type::String))
            .with_field(FieldSchema::optional("biography", Type::Text))
            .with_field(
                FieldSchema::optional("status", Type::Choice)
                    .with_choices(STATUS_TOKENS)
                    .with_default(Value::choice("alive")),
            )
            .with_field(FieldSchema::optional("born", Type::Date)),
        KindSchema::new(EntityKind::Faction)
            .with_field(FieldSchema::required("name", Type::String).unique())
            .with_field(FieldSchema::optional("creed", Type::Text))
            .with_field(FieldSchema::optional("influence", Type::Int)),
        KindSchema::new(EntityKind::Event)
            .with_field(FieldSchema::required("name", Type::String))
            .with_field(FieldSchema::optional("summary", Type::Text))
            .with_field(FieldSchema::optional("date", Type::Date)),
        KindSchema::new(EntityKind::Note)
            .with_field(FieldSchema::required("title", Type::String))
            .with_field(FieldSchema::optional("body", Type::Text)),
        KindSchema::new(EntityKind::Asset)
            .with_field(FieldSchema::required("name", Type::String))
            .with_field(FieldSchema::required("path", Type::String))
            .with_field(
                FieldSchema::optional("media", Type::Choice)
                    .with_choices(MEDIA_TOKENS)
                    .with_default(Value::choice("image")),
            )
            .with_field(FieldSchema::optional("caption", Type::Text)),
    ];
    for kind in kinds {
        schema.register_kind(kind).expect("built-in kind collision");
    }

    let relationships = [
        RelationshipSchema::new("resides-in")
            .with_inverse("residents")
            .with_cardinality(Cardinality::One)
            .from_kinds(&[EntityKind::Character])
            .to_kinds(&[EntityKind::Location]),
        RelationshipSchema::new("member-of")
            .with_inverse("members")
            .from_kinds(&[EntityKind::Character])
            .to_kinds(&[EntityKind::Faction]),
        RelationshipSchema::new("controls")
            .with_inverse("controlled-by")
            .from_kinds(&[EntityKind::Faction])
            .to_kinds(&[EntityKind::Location]),
        RelationshipSchema::new("located-at")
            .with_inverse("site-of")
            .with_cardinality(Cardinality::One)
            .required()
            .from_kinds(&[EntityKind::Event])
            .to_kinds(&[EntityKind::Location]),
        RelationshipSchema::new("involves")
            .with_inverse("involved-in")
            .from_kinds(&[EntityKind::Event])
            .to_kinds(&[EntityKind::Character]),
        RelationshipSchema::new("about")
            .with_inverse("annotated-by")
            .from_kinds(&[EntityKind::Note]),
        RelationshipSchema::new("depicts")
            .with_inverse("depicted-by")
            .from_kinds(&[EntityKind::Asset]),
    ];
    for relationship in relationships {
        schema
            .register_relationship(relationship)
            .expect("built-in relationship collision");
    }

    schema
}
