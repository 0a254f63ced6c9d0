//! Schema definitions for entity kinds, fields, and relationships.
//!
//! Schemas declare the structure and constraints the validation engine
//! enforces. They are registered once into a [`WorldSchema`] and shared
//! read-only by the graph for the lifetime of a session.

use std::collections::HashMap;
use std::sync::Arc;

use worldgraph_foundation::{EntityKind, Error, ErrorKind, Result, Type, Value};

/// Cardinality constraint for a relationship slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The source's slot holds at most one target.
    One,
    /// The source's slot holds any number of targets.
    Many,
}

/// Schema definition for one field of an entity kind.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name (e.g., `name`, `terrain`).
    pub name: Arc<str>,
    /// Field type.
    pub ty: Type,
    /// Whether the field must be supplied at creation.
    pub required: bool,
    /// Default value applied at creation when the field is not supplied.
    pub default: Option<Value>,
    /// Permitted tokens for `Choice` fields (empty otherwise).
    pub choices: Vec<Arc<str>>,
    /// Whether values must be unique across live entities of the kind.
    pub unique: bool,
}

impl FieldSchema {
    /// Creates a required field with no default.
    #[must_use]
    pub fn required(name: &str, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            choices: Vec::new(),
            unique: false,
        }
    }

    /// Creates an optional field with no default (unset reads as nil).
    #[must_use]
    pub fn optional(name: &str, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            choices: Vec::new(),
            unique: false,
        }
    }

    /// Sets the default value applied at creation.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Declares the permitted tokens for a `Choice` field.
    #[must_use]
    pub fn with_choices(mut self, tokens: &[&str]) -> Self {
        self.choices = tokens.iter().map(|t| Arc::from(*t)).collect();
        self
    }

    /// Marks the field as unique across live entities of its kind.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Checks a value against this field's type and choice list.
    ///
    /// Nil is always accepted; an unset field reads as nil.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value's type is not accepted, or
    /// `InvalidChoice` when a choice token is outside the declared list.
    pub fn check(&self, value: &Value) -> Result<()> {
        if value.is_nil() {
            return Ok(());
        }
        let actual = value.value_type();
        if !self.ty.accepts(&actual) {
            return Err(Error::type_mismatch(&*self.name, self.ty.clone(), actual));
        }
        if let Value::Choice(token) = value {
            if !self.choices.iter().any(|c| c == token) {
                return Err(Error::invalid_choice(&*self.name, &**token));
            }
        }
        Ok(())
    }
}

/// Schema definition for one entity kind.
#[derive(Clone, Debug, PartialEq)]
pub struct KindSchema {
    /// The kind this schema describes.
    pub kind: EntityKind,
    /// Field definitions.
    pub fields: Vec<FieldSchema>,
}

impl KindSchema {
    /// Creates a new kind schema with no fields.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Iterates over fields declared unique.
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.unique)
    }
}

/// Schema definition for a relationship type.
///
/// A relationship is a directed, typed edge stored under its canonical name.
/// When an inverse name is declared, the index maintains the mirrored view
/// synchronously and the inverse name can be used to address the slot from
/// the target's side.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipSchema {
    /// Canonical (forward) name, e.g. `resides-in`.
    pub name: Arc<str>,
    /// Inverse name, e.g. `residents`, when the mirrored slot is maintained.
    pub inverse: Option<Arc<str>>,
    /// Cardinality of the forward slot.
    pub cardinality: Cardinality,
    /// Whether the forward slot must be populated on every live source.
    ///
    /// An empty required slot is a warning-severity violation: reported,
    /// never auto-repaired.
    pub required: bool,
    /// Kinds permitted as sources (empty = any kind).
    pub source_kinds: Vec<EntityKind>,
    /// Kinds permitted as targets (empty = any kind).
    pub target_kinds: Vec<EntityKind>,
}

impl RelationshipSchema {
    /// Creates a new relationship schema with default settings
    /// (cardinality many, no inverse, any kinds, not required).
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            inverse: None,
            cardinality: Cardinality::Many,
            required: false,
            source_kinds: Vec::new(),
            target_kinds: Vec::new(),
        }
    }

    /// Declares the inverse name for the mirrored slot.
    #[must_use]
    pub fn with_inverse(mut self, inverse: &str) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    /// Sets the cardinality of the forward slot.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Marks the forward slot as required on every live source.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the kinds permitted as sources.
    #[must_use]
    pub fn from_kinds(mut self, kinds: &[EntityKind]) -> Self {
        self.source_kinds = kinds.to_vec();
        self
    }

    /// Restricts the kinds permitted as targets.
    #[must_use]
    pub fn to_kinds(mut self, kinds: &[EntityKind]) -> Self {
        self.target_kinds = kinds.to_vec();
        self
    }

    /// Checks whether a kind is permitted as a source.
    #[must_use]
    pub fn allows_source(&self, kind: EntityKind) -> bool {
        self.source_kinds.is_empty() || self.source_kinds.contains(&kind)
    }

    /// Checks whether a kind is permitted as a target.
    #[must_use]
    pub fn allows_target(&self, kind: EntityKind) -> bool {
        self.target_kinds.is_empty() || self.target_kinds.contains(&kind)
    }
}

/// A relationship name resolved to its canonical schema.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedRelationship<'a> {
    /// The canonical schema.
    pub schema: &'a RelationshipSchema,
    /// True when the name addressed the inverse side, so source and target
    /// must be swapped to reach the canonical direction.
    pub inverted: bool,
}

/// Registry of every kind and relationship schema for one world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSchema {
    /// Kind schemas by kind tag.
    kinds: HashMap<EntityKind, KindSchema>,
    /// Relationship schemas by canonical name.
    relationships: HashMap<Arc<str>, RelationshipSchema>,
    /// Inverse name -> canonical name.
    inverse_names: HashMap<Arc<str>, Arc<str>>,
}

impl WorldSchema {
    /// Creates a new empty schema registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema for the kind is already registered.
    pub fn register_kind(&mut self, schema: KindSchema) -> Result<()> {
        if self.kinds.contains_key(&schema.kind) {
            return Err(Error::new(ErrorKind::Internal(format!(
                "kind schema already registered: {}",
                schema.kind
            ))));
        }
        self.kinds.insert(schema.kind, schema);
        Ok(())
    }

    /// Registers a relationship schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the canonical name or the inverse name collides
    /// with an already-registered schema.
    pub fn register_relationship(&mut self, schema: RelationshipSchema) -> Result<()> {
        let name = Arc::clone(&schema.name);
        if self.relationships.contains_key(&name) || self.inverse_names.contains_key(&name) {
            return Err(Error::new(ErrorKind::Internal(format!(
                "relationship schema already registered: {name}"
            ))));
        }
        if let Some(inverse) = &schema.inverse {
            if self.relationships.contains_key(inverse) || self.inverse_names.contains_key(inverse)
            {
                return Err(Error::new(ErrorKind::Internal(format!(
                    "inverse name already registered: {inverse}"
                ))));
            }
            self.inverse_names
                .insert(Arc::clone(inverse), Arc::clone(&name));
        }
        self.relationships.insert(name, schema);
        Ok(())
    }

    /// Gets the schema for a kind.
    #[must_use]
    pub fn kind(&self, kind: EntityKind) -> Option<&KindSchema> {
        self.kinds.get(&kind)
    }

    /// Gets a relationship schema by its canonical name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipSchema> {
        self.relationships.get(name)
    }

    /// Resolves a canonical or inverse name to its schema.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ResolvedRelationship<'_>> {
        if let Some(schema) = self.relationships.get(name) {
            return Some(ResolvedRelationship {
                schema,
                inverted: false,
            });
        }
        let canonical = self.inverse_names.get(name)?;
        self.relationships
            .get(canonical)
            .map(|schema| ResolvedRelationship {
                schema,
                inverted: true,
            })
    }

    /// Iterates over all registered relationship schemas.
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipSchema> {
        self.relationships.values()
    }

    /// Iterates over all registered kind schemas.
    pub fn kinds(&self) -> impl Iterator<Item = &KindSchema> {
        self.kinds.values()
    }
}
