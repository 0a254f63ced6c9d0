//! Typed field records with revision counters.
//!
//! Field values are validated here, closest to the data: a value whose type
//! disagrees with the kind's declared field schema never enters the store.
//! Undo bookkeeping and invariant validation are layered above.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use worldgraph_foundation::{EntityId, Error, ErrorKind, Result, Value};

use crate::schema::KindSchema;

/// The field data of one entity.
///
/// Besides the typed fields, a record carries the entity's revision counter
/// and any opaque payloads preserved from a loaded document (unknown field
/// and relationship names round-trip losslessly across save/load).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: HashMap<Arc<str>, Value>,
    revision: u64,
    opaque_fields: serde_json::Map<String, serde_json::Value>,
    opaque_references: BTreeMap<String, Vec<u64>>,
}

impl Record {
    /// Returns the typed fields of this record.
    #[must_use]
    pub fn fields(&self) -> &HashMap<Arc<str>, Value> {
        &self.fields
    }

    /// Returns a field value, or `None` when unset.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the opaque field payloads preserved from load.
    #[must_use]
    pub fn opaque_fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.opaque_fields
    }

    /// Returns the opaque reference payloads preserved from load.
    #[must_use]
    pub fn opaque_references(&self) -> &BTreeMap<String, Vec<u64>> {
        &self.opaque_references
    }
}

/// Stores the field records of all live entities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldStore {
    records: HashMap<EntityId, Record>,
}

impl FieldStore {
    /// Creates a new empty field store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for a freshly created entity.
    ///
    /// Provided fields are validated against the kind schema; unset fields
    /// with declared defaults receive them. Required fields must end up
    /// populated.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `TypeMismatch`, or `InvalidChoice` for a bad
    /// field, and a precondition error when a required field is missing.
    pub fn insert(
        &mut self,
        id: EntityId,
        schema: &KindSchema,
        initial: &[(Arc<str>, Value)],
    ) -> Result<()> {
        let fields = Self::build_initial(schema, initial)?;
        self.insert_unchecked(id, fields);
        Ok(())
    }

    /// Validates initial field values and materializes the field map for a
    /// new entity, applying defaults and enforcing required fields.
    ///
    /// This is a pure check: callers run it *before* allocating an
    /// identifier so a rejected create leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `TypeMismatch`, or `InvalidChoice` for a bad
    /// field, and a precondition error when a required field is missing.
    pub fn build_initial(
        schema: &KindSchema,
        initial: &[(Arc<str>, Value)],
    ) -> Result<HashMap<Arc<str>, Value>> {
        let mut fields: HashMap<Arc<str>, Value> = HashMap::new();

        for (name, value) in initial {
            let field = schema
                .field(name)
                .ok_or_else(|| Error::unknown_field(schema.kind, &**name))?;
            field.check(value)?;
            if value.is_nil() {
                continue;
            }
            fields.insert(Arc::clone(&field.name), value.clone());
        }

        for field in &schema.fields {
            if fields.contains_key(&field.name) {
                continue;
            }
            if let Some(default) = &field.default {
                fields.insert(Arc::clone(&field.name), default.clone());
            } else if field.required {
                return Err(Error::precondition(format!(
                    "required field '{}' missing for new {}",
                    field.name, schema.kind
                )));
            }
        }

        Ok(fields)
    }

    /// Inserts an already-validated field map as a fresh record at
    /// revision 0.
    ///
    /// No schema checks run here: the create path validates through
    /// [`FieldStore::build_initial`] first, and the codec validates
    /// field-by-field so it can report defects as document errors.
    pub fn insert_unchecked(&mut self, id: EntityId, fields: HashMap<Arc<str>, Value>) {
        self.records.insert(
            id,
            Record {
                fields,
                revision: 0,
                opaque_fields: serde_json::Map::new(),
                opaque_references: BTreeMap::new(),
            },
        );
    }

    /// Sets one field, returning the previous value (nil when unset).
    ///
    /// Setting nil clears the field. The revision counter is not touched
    /// here; the graph owns revision bumps.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `TypeMismatch`, or `InvalidChoice` when the
    /// field or value is not admissible for the kind.
    pub fn set_field(
        &mut self,
        id: EntityId,
        schema: &KindSchema,
        name: &str,
        value: &Value,
    ) -> Result<Value> {
        let field = schema
            .field(name)
            .ok_or_else(|| Error::unknown_field(schema.kind, name))?;
        field.check(value)?;

        let record = self.records.get_mut(&id).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no record for live {id}")))
        })?;

        let previous = if value.is_nil() {
            record.fields.remove(name)
        } else {
            record
                .fields
                .insert(Arc::clone(&field.name), value.clone())
        };
        Ok(previous.unwrap_or(Value::Nil))
    }

    /// Returns the record for an entity, if present.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Removes and returns an entity's record (the delete snapshot).
    pub fn remove(&mut self, id: EntityId) -> Option<Record> {
        self.records.remove(&id)
    }

    /// Restores a previously removed record.
    pub fn restore(&mut self, id: EntityId, record: Record) {
        self.records.insert(id, record);
    }

    /// Bumps an entity's revision counter.
    pub fn touch(&mut self, id: EntityId) {
        if let Some(record) = self.records.get_mut(&id) {
            record.revision += 1;
        }
    }

    /// Restores an entity's revision counter to a captured value.
    pub fn set_revision(&mut self, id: EntityId, revision: u64) {
        if let Some(record) = self.records.get_mut(&id) {
            record.revision = revision;
        }
    }

    /// Attaches opaque payloads preserved from a loaded document.
    pub fn set_opaque(
        &mut self,
        id: EntityId,
        fields: serde_json::Map<String, serde_json::Value>,
        references: BTreeMap<String, Vec<u64>>,
    ) {
        if let Some(record) = self.records.get_mut(&id) {
            record.opaque_fields = fields;
            record.opaque_references = references;
        }
    }

    /// Iterates over all records.
    pub fn records(&self) -> impl Iterator<Item = (EntityId, &Record)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}
