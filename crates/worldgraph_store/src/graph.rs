//! Unified mutable world state.
//!
//! The `Graph` owns the entity store, field records, and relationship index
//! for one open document, and keeps them consistent within every call. It
//! performs schema-level checks (kinds, field types, relationship names) but
//! no invariant validation and no undo bookkeeping — both are layered above
//! by the engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use worldgraph_foundation::{EntityId, EntityKind, Error, ErrorKind, Result, Value};

use crate::entity::EntityStore;
use crate::fields::{FieldStore, Record};
use crate::relationship::{Edge, RelationshipIndex};
use crate::schema::WorldSchema;

/// Outcome of an add/remove reference call, in canonical direction.
///
/// `changed` is false when the call was an idempotent no-op (adding an edge
/// that already existed, removing one that did not).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEdge {
    /// Canonical relationship name.
    pub relationship: Arc<str>,
    /// Canonical source.
    pub source: EntityId,
    /// Canonical target.
    pub target: EntityId,
    /// Whether the index actually changed.
    pub changed: bool,
}

/// Everything removed by a delete, captured for exact restoration.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteSnapshot {
    /// The deleted entity.
    pub id: EntityId,
    /// Its kind.
    pub kind: EntityKind,
    /// Its field record (fields, revision, opaque payloads).
    pub record: Record,
    /// Every edge that touched it, in canonical direction.
    pub edges: Vec<Edge>,
    /// Revisions of the other endpoints before the cascade bumped them.
    pub neighbor_revisions: Vec<(EntityId, u64)>,
}

/// The full world graph: entities, fields, and the relationship index.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    schema: Arc<WorldSchema>,
    entities: EntityStore,
    fields: FieldStore,
    index: RelationshipIndex,
}

impl Graph {
    /// Creates an empty graph over the given schema.
    #[must_use]
    pub fn new(schema: Arc<WorldSchema>) -> Self {
        Self {
            schema,
            entities: EntityStore::new(),
            fields: FieldStore::new(),
            index: RelationshipIndex::new(),
        }
    }

    /// Returns the world schema.
    #[must_use]
    pub fn schema(&self) -> &WorldSchema {
        &self.schema
    }

    /// Returns a shared handle to the world schema.
    #[must_use]
    pub fn schema_handle(&self) -> Arc<WorldSchema> {
        Arc::clone(&self.schema)
    }

    /// Returns the entity store.
    #[must_use]
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Returns the field store.
    #[must_use]
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    /// Returns the relationship index.
    #[must_use]
    pub fn index(&self) -> &RelationshipIndex {
        &self.index
    }

    // --- Entity Operations ---

    /// Creates an entity of the given kind with initial field values.
    ///
    /// Unset fields with declared defaults receive them; required fields
    /// must end up populated. The new entity starts at revision 0.
    ///
    /// # Errors
    ///
    /// Returns field errors (`UnknownField`, `TypeMismatch`,
    /// `InvalidChoice`), a precondition error for a missing required field,
    /// or an internal error when no schema is registered for the kind.
    pub fn create(&mut self, kind: EntityKind, initial: &[(Arc<str>, Value)]) -> Result<EntityId> {
        let kind_schema = self.schema.kind(kind).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no schema for kind {kind}")))
        })?;
        // Validate before allocating so a rejected create leaves no trace.
        let fields = FieldStore::build_initial(kind_schema, initial)?;
        let id = self.entities.spawn(kind);
        self.fields.insert_unchecked(id, fields);
        Ok(id)
    }

    /// Re-creates an entity at its original identifier (redo of a create).
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the identifier is not tombstoned or
    /// its kind does not match.
    pub fn create_at(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        initial: &[(Arc<str>, Value)],
    ) -> Result<()> {
        let kind_schema = self.schema.kind(kind).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no schema for kind {kind}")))
        })?;
        let fields = FieldStore::build_initial(kind_schema, initial)?;
        let revived = self.entities.revive(id)?;
        if revived != kind {
            // Put the tombstone back before failing.
            self.entities.destroy(id)?;
            return Err(Error::precondition(format!(
                "identifier {id} was a {revived}, not a {kind}"
            )));
        }
        self.fields.insert_unchecked(id, fields);
        Ok(())
    }

    /// Deletes an entity, cascading removal of every reference that touches
    /// it, and returns a snapshot sufficient to restore it exactly.
    ///
    /// Endpoints that lose an edge have their revision bumped; their prior
    /// revisions ride along in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn delete(&mut self, id: EntityId) -> Result<DeleteSnapshot> {
        let kind = self.entities.destroy(id)?;
        let record = self.fields.remove(id).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no record for live {id}")))
        })?;
        let edges = self.index.detach(id);

        let neighbors: BTreeSet<EntityId> = edges
            .iter()
            .flat_map(|e| [e.source, e.target])
            .filter(|&n| n != id)
            .collect();
        let mut neighbor_revisions = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            if let Some(record) = self.fields.get(neighbor) {
                neighbor_revisions.push((neighbor, record.revision()));
                self.fields.touch(neighbor);
            }
        }

        Ok(DeleteSnapshot {
            id,
            kind,
            record,
            edges,
            neighbor_revisions,
        })
    }

    /// Discards a never-committed create during transaction rollback.
    ///
    /// Unlike [`Graph::delete`], this deallocates the identifier entirely
    /// (the serial counter rewinds) and leaves every neighbor revision for
    /// the caller to restore: the failed transaction must vanish byte for
    /// byte, tombstone included.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive and an
    /// internal error when it is not the most recent allocation.
    pub fn discard_create(&mut self, id: EntityId) -> Result<()> {
        self.entities.discard(id)?;
        self.index.detach(id);
        self.fields.remove(id);
        Ok(())
    }

    /// Restores a deleted entity from its snapshot (undo of a delete).
    ///
    /// Revives the identifier, restores the field record, re-adds every
    /// cascaded edge, and rolls neighbor revisions back to their captured
    /// values.
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the identifier is not tombstoned or
    /// its kind does not match the snapshot.
    pub fn restore(&mut self, snapshot: DeleteSnapshot) -> Result<()> {
        let revived = self.entities.revive(snapshot.id)?;
        if revived != snapshot.kind {
            self.entities.destroy(snapshot.id)?;
            return Err(Error::precondition(format!(
                "identifier {} was a {revived}, not a {}",
                snapshot.id, snapshot.kind
            )));
        }
        self.fields.restore(snapshot.id, snapshot.record);
        for edge in &snapshot.edges {
            self.index.add(edge.source, &edge.relationship, edge.target);
        }
        for (neighbor, revision) in snapshot.neighbor_revisions {
            self.fields.set_revision(neighbor, revision);
        }
        Ok(())
    }

    // --- Field Operations ---

    /// Sets a field on a live entity, returning the previous value (nil
    /// when the field was unset). Bumps the entity's revision.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive, and
    /// field errors when the name or value is not admissible.
    pub fn set_field(&mut self, id: EntityId, name: &str, value: &Value) -> Result<Value> {
        let kind = self.entities.kind_of(id)?;
        let kind_schema = self.schema.kind(kind).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no schema for kind {kind}")))
        })?;
        let previous = self.fields.set_field(id, kind_schema, name, value)?;
        self.fields.touch(id);
        Ok(previous)
    }

    /// Restores an entity's revision counter to a captured value.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn set_revision(&mut self, id: EntityId, revision: u64) -> Result<()> {
        self.entities.validate(id)?;
        self.fields.set_revision(id, revision);
        Ok(())
    }

    // --- Reference Operations ---

    /// Resolves a canonical or inverse relationship name, swapping the
    /// endpoints into canonical direction when the inverse was addressed.
    fn resolve_edge(
        &self,
        source: EntityId,
        name: &str,
        target: EntityId,
    ) -> Result<(Arc<str>, EntityId, EntityId)> {
        let resolved = self
            .schema
            .resolve(name)
            .ok_or_else(|| Error::unknown_relationship(name))?;
        let canonical = Arc::clone(&resolved.schema.name);
        if resolved.inverted {
            Ok((canonical, target, source))
        } else {
            Ok((canonical, source, target))
        }
    }

    /// Adds a reference between two live entities.
    ///
    /// The relationship may be addressed by its canonical or inverse name;
    /// the stored edge is always canonical, and the mirrored view updates in
    /// the same call. Both endpoints' revisions bump when the edge is new.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRelationship` for an undeclared name and
    /// `NotFound`/`Tombstone` when either endpoint is not alive. Kind and
    /// cardinality compliance are checked by post-transaction validation,
    /// not here.
    pub fn add_reference(
        &mut self,
        source: EntityId,
        name: &str,
        target: EntityId,
    ) -> Result<ResolvedEdge> {
        let (relationship, src, dst) = self.resolve_edge(source, name, target)?;
        self.entities.validate(src)?;
        self.entities.validate(dst)?;
        let changed = self.index.add(src, &relationship, dst);
        if changed {
            self.fields.touch(src);
            if src != dst {
                self.fields.touch(dst);
            }
        }
        Ok(ResolvedEdge {
            relationship,
            source: src,
            target: dst,
            changed,
        })
    }

    /// Removes a reference between two live entities.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::add_reference`].
    pub fn remove_reference(
        &mut self,
        source: EntityId,
        name: &str,
        target: EntityId,
    ) -> Result<ResolvedEdge> {
        let (relationship, src, dst) = self.resolve_edge(source, name, target)?;
        self.entities.validate(src)?;
        self.entities.validate(dst)?;
        let changed = self.index.remove(src, &relationship, dst);
        if changed {
            self.fields.touch(src);
            if src != dst {
                self.fields.touch(dst);
            }
        }
        Ok(ResolvedEdge {
            relationship,
            source: src,
            target: dst,
            changed,
        })
    }

    // --- Read API ---

    /// Checks if an entity is alive.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Validates that an entity is alive.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when it is not.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        self.entities.validate(id)
    }

    /// Returns the kind of a live entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn kind_of(&self, id: EntityId) -> Result<EntityKind> {
        self.entities.kind_of(id)
    }

    /// Returns the field record of a live entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn record(&self, id: EntityId) -> Result<&Record> {
        self.entities.validate(id)?;
        self.fields.get(id).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!("no record for live {id}")))
        })
    }

    /// Returns a field value of a live entity (nil when unset).
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn field(&self, id: EntityId, name: &str) -> Result<Value> {
        Ok(self.record(id)?.field(name).cloned().unwrap_or(Value::Nil))
    }

    /// Returns a live entity's revision counter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn revision(&self, id: EntityId) -> Result<u64> {
        Ok(self.record(id)?.revision())
    }

    /// Reads a relationship slot by canonical or inverse name.
    ///
    /// For a canonical name this is the entity's targets; for an inverse
    /// name it is the sources pointing at the entity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRelationship` for an undeclared name and
    /// `NotFound`/`Tombstone` when the entity is not alive.
    pub fn slot(&self, id: EntityId, name: &str) -> Result<Vec<EntityId>> {
        self.entities.validate(id)?;
        let resolved = self
            .schema
            .resolve(name)
            .ok_or_else(|| Error::unknown_relationship(name))?;
        if resolved.inverted {
            Ok(self.index.sources(id, &resolved.schema.name).collect())
        } else {
            Ok(self.index.targets(id, &resolved.schema.name).collect())
        }
    }

    /// Returns every outgoing reference of a live entity (canonical names).
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn references_from(&self, id: EntityId) -> Result<Vec<(Arc<str>, EntityId)>> {
        self.entities.validate(id)?;
        Ok(self.index.references_from(id))
    }

    /// Returns every incoming reference of a live entity (canonical names).
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn references_to(&self, id: EntityId) -> Result<Vec<(Arc<str>, EntityId)>> {
        self.entities.validate(id)?;
        Ok(self.index.references_to(id))
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the graph holds no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // --- Load Support ---

    /// Inserts an entity rebuilt from a persisted document at its explicit
    /// identifier. Field values must already be schema-checked by the codec.
    ///
    /// # Errors
    ///
    /// Returns a precondition error when the identifier is already
    /// allocated.
    pub fn insert_loaded(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        fields: std::collections::HashMap<Arc<str>, Value>,
    ) -> Result<()> {
        self.entities.insert(id, kind)?;
        self.fields.insert_unchecked(id, fields);
        Ok(())
    }

    /// Adds an edge rebuilt from a persisted document without liveness
    /// checks; load-time validation reports any dangling target afterwards.
    pub fn insert_loaded_reference(
        &mut self,
        source: EntityId,
        relationship: &Arc<str>,
        target: EntityId,
    ) {
        self.index.add(source, relationship, target);
    }

    /// Attaches opaque payloads preserved from a loaded document.
    pub fn set_opaque(
        &mut self,
        id: EntityId,
        fields: serde_json::Map<String, serde_json::Value>,
        references: std::collections::BTreeMap<String, Vec<u64>>,
    ) {
        self.fields.set_opaque(id, fields, references);
    }
}
