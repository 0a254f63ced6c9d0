//! Atomic, reversible edit commands.
//!
//! A [`Command`] describes one logical edit. Applying it against the graph
//! captures enough pre-state to build its exact reverse operation, producing
//! an [`AppliedCommand`] that can be reverted (undo) and reapplied (redo)
//! without full-graph snapshots.

use std::collections::BTreeSet;
use std::sync::Arc;

use worldgraph_foundation::{EntityId, EntityKind, Error, Result, Value};
use worldgraph_store::{DeleteSnapshot, Graph, ResolvedEdge};

use crate::changes::ChangeSet;

/// One atomic, reversible edit operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Create an entity with initial fields and references to existing
    /// entities.
    Create {
        /// Kind of the new entity.
        kind: EntityKind,
        /// Initial field values.
        fields: Vec<(Arc<str>, Value)>,
        /// Initial references; names may be canonical or inverse, targets
        /// must already exist.
        references: Vec<(Arc<str>, EntityId)>,
    },
    /// Delete an entity, cascading removal of every reference touching it.
    Delete {
        /// The entity to delete.
        id: EntityId,
    },
    /// Set one field to a new value (nil clears).
    SetField {
        /// The entity to edit.
        id: EntityId,
        /// Field name.
        field: Arc<str>,
        /// New value.
        value: Value,
    },
    /// Add a reference edge.
    AddReference {
        /// Source entity as addressed (canonicalized at apply time).
        source: EntityId,
        /// Canonical or inverse relationship name.
        relationship: Arc<str>,
        /// Target entity as addressed.
        target: EntityId,
    },
    /// Remove a reference edge.
    RemoveReference {
        /// Source entity as addressed.
        source: EntityId,
        /// Canonical or inverse relationship name.
        relationship: Arc<str>,
        /// Target entity as addressed.
        target: EntityId,
    },
}

impl Command {
    /// Creates a create command with no fields or references.
    #[must_use]
    pub fn create(kind: EntityKind) -> Self {
        Self::Create {
            kind,
            fields: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Adds an initial field to a create command.
    ///
    /// # Panics
    ///
    /// Panics when called on any other command variant.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        match &mut self {
            Self::Create { fields, .. } => fields.push((name.into(), value.into())),
            _ => panic!("initial fields belong to create commands"),
        }
        self
    }

    /// Adds an initial reference to a create command.
    ///
    /// # Panics
    ///
    /// Panics when called on any other command variant.
    #[must_use]
    pub fn reference(mut self, name: &str, target: EntityId) -> Self {
        match &mut self {
            Self::Create { references, .. } => references.push((name.into(), target)),
            _ => panic!("initial references belong to create commands"),
        }
        self
    }

    /// Creates a delete command.
    #[must_use]
    pub fn delete(id: EntityId) -> Self {
        Self::Delete { id }
    }

    /// Creates a set-field command.
    #[must_use]
    pub fn set_field(id: EntityId, field: &str, value: impl Into<Value>) -> Self {
        Self::SetField {
            id,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a clear-field command (sets the field to nil).
    #[must_use]
    pub fn clear_field(id: EntityId, field: &str) -> Self {
        Self::SetField {
            id,
            field: field.into(),
            value: Value::Nil,
        }
    }

    /// Creates an add-reference command.
    #[must_use]
    pub fn add_reference(source: EntityId, relationship: &str, target: EntityId) -> Self {
        Self::AddReference {
            source,
            relationship: relationship.into(),
            target,
        }
    }

    /// Creates a remove-reference command.
    #[must_use]
    pub fn remove_reference(source: EntityId, relationship: &str, target: EntityId) -> Self {
        Self::RemoveReference {
            source,
            relationship: relationship.into(),
            target,
        }
    }
}

/// How a revert is being driven.
///
/// The distinction matters only for creates: rolling back a failed
/// transaction deallocates the identifier entirely (nobody ever observed
/// it, and the graph must return byte for byte), while undoing a committed
/// create leaves a tombstone so redo can revive the exact identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RevertMode {
    /// Reverting a transaction that never committed.
    Rollback,
    /// Undoing a committed transaction.
    Undo,
}

/// A command that has been applied, carrying the captured pre-state needed
/// to revert or reapply it exactly.
#[derive(Clone, Debug)]
pub(crate) enum AppliedCommand {
    Create {
        id: EntityId,
        kind: EntityKind,
        fields: Vec<(Arc<str>, Value)>,
        /// Canonical edges added for the initial references.
        references: Vec<ResolvedEdge>,
        /// Pre-add revisions of the referenced (pre-existing) entities.
        neighbor_revisions: Vec<(EntityId, u64)>,
    },
    Delete {
        snapshot: DeleteSnapshot,
    },
    SetField {
        id: EntityId,
        field: Arc<str>,
        value: Value,
        previous: Value,
        prev_revision: u64,
    },
    AddReference {
        edge: ResolvedEdge,
        source_revision: u64,
        target_revision: u64,
    },
    RemoveReference {
        edge: ResolvedEdge,
        source_revision: u64,
        target_revision: u64,
    },
}

impl AppliedCommand {
    /// Applies a command's forward operation, capturing its reverse.
    ///
    /// A failing apply leaves the graph untouched: preconditions are checked
    /// before any mutation, so a command never half-applies.
    pub(crate) fn apply(graph: &mut Graph, command: Command) -> Result<Self> {
        match command {
            Command::Create {
                kind,
                fields,
                references,
            } => {
                // Check the references up front so the create never needs
                // unwinding: every name must resolve and every target must
                // be alive before the entity is allocated.
                let mut neighbor_revisions: Vec<(EntityId, u64)> = Vec::new();
                let mut seen: BTreeSet<EntityId> = BTreeSet::new();
                for (name, target) in &references {
                    graph
                        .schema()
                        .resolve(name)
                        .ok_or_else(|| Error::unknown_relationship(&**name))?;
                    let revision = graph.revision(*target)?;
                    if seen.insert(*target) {
                        neighbor_revisions.push((*target, revision));
                    }
                }

                let id = graph.create(kind, &fields)?;
                let mut edges = Vec::with_capacity(references.len());
                for (name, target) in &references {
                    edges.push(graph.add_reference(id, name, *target)?);
                }
                Ok(Self::Create {
                    id,
                    kind,
                    fields,
                    references: edges,
                    neighbor_revisions,
                })
            }
            Command::Delete { id } => {
                let snapshot = graph.delete(id)?;
                Ok(Self::Delete { snapshot })
            }
            Command::SetField { id, field, value } => {
                let prev_revision = graph.revision(id)?;
                let previous = graph.set_field(id, &field, &value)?;
                Ok(Self::SetField {
                    id,
                    field,
                    value,
                    previous,
                    prev_revision,
                })
            }
            Command::AddReference {
                source,
                relationship,
                target,
            } => {
                let source_rev = graph.revision(source)?;
                let target_rev = graph.revision(target)?;
                let edge = graph.add_reference(source, &relationship, target)?;
                let (source_revision, target_revision) = if edge.source == source {
                    (source_rev, target_rev)
                } else {
                    (target_rev, source_rev)
                };
                Ok(Self::AddReference {
                    edge,
                    source_revision,
                    target_revision,
                })
            }
            Command::RemoveReference {
                source,
                relationship,
                target,
            } => {
                let source_rev = graph.revision(source)?;
                let target_rev = graph.revision(target)?;
                let edge = graph.remove_reference(source, &relationship, target)?;
                let (source_revision, target_revision) = if edge.source == source {
                    (source_rev, target_rev)
                } else {
                    (target_rev, source_rev)
                };
                Ok(Self::RemoveReference {
                    edge,
                    source_revision,
                    target_revision,
                })
            }
        }
    }

    /// Applies the reverse operation, restoring the exact pre-apply state
    /// including revision counters.
    pub(crate) fn revert(&self, graph: &mut Graph, mode: RevertMode) -> Result<()> {
        match self {
            Self::Create {
                id,
                neighbor_revisions,
                ..
            } => {
                // Both paths cascade away the initial references; the
                // captured revisions then roll the neighbors back.
                match mode {
                    RevertMode::Rollback => graph.discard_create(*id)?,
                    RevertMode::Undo => {
                        graph.delete(*id)?;
                    }
                }
                for (neighbor, revision) in neighbor_revisions {
                    graph.set_revision(*neighbor, *revision)?;
                }
                Ok(())
            }
            Self::Delete { snapshot } => graph.restore(snapshot.clone()),
            Self::SetField {
                id,
                field,
                previous,
                prev_revision,
                ..
            } => {
                graph.set_field(*id, field, previous)?;
                graph.set_revision(*id, *prev_revision)
            }
            Self::AddReference {
                edge,
                source_revision,
                target_revision,
            } => {
                if edge.changed {
                    graph.remove_reference(edge.source, &edge.relationship, edge.target)?;
                    graph.set_revision(edge.source, *source_revision)?;
                    graph.set_revision(edge.target, *target_revision)?;
                }
                Ok(())
            }
            Self::RemoveReference {
                edge,
                source_revision,
                target_revision,
            } => {
                if edge.changed {
                    graph.add_reference(edge.source, &edge.relationship, edge.target)?;
                    graph.set_revision(edge.source, *source_revision)?;
                    graph.set_revision(edge.target, *target_revision)?;
                }
                Ok(())
            }
        }
    }

    /// Re-applies the forward operation after an undo.
    ///
    /// Creates and deletes revive their original identifiers; tombstones
    /// make that possible without identifier reuse.
    pub(crate) fn reapply(&mut self, graph: &mut Graph) -> Result<()> {
        match self {
            Self::Create {
                id,
                kind,
                fields,
                references,
                ..
            } => {
                graph.create_at(*id, *kind, fields)?;
                for edge in references.iter() {
                    graph.add_reference(edge.source, &edge.relationship, edge.target)?;
                }
                Ok(())
            }
            Self::Delete { snapshot } => {
                *snapshot = graph.delete(snapshot.id)?;
                Ok(())
            }
            Self::SetField {
                id, field, value, ..
            } => {
                graph.set_field(*id, field, value)?;
                Ok(())
            }
            Self::AddReference { edge, .. } => {
                if edge.changed {
                    graph.add_reference(edge.source, &edge.relationship, edge.target)?;
                }
                Ok(())
            }
            Self::RemoveReference { edge, .. } => {
                if edge.changed {
                    graph.remove_reference(edge.source, &edge.relationship, edge.target)?;
                }
                Ok(())
            }
        }
    }

    /// Records this command's contribution to a transaction's change set.
    pub(crate) fn record_changes(&self, changes: &mut ChangeSet) {
        match self {
            Self::Create {
                id,
                neighbor_revisions,
                ..
            } => {
                changes.record_created(*id);
                for (neighbor, _) in neighbor_revisions {
                    changes.record_modified(*neighbor);
                }
            }
            Self::Delete { snapshot } => {
                changes.record_deleted(snapshot.id);
                for (neighbor, _) in &snapshot.neighbor_revisions {
                    changes.record_modified(*neighbor);
                }
            }
            Self::SetField { id, .. } => changes.record_modified(*id),
            Self::AddReference { edge, .. } | Self::RemoveReference { edge, .. } => {
                if edge.changed {
                    changes.record_modified(edge.source);
                    changes.record_modified(edge.target);
                }
            }
        }
    }
}
