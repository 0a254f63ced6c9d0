//! Change notification sets.
//!
//! After every committed transaction (and every undo/redo) the engine
//! reports which entities were created, modified, or deleted, so the
//! presentation layer can refresh only affected views.

use std::collections::BTreeSet;

use worldgraph_foundation::EntityId;

/// The net effect of one committed transaction on the entity set.
///
/// The three sets are disjoint: an entity created and then edited within the
/// same transaction appears only in `created`; one created and deleted in
/// the same transaction appears nowhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Entities that did not exist before the transaction.
    pub created: BTreeSet<EntityId>,
    /// Entities whose fields, references, or revision changed.
    pub modified: BTreeSet<EntityId>,
    /// Entities deleted by the transaction.
    pub deleted: BTreeSet<EntityId>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Records an entity creation.
    pub fn record_created(&mut self, id: EntityId) {
        self.deleted.remove(&id);
        self.modified.remove(&id);
        self.created.insert(id);
    }

    /// Records an entity modification.
    ///
    /// Modifications to entities already recorded as created or deleted in
    /// this set are absorbed; the stronger classification wins.
    pub fn record_modified(&mut self, id: EntityId) {
        if !self.created.contains(&id) && !self.deleted.contains(&id) {
            self.modified.insert(id);
        }
    }

    /// Records an entity deletion.
    ///
    /// Deleting an entity created in the same transaction cancels out: the
    /// outside world never saw it.
    pub fn record_deleted(&mut self, id: EntityId) {
        self.modified.remove(&id);
        if !self.created.remove(&id) {
            self.deleted.insert(id);
        }
    }

    /// Returns the notification describing the reverse application of this
    /// change set: creations become deletions and vice versa.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            created: self.deleted.clone(),
            modified: self.modified.clone(),
            deleted: self.created.clone(),
        }
    }
}
