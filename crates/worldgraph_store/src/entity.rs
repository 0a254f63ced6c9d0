//! Entity lifecycle management with tombstone semantics.
//!
//! The `EntityStore` allocates identifiers monotonically and never reuses
//! them: a destroyed entity leaves a tombstone in its slot. Tombstones keep
//! identifiers recorded in the command log meaningful, so undo and redo can
//! revive the exact entity they name.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use worldgraph_foundation::{EntityId, EntityKind, Error, ErrorKind, Result};

/// State of one identifier slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    /// The entity is alive.
    Live(EntityKind),
    /// The entity was deleted; the identifier is permanently retired
    /// unless revived by undo/redo.
    Tombstone(EntityKind),
}

/// Manages entity identity and lifecycle.
///
/// Slots are indexed by identifier serial. `None` marks a serial that was
/// never allocated (only possible after loading a document with gaps in its
/// identifier sequence).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityStore {
    slots: Vec<Option<Slot>>,
    live_count: usize,
}

impl EntityStore {
    /// Creates a new empty entity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh identifier for an entity of the given kind.
    ///
    /// Identifiers are monotonically increasing and never reused.
    pub fn spawn(&mut self, kind: EntityKind) -> EntityId {
        let index = self.slots.len() as u64;
        self.slots.push(Some(Slot::Live(kind)));
        self.live_count += 1;
        EntityId::from_raw(index)
    }

    /// Inserts a live entity at an explicit identifier.
    ///
    /// Used when reconstructing a store from a persisted document. Serials
    /// between the current high-water mark and `id` are left unallocated.
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the slot is already occupied.
    pub fn insert(&mut self, id: EntityId, kind: EntityKind) -> Result<()> {
        let idx = id.raw() as usize;
        if idx < self.slots.len() && self.slots[idx].is_some() {
            return Err(Error::precondition(format!(
                "identifier already allocated: {id}"
            )));
        }
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(Slot::Live(kind));
        self.live_count += 1;
        Ok(())
    }

    /// Destroys an entity, leaving a tombstone in its slot.
    ///
    /// Returns the kind of the destroyed entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a never-allocated identifier and `Tombstone`
    /// for an already-deleted one.
    pub fn destroy(&mut self, id: EntityId) -> Result<EntityKind> {
        self.validate(id)?;
        let idx = id.raw() as usize;
        let Some(Slot::Live(kind)) = self.slots[idx] else {
            unreachable!("validate guarantees a live slot");
        };
        self.slots[idx] = Some(Slot::Tombstone(kind));
        self.live_count -= 1;
        Ok(kind)
    }

    /// Revives a tombstoned entity in place.
    ///
    /// Only undo/redo revives identifiers; a tombstone is otherwise final.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a never-allocated identifier and a
    /// precondition error if the entity is still alive.
    pub fn revive(&mut self, id: EntityId) -> Result<EntityKind> {
        let idx = id.raw() as usize;
        match self.slots.get(idx).copied().flatten() {
            None => Err(Error::not_found(id)),
            Some(Slot::Live(_)) => Err(Error::precondition(format!(
                "cannot revive live entity: {id}"
            ))),
            Some(Slot::Tombstone(kind)) => {
                self.slots[idx] = Some(Slot::Live(kind));
                self.live_count += 1;
                Ok(kind)
            }
        }
    }

    /// Deallocates the most recent allocation entirely, rewinding the
    /// serial counter.
    ///
    /// Only the rollback of a never-committed create uses this: the
    /// identifier never escaped the failed transaction, so no tombstone is
    /// owed and the pre-transaction store is restored byte for byte. A
    /// committed create is undone with [`EntityStore::destroy`] instead,
    /// which keeps the identifier reserved for redo.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the entity is not the latest live
    /// allocation.
    pub fn discard(&mut self, id: EntityId) -> Result<()> {
        self.validate(id)?;
        let idx = id.raw() as usize;
        if idx + 1 != self.slots.len() {
            return Err(Error::new(ErrorKind::Internal(format!(
                "cannot discard {id}: not the most recent allocation"
            ))));
        }
        self.slots.pop();
        self.live_count -= 1;
        Ok(())
    }

    /// Checks if an entity is alive.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        matches!(
            self.slots.get(id.raw() as usize).copied().flatten(),
            Some(Slot::Live(_))
        )
    }

    /// Validates that an entity is alive.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a never-allocated identifier and `Tombstone`
    /// for a deleted one.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        match self.slots.get(id.raw() as usize).copied().flatten() {
            Some(Slot::Live(_)) => Ok(()),
            Some(Slot::Tombstone(_)) => Err(Error::tombstone(id)),
            None => Err(Error::not_found(id)),
        }
    }

    /// Returns the kind of a live entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Tombstone` when the entity is not alive.
    pub fn kind_of(&self, id: EntityId) -> Result<EntityKind> {
        match self.slots.get(id.raw() as usize).copied().flatten() {
            Some(Slot::Live(kind)) => Ok(kind),
            Some(Slot::Tombstone(_)) => Err(Error::tombstone(id)),
            None => Err(Error::not_found(id)),
        }
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Returns the number of tombstoned identifiers.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Some(Slot::Tombstone(_))))
            .count()
    }

    /// Iterates over all live entities in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityKind)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            if let Some(Slot::Live(kind)) = slot {
                Some((EntityId::from_raw(idx as u64), *kind))
            } else {
                None
            }
        })
    }
}
