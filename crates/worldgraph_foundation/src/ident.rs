//! Entity identifiers and kind tags.

use std::fmt;

/// Stable entity identifier.
///
/// Identifiers are allocated monotonically by the store and are never reused,
/// even after the entity is deleted (tombstone semantics). This keeps every
/// identifier recorded in the command log meaningful for redo.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId {
    /// Serial index into entity storage.
    index: u64,
}

impl EntityId {
    /// Creates an entity ID from a raw serial index.
    #[must_use]
    pub const fn from_raw(index: u64) -> Self {
        Self { index }
    }

    /// Returns the raw serial index of this identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.index
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.index)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.index)
    }
}

/// The kind of a world entity.
///
/// Every entity carries exactly one kind tag for its whole lifetime. Field
/// and relationship schemas are declared per kind.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum EntityKind {
    /// A place in the world (region, settlement, landmark).
    Location,
    /// A person or creature.
    Character,
    /// An organization, house, or other allegiance group.
    Faction,
    /// A timeline event.
    Event,
    /// Free-form authorial annotation.
    Note,
    /// A media asset (image, audio, video, document).
    Asset,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 6] = [
        Self::Location,
        Self::Character,
        Self::Faction,
        Self::Event,
        Self::Note,
        Self::Asset,
    ];

    /// Returns the canonical lowercase name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Character => "character",
            Self::Faction => "faction",
            Self::Event => "event",
            Self::Note => "note",
            Self::Asset => "asset",
        }
    }

    /// Parses a canonical kind name.
    ///
    /// Returns `None` for names outside the kind set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "location" => Some(Self::Location),
            "character" => Some(Self::Character),
            "faction" => Some(Self::Faction),
            "event" => Some(Self::Event),
            "note" => Some(Self::Note),
            "asset" => Some(Self::Asset),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
