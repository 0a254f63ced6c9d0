//! Relationship index with bidirectional lookups.
//!
//! References connect entities with typed, directed edges. The index keeps a
//! forward and a reverse view that are updated together inside every call,
//! so readers never observe the two views out of step, even transiently.
//!
//! Edges are stored under their canonical relationship name only; inverse
//! name resolution happens in the graph, which consults the world schema.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use worldgraph_foundation::EntityId;

/// One directed reference edge in canonical direction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    /// Relationship name (canonical).
    pub relationship: Arc<str>,
    /// Source entity.
    pub source: EntityId,
    /// Target entity.
    pub target: EntityId,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.relationship, self.target)
    }
}

/// Stores reference edges between entities.
///
/// Maintains bidirectional indices for O(log n) traversal in both
/// directions:
/// - Forward: source -> relationship -> targets
/// - Reverse: target -> relationship -> sources
///
/// Target and source sets are ordered so iteration and persistence are
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipIndex {
    forward: HashMap<EntityId, BTreeMap<Arc<str>, BTreeSet<EntityId>>>,
    reverse: HashMap<EntityId, BTreeMap<Arc<str>, BTreeSet<EntityId>>>,
}

impl RelationshipIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge to both views.
    ///
    /// Returns false when the edge already existed (adding is idempotent).
    pub fn add(&mut self, source: EntityId, relationship: &Arc<str>, target: EntityId) -> bool {
        let inserted = self
            .forward
            .entry(source)
            .or_default()
            .entry(Arc::clone(relationship))
            .or_default()
            .insert(target);
        if inserted {
            self.reverse
                .entry(target)
                .or_default()
                .entry(Arc::clone(relationship))
                .or_default()
                .insert(source);
        }
        inserted
    }

    /// Removes an edge from both views.
    ///
    /// Returns false when the edge did not exist (removing is idempotent).
    pub fn remove(&mut self, source: EntityId, relationship: &str, target: EntityId) -> bool {
        let removed = Self::remove_half(&mut self.forward, source, relationship, target);
        if removed {
            Self::remove_half(&mut self.reverse, target, relationship, source);
        }
        removed
    }

    /// Removes one direction of an edge, pruning empty containers so that
    /// two indices holding the same edges always compare equal.
    fn remove_half(
        half: &mut HashMap<EntityId, BTreeMap<Arc<str>, BTreeSet<EntityId>>>,
        key: EntityId,
        relationship: &str,
        member: EntityId,
    ) -> bool {
        let Some(slots) = half.get_mut(&key) else {
            return false;
        };
        let Some(set) = slots.get_mut(relationship) else {
            return false;
        };
        let removed = set.remove(&member);
        if set.is_empty() {
            slots.remove(relationship);
        }
        if slots.is_empty() {
            half.remove(&key);
        }
        removed
    }

    /// Checks if a specific edge exists.
    #[must_use]
    pub fn has_edge(&self, source: EntityId, relationship: &str, target: EntityId) -> bool {
        self.forward
            .get(&source)
            .and_then(|slots| slots.get(relationship))
            .is_some_and(|set| set.contains(&target))
    }

    /// Gets the targets of a slot (forward traversal), in identifier order.
    pub fn targets(
        &self,
        source: EntityId,
        relationship: &str,
    ) -> impl Iterator<Item = EntityId> + '_ {
        self.forward
            .get(&source)
            .and_then(|slots| slots.get(relationship))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Gets the sources pointing at a target (reverse traversal).
    pub fn sources(
        &self,
        target: EntityId,
        relationship: &str,
    ) -> impl Iterator<Item = EntityId> + '_ {
        self.reverse
            .get(&target)
            .and_then(|slots| slots.get(relationship))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns every outgoing reference of an entity as (name, target) pairs.
    #[must_use]
    pub fn references_from(&self, id: EntityId) -> Vec<(Arc<str>, EntityId)> {
        self.forward
            .get(&id)
            .into_iter()
            .flat_map(|slots| {
                slots.iter().flat_map(|(name, targets)| {
                    targets.iter().map(|t| (Arc::clone(name), *t))
                })
            })
            .collect()
    }

    /// Returns every incoming reference of an entity as (name, source) pairs.
    #[must_use]
    pub fn references_to(&self, id: EntityId) -> Vec<(Arc<str>, EntityId)> {
        self.reverse
            .get(&id)
            .into_iter()
            .flat_map(|slots| {
                slots.iter().flat_map(|(name, sources)| {
                    sources.iter().map(|s| (Arc::clone(name), *s))
                })
            })
            .collect()
    }

    /// Removes every edge touching an entity, in both directions.
    ///
    /// Returns the removed edges in canonical direction, sorted, so callers
    /// can capture them for undo.
    pub fn detach(&mut self, id: EntityId) -> Vec<Edge> {
        let mut removed = Vec::new();

        if let Some(slots) = self.forward.remove(&id) {
            for (name, targets) in slots {
                for target in targets {
                    Self::remove_half(&mut self.reverse, target, &name, id);
                    removed.push(Edge {
                        relationship: Arc::clone(&name),
                        source: id,
                        target,
                    });
                }
            }
        }

        if let Some(slots) = self.reverse.remove(&id) {
            for (name, sources) in slots {
                for source in sources {
                    Self::remove_half(&mut self.forward, source, &name, id);
                    removed.push(Edge {
                        relationship: Arc::clone(&name),
                        source,
                        target: id,
                    });
                }
            }
        }

        removed.sort();
        removed
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    /// Iterates over every edge in the graph, in canonical direction.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.forward.iter().flat_map(|(source, slots)| {
            slots.iter().flat_map(move |(name, targets)| {
                targets.iter().map(move |target| Edge {
                    relationship: Arc::clone(name),
                    source: *source,
                    target: *target,
                })
            })
        })
    }
}
