//! Entity storage, relationships, schemas, and graph state for WorldGraph.
//!
//! This crate provides:
//! - [`EntityStore`] - Identifier allocation with tombstone semantics
//! - [`FieldStore`] - Typed field records with revision counters
//! - [`RelationshipIndex`] - Bidirectional reference indices
//! - [`WorldSchema`] - Kind, field, and relationship declarations
//! - [`Graph`] - The unified mutable world state
//! - [`catalog`] - The standard world-building schema

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
mod entity;
mod fields;
mod graph;
mod relationship;
pub mod schema;

pub use entity::EntityStore;
pub use fields::{FieldStore, Record};
pub use graph::{DeleteSnapshot, Graph, ResolvedEdge};
pub use relationship::{Edge, RelationshipIndex};
pub use schema::{Cardinality, FieldSchema, KindSchema, RelationshipSchema, WorldSchema};
