//! WorldGraph - The world graph engine for world-building editors
//!
//! This crate re-exports all layers of the WorldGraph system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: worldgraph_codec      — Versioned JSON persistence
//! Layer 2: worldgraph_engine     — Commands, transactions, undo/redo, validation
//! Layer 1: worldgraph_store      — Entities, fields, relationships, schemas
//! Layer 0: worldgraph_foundation — Core types (Value, EntityId, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use worldgraph::engine::{Command, Session, Transaction};
//! use worldgraph::foundation::EntityKind;
//!
//! let mut session = Session::standard();
//! let receipt = session
//!     .execute(Transaction::single(
//!         "Create Port City",
//!         Command::create(EntityKind::Location).field("name", "Port City"),
//!     ))
//!     .unwrap();
//! let port = *receipt.changes.created.iter().next().unwrap();
//!
//! session
//!     .execute(Transaction::single(
//!         "Create Mira",
//!         Command::create(EntityKind::Character)
//!             .field("name", "Mira")
//!             .reference("resides-in", port),
//!     ))
//!     .unwrap();
//!
//! assert!(session.can_undo());
//! ```

pub use worldgraph_codec as codec;
pub use worldgraph_engine as engine;
pub use worldgraph_foundation as foundation;
pub use worldgraph_store as store;
