//! Core types for the WorldGraph engine.
//!
//! This crate provides:
//! - [`EntityId`] / [`EntityKind`] - Stable identifiers and kind tags
//! - [`Value`] - The tagged variant type for entity field values
//! - [`Type`] - Type descriptors for schema validation
//! - [`Error`] - Rich error types
//! - [`Violation`] - Structured invariant violations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod ident;
mod types;
mod value;

pub use error::{Error, ErrorKind, Severity, Violation};
pub use ident::{EntityId, EntityKind};
pub use types::Type;
pub use value::Value;

/// Convenient result alias for WorldGraph operations.
pub type Result<T> = std::result::Result<T, Error>;
