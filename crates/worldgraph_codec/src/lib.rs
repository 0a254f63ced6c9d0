//! Versioned JSON persistence for WorldGraph documents.
//!
//! This crate provides:
//! - [`WorldDocument`] - The self-describing document model
//! - [`to_document`] / [`from_document`] - Graph <-> document conversion
//! - [`save_to_file`] / [`load_from_file`] - Filesystem round-trip
//!
//! Only entities (identifier, kind, fields, references) are persisted; the
//! relationship index is rebuilt and undo history reset on load. Unknown
//! field and relationship names are preserved opaquely and round-tripped on
//! the next save.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod document;
mod serialize;

pub use document::{EntityDoc, FORMAT_VERSION, ValueDoc, WorldDocument};
pub use serialize::{
    from_document, from_json_str, load_from_file, load_from_reader, save_to_file, save_to_writer,
    to_document, to_json_string,
};
