//! Commands, transactions, undo/redo, and validation for WorldGraph.
//!
//! This crate provides:
//! - [`Command`] - One atomic, reversible edit
//! - [`Transaction`] - An ordered group of commands committed as a unit
//! - [`Session`] - One open document: graph, history, and commit protocol
//! - [`ChangeSet`] - The change-notification contract
//! - [`check_invariants`] - The graph invariant checks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod changes;
mod command;
mod history;
mod session;
mod transaction;
mod validate;

pub use changes::ChangeSet;
pub use command::Command;
pub use history::{CommittedTransaction, History};
pub use session::{CommitReceipt, Session};
pub use transaction::Transaction;
pub use validate::{ValidationReport, check_invariants, validate_graph};
