//! Session state for one open document.
//!
//! The session owns the graph, the undo/redo history, and the commit
//! protocol: apply commands in order, capture reverse operations, validate
//! the end state, and either commit or roll back. Mutations only flow
//! through [`Session::execute`], [`Session::undo`], [`Session::redo`], and
//! [`Session::replace_graph`]; between those calls the graph is free to
//! read.

use std::sync::Arc;

use tracing::{debug, warn};

use worldgraph_foundation::{Error, ErrorKind, Result, Violation};
use worldgraph_store::{Graph, WorldSchema, catalog};

use crate::changes::ChangeSet;
use crate::command::{AppliedCommand, RevertMode};
use crate::history::{CommittedTransaction, History};
use crate::transaction::Transaction;
use crate::validate;

/// What a successful commit reports back to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitReceipt {
    /// The committed transaction's label.
    pub label: String,
    /// Entities created, modified, and deleted.
    pub changes: ChangeSet,
    /// Warning-severity violations present after the commit (reported,
    /// never auto-repaired).
    pub warnings: Vec<Violation>,
}

/// One open document: graph, history, and commit protocol.
///
/// Construct a fresh session over a schema, or adopt a graph rebuilt by the
/// persistence codec via [`Session::replace_graph`]. Dropping the session
/// discards all in-memory state; nothing is shared between sessions.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    history: History,
    /// Set when a rollback itself failed. The graph can no longer be
    /// trusted; every operation except a reload is refused.
    faulted: bool,
}

impl Session {
    /// Creates an empty session over the given schema.
    #[must_use]
    pub fn new(schema: Arc<WorldSchema>) -> Self {
        Self {
            graph: Graph::new(schema),
            history: History::new(),
            faulted: false,
        }
    }

    /// Creates an empty session over the standard world-building schema.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Arc::new(catalog::standard_schema()))
    }

    /// Returns the graph for reading.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns true when a failed rollback has poisoned this session and
    /// only a reload can recover it.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Returns true when there is a transaction to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.faulted && self.history.can_undo()
    }

    /// Returns true when there is a transaction to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.faulted && self.history.can_redo()
    }

    /// Returns the label of the transaction undo would revert.
    #[must_use]
    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    /// Returns the label of the transaction redo would reapply.
    #[must_use]
    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    /// Executes a transaction: applies every command in order, validates
    /// the end state, and commits — or rolls the graph back to exactly its
    /// pre-transaction state and reports why.
    ///
    /// On success the transaction lands on the undo stack as one unit and
    /// the redo stack is cleared.
    ///
    /// # Errors
    ///
    /// Per-command failures (`NotFound`, `Tombstone`, `TypeMismatch`,
    /// `PreconditionFailed`, ...) and post-transaction `ValidationFailed`
    /// all roll back and surface unchanged. An internal error marks the
    /// session faulted.
    pub fn execute(&mut self, transaction: Transaction) -> Result<CommitReceipt> {
        self.check_fault()?;
        let (label, commands) = transaction.into_parts();
        if commands.is_empty() {
            return Ok(CommitReceipt {
                label,
                changes: ChangeSet::new(),
                warnings: Vec::new(),
            });
        }

        let mut applied: Vec<AppliedCommand> = Vec::with_capacity(commands.len());
        let mut changes = ChangeSet::new();

        for command in commands {
            match AppliedCommand::apply(&mut self.graph, command) {
                Ok(done) => {
                    done.record_changes(&mut changes);
                    applied.push(done);
                }
                Err(err) => {
                    debug!(label = %label, error = %err, "command failed, rolling back");
                    self.rollback(&applied)?;
                    return Err(err);
                }
            }
        }

        let report = validate::validate_graph(&self.graph);
        if !report.is_ok() {
            debug!(
                label = %label,
                violations = report.blocking.len(),
                "validation failed, rolling back"
            );
            self.rollback(&applied)?;
            return Err(Error::validation_failed(report.blocking));
        }

        if !report.warnings.is_empty() {
            warn!(
                label = %label,
                warnings = report.warnings.len(),
                "transaction committed with warnings"
            );
        }
        debug!(
            label = %label,
            created = changes.created.len(),
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            "transaction committed"
        );

        self.history
            .commit(CommittedTransaction::new(label.clone(), applied, changes.clone()));
        Ok(CommitReceipt {
            label,
            changes,
            warnings: report.warnings,
        })
    }

    /// Undoes the most recent transaction.
    ///
    /// Returns the notification describing the net effect, or `None` when
    /// there was nothing to undo.
    ///
    /// # Errors
    ///
    /// An internal failure while reverting marks the session faulted.
    pub fn undo(&mut self) -> Result<Option<ChangeSet>> {
        self.check_fault()?;
        let Some(transaction) = self.history.pop_undo() else {
            return Ok(None);
        };

        for command in transaction.applied().iter().rev() {
            if let Err(err) = command.revert(&mut self.graph, RevertMode::Undo) {
                self.faulted = true;
                return Err(Self::fault_error(&err));
            }
        }

        debug!(label = transaction.label(), "transaction undone");
        let notification = transaction.changes().inverted();
        self.history.push_redo(transaction);
        Ok(Some(notification))
    }

    /// Redoes the most recently undone transaction.
    ///
    /// Returns the notification describing the net effect, or `None` when
    /// there was nothing to redo.
    ///
    /// # Errors
    ///
    /// An internal failure while reapplying marks the session faulted.
    pub fn redo(&mut self) -> Result<Option<ChangeSet>> {
        self.check_fault()?;
        let Some(mut transaction) = self.history.pop_redo() else {
            return Ok(None);
        };

        for command in transaction.applied_mut() {
            if let Err(err) = command.reapply(&mut self.graph) {
                self.faulted = true;
                return Err(Self::fault_error(&err));
            }
        }

        debug!(label = transaction.label(), "transaction redone");
        let notification = transaction.changes().clone();
        self.history.push_undo(transaction);
        Ok(Some(notification))
    }

    /// Replaces the graph wholesale (a successful load).
    ///
    /// The new graph is a fresh baseline: both history stacks are cleared
    /// and any fault state is recovered.
    pub fn replace_graph(&mut self, graph: Graph) {
        debug!(entities = graph.len(), "graph replaced, history cleared");
        self.graph = graph;
        self.history.clear();
        self.faulted = false;
    }

    /// Reverts already-applied commands in strict reverse order.
    fn rollback(&mut self, applied: &[AppliedCommand]) -> Result<()> {
        for command in applied.iter().rev() {
            if let Err(err) = command.revert(&mut self.graph, RevertMode::Rollback) {
                self.faulted = true;
                return Err(Self::fault_error(&err));
            }
        }
        Ok(())
    }

    fn check_fault(&self) -> Result<()> {
        if self.faulted {
            return Err(Error::new(ErrorKind::Internal(
                "session is faulted; reload the document to recover".to_string(),
            )));
        }
        Ok(())
    }

    fn fault_error(cause: &Error) -> Error {
        Error::new(ErrorKind::Internal(format!(
            "rollback failed, session faulted: {cause}"
        )))
    }
}
