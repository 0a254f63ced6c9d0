//! Undo/redo stacks.
//!
//! History is linear: committing a new transaction after an undo discards
//! the redo stack, so there is never a branching timeline.

use crate::changes::ChangeSet;
use crate::command::AppliedCommand;

/// A transaction that has been applied, with its captured reverse
/// operations and its change notification.
#[derive(Clone, Debug)]
pub struct CommittedTransaction {
    label: String,
    applied: Vec<AppliedCommand>,
    changes: ChangeSet,
}

impl CommittedTransaction {
    pub(crate) fn new(label: String, applied: Vec<AppliedCommand>, changes: ChangeSet) -> Self {
        Self {
            label,
            applied,
            changes,
        }
    }

    /// Returns the transaction's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the transaction's change notification.
    #[must_use]
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub(crate) fn applied(&self) -> &[AppliedCommand] {
        &self.applied
    }

    pub(crate) fn applied_mut(&mut self) -> &mut [AppliedCommand] {
        &mut self.applied
    }
}

/// The undo and redo stacks for one editing session.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<CommittedTransaction>,
    redo: Vec<CommittedTransaction>,
}

impl History {
    /// Creates empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly committed transaction and clears the redo stack
    /// (linear history: a manual edit after an undo forks nothing).
    pub fn commit(&mut self, transaction: CommittedTransaction) {
        self.undo.push(transaction);
        self.redo.clear();
    }

    /// Pops the most recent transaction for undoing.
    pub fn pop_undo(&mut self) -> Option<CommittedTransaction> {
        self.undo.pop()
    }

    /// Parks an undone transaction on the redo stack.
    pub fn push_redo(&mut self, transaction: CommittedTransaction) {
        self.redo.push(transaction);
    }

    /// Pops the most recently undone transaction for redoing.
    pub fn pop_redo(&mut self) -> Option<CommittedTransaction> {
        self.redo.pop()
    }

    /// Parks a redone transaction back on the undo stack without touching
    /// the redo stack.
    pub fn push_undo(&mut self, transaction: CommittedTransaction) {
        self.undo.push(transaction);
    }

    /// Returns true when there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns true when there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Returns the label of the next transaction undo would revert.
    #[must_use]
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(CommittedTransaction::label)
    }

    /// Returns the label of the next transaction redo would reapply.
    #[must_use]
    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(CommittedTransaction::label)
    }

    /// Returns the number of undoable transactions.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Returns the number of redoable transactions.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Discards both stacks (a successful load starts a fresh baseline).
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
