//! Transactions: ordered command groups committed as a unit.

use crate::command::Command;

/// An ordered sequence of commands that succeeds or fails as a unit.
///
/// The label is what an editor shows next to undo/redo menu entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    label: String,
    commands: Vec<Command>,
}

impl Transaction {
    /// Creates an empty transaction with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    /// Creates a transaction holding a single command.
    #[must_use]
    pub fn single(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            commands: vec![command],
        }
    }

    /// Appends a command (builder form).
    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the commands in application order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns true when the transaction holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Decomposes the transaction into its label and commands.
    #[must_use]
    pub(crate) fn into_parts(self) -> (String, Vec<Command>) {
        (self.label, self.commands)
    }
}
