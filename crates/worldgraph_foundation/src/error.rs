//! Error types for the WorldGraph engine.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::ident::{EntityId, EntityKind};
use crate::types::Type;
use crate::value::Value;

/// The main error type for WorldGraph operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an entity-not-found error.
    #[must_use]
    pub fn not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::NotFound(id))
    }

    /// Creates a tombstoned-entity error.
    #[must_use]
    pub fn tombstone(id: EntityId) -> Self {
        Self::new(ErrorKind::Tombstone(id))
    }

    /// Creates a type mismatch error for a field.
    #[must_use]
    pub fn type_mismatch(field: impl Into<String>, expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        })
    }

    /// Creates an unknown-field error.
    #[must_use]
    pub fn unknown_field(kind: EntityKind, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownField {
            kind,
            field: field.into(),
        })
    }

    /// Creates an unknown-relationship error.
    #[must_use]
    pub fn unknown_relationship(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownRelationship(name.into()))
    }

    /// Creates an invalid-choice error.
    #[must_use]
    pub fn invalid_choice(field: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidChoice {
            field: field.into(),
            token: token.into(),
        })
    }

    /// Creates a precondition-failed error.
    #[must_use]
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::PreconditionFailed(reason.into()))
    }

    /// Creates a validation-failed error from a violation list.
    #[must_use]
    pub fn validation_failed(violations: Vec<Violation>) -> Self {
        Self::new(ErrorKind::ValidationFailed(violations))
    }

    /// Creates a parse error for a malformed document.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError(message.into()))
    }

    /// Creates a schema error for a well-formed but invalid document.
    #[must_use]
    pub fn schema(message: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self::new(ErrorKind::SchemaError {
            message: message.into(),
            violations,
        })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Identifier was never allocated.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// Identifier refers to a deleted (tombstoned) entity.
    #[error("entity deleted: {0}")]
    Tombstone(EntityId),

    /// Field value type disagrees with the kind's schema.
    #[error("type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// The field being set.
        field: String,
        /// The declared type.
        expected: Type,
        /// The supplied value's type.
        actual: Type,
    },

    /// Field name is not declared for the entity kind.
    #[error("unknown field '{field}' for kind {kind}")]
    UnknownField {
        /// The entity kind.
        kind: EntityKind,
        /// The undeclared field name.
        field: String,
    },

    /// Relationship name is not declared in the world schema.
    #[error("unknown relationship: {0}")]
    UnknownRelationship(String),

    /// Enumeration token is not among the field's declared options.
    #[error("invalid choice '{token}' for field '{field}'")]
    InvalidChoice {
        /// The choice field.
        field: String,
        /// The rejected token.
        token: String,
    },

    /// A command's required prior state is absent.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Post-transaction invariant check failed; the transaction was rolled back.
    #[error("validation failed: {}", format_violations(.0))]
    ValidationFailed(Vec<Violation>),

    /// Persisted document is malformed.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Persisted document is well-formed but describes an invalid graph.
    #[error("schema error: {message}")]
    SchemaError {
        /// Description of the defect.
        message: String,
        /// Invariant violations found during load, if any.
        violations: Vec<Violation>,
    },

    /// Filesystem failure while reading or writing a document.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_violations(violations: &[Violation]) -> String {
    let items: Vec<String> = violations.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join("; "))
}

/// Severity of an invariant violation.
///
/// Blocking violations roll the offending transaction back; warning
/// violations are reported on the commit receipt but never block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The transaction must be rolled back.
    Blocking,
    /// Reported, tolerated, never auto-repaired.
    Warning,
}

/// A detected breach of a graph invariant.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// A reference targets an identifier that does not resolve to a live entity.
    DanglingReference {
        /// Source of the edge.
        source: EntityId,
        /// Relationship name (canonical direction).
        relationship: String,
        /// The unresolved target.
        target: EntityId,
    },

    /// A cardinality-"one" slot holds more than one target.
    CardinalityExceeded {
        /// Source whose slot overflowed.
        source: EntityId,
        /// Relationship name.
        relationship: String,
        /// Number of targets found.
        count: usize,
    },

    /// An edge endpoint's kind is not permitted by the relationship schema.
    KindMismatch {
        /// Relationship name.
        relationship: String,
        /// The offending endpoint.
        entity: EntityId,
        /// The endpoint's actual kind.
        kind: EntityKind,
    },

    /// Two entities of a kind share a value in a field declared unique.
    DuplicateUnique {
        /// The entity kind.
        kind: EntityKind,
        /// The unique field.
        field: String,
        /// The shared value.
        value: Value,
        /// Every entity holding the value.
        entities: Vec<EntityId>,
    },

    /// A required cardinality-"one" slot is empty.
    MissingRequiredReference {
        /// Entity whose slot is empty.
        entity: EntityId,
        /// Relationship name.
        relationship: String,
    },
}

impl Violation {
    /// Returns the severity of this violation.
    ///
    /// A missing required reference — the state cascade-delete can create —
    /// is reported but never blocks; everything else rolls back.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingRequiredReference { .. } => Severity::Warning,
            _ => Severity::Blocking,
        }
    }

    /// Returns true if this violation must roll the transaction back.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self.severity(), Severity::Blocking)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference {
                source,
                relationship,
                target,
            } => {
                write!(f, "dangling reference {source} -[{relationship}]-> {target}")
            }
            Self::CardinalityExceeded {
                source,
                relationship,
                count,
            } => {
                write!(
                    f,
                    "cardinality exceeded: {source} holds {count} targets in one-slot '{relationship}'"
                )
            }
            Self::KindMismatch {
                relationship,
                entity,
                kind,
            } => {
                write!(f, "kind {kind} not permitted for '{relationship}' ({entity})")
            }
            Self::DuplicateUnique {
                kind,
                field,
                value,
                entities,
            } => {
                write!(
                    f,
                    "duplicate value {value:?} in unique field '{field}' of {kind} ({} entities)",
                    entities.len()
                )
            }
            Self::MissingRequiredReference {
                entity,
                relationship,
            } => {
                write!(f, "missing required reference '{relationship}' on {entity}")
            }
        }
    }
}
