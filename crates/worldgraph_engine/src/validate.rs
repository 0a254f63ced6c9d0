//! Graph invariant checks.
//!
//! Validation runs at the end of every transaction and after every load:
//! - no dangling reference endpoints
//! - cardinality compliance for "one" slots
//! - kind compatibility of edge endpoints
//! - uniqueness constraints declared per kind
//! - required slots populated (warning severity only)
//!
//! Checks are deliberately whole-graph rather than incremental: a
//! transaction can pass through states no single command could reach, so
//! the only trustworthy answer comes from the committed end state.

use std::collections::HashMap;

use worldgraph_foundation::{EntityId, Severity, Value, Violation};
use worldgraph_store::{Cardinality, Graph};

/// Violations partitioned by severity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    /// Violations that must roll the transaction back.
    pub blocking: Vec<Violation>,
    /// Violations reported on the commit receipt but tolerated.
    pub warnings: Vec<Violation>,
}

impl ValidationReport {
    /// Returns true when no blocking violation was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.blocking.is_empty()
    }
}

/// Checks every graph invariant, returning all violations found.
#[must_use]
pub fn check_invariants(graph: &Graph) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_edges(graph, &mut violations);
    check_slots(graph, &mut violations);
    check_uniqueness(graph, &mut violations);
    violations
}

/// Checks every graph invariant and partitions the result by severity.
#[must_use]
pub fn validate_graph(graph: &Graph) -> ValidationReport {
    let mut report = ValidationReport::default();
    for violation in check_invariants(graph) {
        match violation.severity() {
            Severity::Blocking => report.blocking.push(violation),
            Severity::Warning => report.warnings.push(violation),
        }
    }
    report
}

/// Dangling endpoints and kind compatibility, edge by edge.
fn check_edges(graph: &Graph, violations: &mut Vec<Violation>) {
    let mut edges: Vec<_> = graph.index().edges().collect();
    edges.sort();

    for edge in edges {
        let (Ok(source_kind), Ok(target_kind)) =
            (graph.kind_of(edge.source), graph.kind_of(edge.target))
        else {
            violations.push(Violation::DanglingReference {
                source: edge.source,
                relationship: edge.relationship.to_string(),
                target: edge.target,
            });
            continue;
        };

        let Some(schema) = graph.schema().relationship(&edge.relationship) else {
            continue;
        };
        if !schema.allows_source(source_kind) {
            violations.push(Violation::KindMismatch {
                relationship: edge.relationship.to_string(),
                entity: edge.source,
                kind: source_kind,
            });
        }
        if !schema.allows_target(target_kind) {
            violations.push(Violation::KindMismatch {
                relationship: edge.relationship.to_string(),
                entity: edge.target,
                kind: target_kind,
            });
        }
    }
}

/// Cardinality and required-slot checks, entity by entity.
fn check_slots(graph: &Graph, violations: &mut Vec<Violation>) {
    for (id, kind) in graph.entities().iter() {
        for schema in graph.schema().relationships() {
            if !schema.allows_source(kind) {
                continue;
            }
            let count = graph.index().targets(id, &schema.name).count();
            if schema.cardinality == Cardinality::One && count > 1 {
                violations.push(Violation::CardinalityExceeded {
                    source: id,
                    relationship: schema.name.to_string(),
                    count,
                });
            }
            // A required slot applies only to kinds the schema names; an
            // unrestricted required slot would indict every entity.
            if schema.required && schema.source_kinds.contains(&kind) && count == 0 {
                violations.push(Violation::MissingRequiredReference {
                    entity: id,
                    relationship: schema.name.to_string(),
                });
            }
        }
    }
}

/// Uniqueness constraints, kind by kind.
fn check_uniqueness(graph: &Graph, violations: &mut Vec<Violation>) {
    for kind_schema in graph.schema().kinds() {
        for field in kind_schema.unique_fields() {
            let mut holders: HashMap<Value, Vec<EntityId>> = HashMap::new();
            for (id, kind) in graph.entities().iter() {
                if kind != kind_schema.kind {
                    continue;
                }
                let Ok(record) = graph.record(id) else {
                    continue;
                };
                if let Some(value) = record.field(&field.name) {
                    holders.entry(value.clone()).or_default().push(id);
                }
            }

            let mut duplicates: Vec<_> = holders
                .into_iter()
                .filter(|(_, entities)| entities.len() > 1)
                .collect();
            duplicates.sort_by_key(|(_, entities)| entities[0]);
            for (value, entities) in duplicates {
                violations.push(Violation::DuplicateUnique {
                    kind: kind_schema.kind,
                    field: field.name.to_string(),
                    value,
                    entities,
                });
            }
        }
    }
}
