//! Graph <-> document conversion and filesystem round-trip.
//!
//! Save walks the live entities wholesale; load rebuilds the entity store
//! and relationship index from scratch, then runs the invariant checks
//! before handing the graph over. A document that fails them is rejected
//! wholesale — a half-loaded inconsistent graph is never observable.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use worldgraph_engine::validate_graph;
use worldgraph_foundation::{EntityId, EntityKind, Error, ErrorKind, Result, Value};
use worldgraph_store::{Graph, WorldSchema};

use crate::document::{EntityDoc, FORMAT_VERSION, ValueDoc, WorldDocument};

/// Serializes a graph into a document.
///
/// Entities are emitted in identifier order; references under their
/// canonical names; opaque payloads preserved from the last load are
/// re-emitted verbatim.
#[must_use]
pub fn to_document(graph: &Graph) -> WorldDocument {
    let mut entities = Vec::with_capacity(graph.len());

    for (id, kind) in graph.entities().iter() {
        let mut fields: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        let mut references: BTreeMap<String, Vec<u64>> = BTreeMap::new();

        if let Some(record) = graph.fields().get(id) {
            for (name, value) in record.fields() {
                if let Some(doc) = ValueDoc::from_value(value) {
                    let json = serde_json::to_value(doc)
                        .expect("value wire form always serializes");
                    fields.insert(name.to_string(), json);
                }
            }
            for (name, payload) in record.opaque_fields() {
                fields.insert(name.clone(), payload.clone());
            }
            for (name, targets) in record.opaque_references() {
                references.insert(name.clone(), targets.clone());
            }
        }

        for (name, target) in graph.index().references_from(id) {
            references
                .entry(name.to_string())
                .or_default()
                .push(target.raw());
        }

        entities.push(EntityDoc {
            id: id.raw(),
            kind: kind.as_str().to_string(),
            fields,
            references,
        });
    }

    WorldDocument {
        format: FORMAT_VERSION,
        entities,
    }
}

/// Rebuilds a graph from a document over the given schema.
///
/// The relationship index is reconstructed from the persisted references;
/// undo history is the caller's to reset. Unknown field and relationship
/// names are retained opaquely per entity.
///
/// # Errors
///
/// Returns `SchemaError` for an unsupported format version, an unknown
/// kind, a duplicate identifier, a field value rejected by the schema, or a
/// rebuilt graph that fails blocking invariant checks. Returns `ParseError`
/// for a field payload that is not a valid wire value.
pub fn from_document(schema: Arc<WorldSchema>, document: &WorldDocument) -> Result<Graph> {
    if document.format == 0 || document.format > FORMAT_VERSION {
        return Err(Error::schema(
            format!(
                "unsupported format version {} (supported: 1..={FORMAT_VERSION})",
                document.format
            ),
            Vec::new(),
        ));
    }

    let mut graph = Graph::new(schema);

    // Pass 1: entities and fields.
    for entity in &document.entities {
        let id = EntityId::from_raw(entity.id);
        let kind = EntityKind::parse(&entity.kind).ok_or_else(|| {
            Error::schema(format!("unknown entity kind '{}'", entity.kind), Vec::new())
        })?;
        let kind_schema = graph.schema().kind(kind).ok_or_else(|| {
            Error::schema(format!("no schema registered for kind '{kind}'"), Vec::new())
        })?;

        let mut fields: HashMap<Arc<str>, Value> = HashMap::new();
        let mut opaque_fields = serde_json::Map::new();
        for (name, payload) in &entity.fields {
            if let Some(field) = kind_schema.field(name) {
                let doc: ValueDoc = serde_json::from_value(payload.clone()).map_err(|e| {
                    Error::parse(format!("field '{name}' of entity {}: {e}", entity.id))
                })?;
                let value = doc.into_value()?;
                field.check(&value).map_err(|e| {
                    Error::schema(
                        format!("field '{name}' of entity {}: {e}", entity.id),
                        Vec::new(),
                    )
                })?;
                fields.insert(Arc::clone(&field.name), value);
            } else {
                opaque_fields.insert(name.clone(), payload.clone());
            }
        }
        graph.insert_loaded(id, kind, fields).map_err(|_| {
            Error::schema(format!("duplicate identifier {}", entity.id), Vec::new())
        })?;

        let mut opaque_references: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for (name, targets) in &entity.references {
            if graph.schema().resolve(name).is_none() {
                opaque_references.insert(name.clone(), targets.clone());
            }
        }
        if !opaque_fields.is_empty() || !opaque_references.is_empty() {
            graph.set_opaque(id, opaque_fields, opaque_references);
        }
    }

    // Pass 2: references, normalized to canonical direction.
    for entity in &document.entities {
        let source = EntityId::from_raw(entity.id);
        for (name, targets) in &entity.references {
            let Some(resolved) = graph.schema().resolve(name) else {
                continue; // retained opaquely in pass 1
            };
            let canonical = Arc::clone(&resolved.schema.name);
            let inverted = resolved.inverted;
            for raw in targets {
                let target = EntityId::from_raw(*raw);
                let (src, dst) = if inverted { (target, source) } else { (source, target) };
                graph.insert_loaded_reference(src, &canonical, dst);
            }
        }
    }

    // The rebuilt graph must satisfy every blocking invariant before anyone
    // observes it.
    let report = validate_graph(&graph);
    if !report.is_ok() {
        return Err(Error::schema(
            format!("document violates graph invariants ({})", report.blocking.len()),
            report.blocking,
        ));
    }

    debug!(entities = graph.len(), "document loaded");
    Ok(graph)
}

/// Serializes a graph to pretty-printed JSON.
///
/// # Errors
///
/// Returns an internal error if JSON serialization fails (it cannot for a
/// well-formed graph).
pub fn to_json_string(graph: &Graph) -> Result<String> {
    serde_json::to_string_pretty(&to_document(graph))
        .map_err(|e| Error::new(ErrorKind::Internal(format!("serialization failed: {e}"))))
}

/// Parses and rebuilds a graph from JSON text.
///
/// # Errors
///
/// Returns `ParseError` for malformed JSON and the errors of
/// [`from_document`] for a well-formed but invalid document.
pub fn from_json_str(schema: Arc<WorldSchema>, json: &str) -> Result<Graph> {
    let document: WorldDocument =
        serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))?;
    from_document(schema, &document)
}

/// Writes a graph to an arbitrary writer as JSON.
///
/// # Errors
///
/// Returns `Io` when writing fails.
pub fn save_to_writer<W: Write>(graph: &Graph, mut writer: W) -> Result<()> {
    let json = to_json_string(graph)?;
    writer
        .write_all(json.as_bytes())
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to write document: {e}"))))?;
    writer
        .flush()
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to flush document: {e}"))))
}

/// Reads and rebuilds a graph from an arbitrary reader.
///
/// # Errors
///
/// Returns `Io` when reading fails, plus the errors of [`from_json_str`].
pub fn load_from_reader<R: Read>(schema: Arc<WorldSchema>, mut reader: R) -> Result<Graph> {
    let mut json = String::new();
    reader
        .read_to_string(&mut json)
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to read document: {e}"))))?;
    from_json_str(schema, &json)
}

/// Saves a graph to a file, overwriting any existing content.
///
/// # Errors
///
/// Returns `Io` when the file cannot be created or written.
pub fn save_to_file<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to create file '{}': {e}",
            path.as_ref().display()
        )))
    })?;
    save_to_writer(graph, BufWriter::new(file))
}

/// Loads a graph from a file.
///
/// # Errors
///
/// Returns `Io` when the file cannot be opened or read, plus the errors of
/// [`from_json_str`].
pub fn load_from_file<P: AsRef<Path>>(schema: Arc<WorldSchema>, path: P) -> Result<Graph> {
    let file = File::open(path.as_ref()).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to open file '{}': {e}",
            path.as_ref().display()
        )))
    })?;
    load_from_reader(schema, BufReader::new(file))
}
