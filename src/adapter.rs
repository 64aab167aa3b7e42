//! Database adapter: create/read/update/delete/list orchestration over the
//! driver seam.
//!
//! The adapter owns the [`Db`] wrapper (and with it the one live
//! transaction), synthesizes queries through [`crate::cypher`], and
//! reconstructs model entities from raw driver records. Updates are
//! diff-based: only the minimal set of property and label mutations is ever
//! sent to the store.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::cypher::{self, BindTable, PropertyData};
use crate::db::{Db, DbQuery};
use crate::driver::{Field, GraphClient, RawNode, RawRelationship, RawValue};
use crate::model::{Node, Property, Relationship, Scalar};
use crate::{Error, Result};

/// Default page size for listings.
pub const LIMIT_DEFAULT: usize = 20;

// ============================================================================
// Collation seam
// ============================================================================

/// Locale-aware string ordering, used only for display ordering of
/// label/type/key listings. Real collators are external collaborators.
pub trait Collation {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Fallback collation: case-insensitive lexicographic.
#[derive(Debug, Default)]
pub struct SimpleCollation;

impl Collation for SimpleCollation {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
    }
}

// ============================================================================
// Result rows
// ============================================================================

/// One column of an arbitrary query result, converted to the domain model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultCell {
    Scalar(Scalar),
    Node(Node),
    Relationship(Relationship),
}

/// One row of an arbitrary query result, in column order.
pub type ResultRow = IndexMap<String, ResultCell>;

// ============================================================================
// Diff helpers
// ============================================================================

/// Compute the property diff between an old and a desired new state.
///
/// New entries that differ from the old value list (or are new) map to their
/// values; old entries absent from the new state map to an empty list, the
/// removal signal. Inputs are never mutated.
pub fn diff_properties(old: &PropertyData, new: &PropertyData) -> PropertyData {
    let mut diff = PropertyData::new();

    for (name, values) in new {
        if old.get(name) == Some(values) {
            continue;
        }
        diff.insert(name.clone(), values.clone());
    }

    for name in old.keys() {
        if !new.contains_key(name) {
            diff.insert(name.clone(), Vec::new());
        }
    }

    diff
}

/// Label set difference: `(added, removed)` in input order.
pub fn diff_labels(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let added = new.iter().filter(|label| !old.contains(label)).cloned().collect();
    let removed = old.iter().filter(|label| !new.contains(label)).cloned().collect();
    (added, removed)
}

/// Snapshot of an entity's properties for diffing: the `uuid` property is
/// never part of a diff, and on the new side zero-valued properties carry no
/// signal (removal comes from absence).
fn update_snapshot<'a>(
    properties: impl Iterator<Item = &'a Property>,
    skip_empty: bool,
) -> PropertyData {
    let mut data = PropertyData::new();

    for property in properties {
        if property.name() == "uuid" {
            continue;
        }
        if skip_empty && property.is_empty() {
            continue;
        }
        data.insert(property.name().to_owned(), property.values().to_vec());
    }

    data
}

fn property_data<'a>(properties: impl Iterator<Item = &'a Property>) -> PropertyData {
    properties
        .map(|property| (property.name().to_owned(), property.values().to_vec()))
        .collect()
}

// ============================================================================
// Record → model conversion
// ============================================================================

fn value_to_property(name: &str, value: &RawValue) -> Property {
    let mut property = Property::new(name);

    match value {
        RawValue::Scalar(scalar) => property.push(scalar.clone()),
        RawValue::List(values) => {
            for scalar in values {
                property.push(scalar.clone());
            }
        }
    }

    property
}

fn node_from_raw(raw: &RawNode) -> Result<Node> {
    let mut node = Node::new();
    node.set_labels(raw.labels.iter().cloned());

    for (name, value) in &raw.properties {
        node.set_property(value_to_property(name, value))?;
    }

    Ok(node)
}

// ============================================================================
// DbAdapter
// ============================================================================

/// The orchestration layer between the model and the driver.
pub struct DbAdapter<C: GraphClient> {
    db: Db<C>,
    collation: Box<dyn Collation>,
}

impl<C: GraphClient> DbAdapter<C> {
    pub fn new(db: Db<C>) -> Self {
        Self {
            db,
            collation: Box::new(SimpleCollation),
        }
    }

    /// Swap in an external collation (locale-aware sorting is a
    /// collaborator, not part of this layer).
    pub fn with_collation(mut self, collation: Box<dyn Collation>) -> Self {
        self.collation = collation;
        self
    }

    pub fn db(&self) -> &Db<C> {
        &self.db
    }

    pub fn client_mut(&mut self) -> &mut C {
        self.db.client_mut()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Create a node and return its canonical persisted state, reloaded by
    /// the store-assigned internal identifier.
    pub fn create_node(&mut self, node: &Node) -> Result<Node> {
        const OP: &str = "DbAdapter::create_node";

        let mut query = DbQuery::new();
        let fragment = cypher::properties_string(&property_data(node.properties()), &mut query.bind);
        query.query = format!(
            "CREATE (n{} {{ {} }}) RETURN ID(n)",
            cypher::labels_string(node.labels()),
            fragment
        );

        self.db.begin_transaction(OP)?;
        self.db.push(OP, &query)?;
        let records = self.db.commit(OP)?;

        let node_id = records
            .as_deref()
            .and_then(|records| records.first())
            .and_then(|record| record.get_int("ID(n)"))
            .unwrap_or(-1);

        self.load_node_by_id(node_id)?.ok_or_else(|| Error::NotFound {
            op: OP,
            what: format!("created node (internal id {node_id})"),
        })
    }

    /// Diff-based update. Only changed properties and labels are written; a
    /// no-op diff issues no write query at all.
    pub fn update_node(&mut self, new_node: &Node) -> Result<Node> {
        const OP: &str = "DbAdapter::update_node";

        let uuid = new_node.uuid();
        let old_node = self.load_node(&uuid)?.ok_or_else(|| Error::NotFound {
            op: OP,
            what: format!("node <{uuid}>"),
        })?;

        let diff = diff_properties(
            &update_snapshot(old_node.properties(), false),
            &update_snapshot(new_node.properties(), true),
        );
        let (added, removed) = diff_labels(old_node.labels(), new_node.labels());

        // Nothing changed at all?
        if diff.is_empty() && added.is_empty() && removed.is_empty() {
            return Ok(old_node);
        }

        self.db.begin_transaction(OP)?;

        let mut query = DbQuery::new();
        query.bind.insert("uuid".to_owned(), Scalar::String(uuid.clone()));
        let fragment = cypher::properties_update_string("node", &diff, &mut query.bind);
        query.query = format!("MATCH (node {{ uuid: $uuid }}){fragment}");

        if !removed.is_empty() {
            query.query.push_str(&format!(" REMOVE node{}", cypher::labels_string(&removed)));
        }

        if !added.is_empty() {
            query.query.push_str(&format!(" SET node{}", cypher::labels_string(&added)));
        }

        self.db.push(OP, &query)?;
        self.db.commit(OP)?;

        self.load_node(&uuid)?.ok_or_else(|| Error::NotFound {
            op: OP,
            what: format!("node <{uuid}>"),
        })
    }

    pub fn delete_node(&mut self, uuid: &str) -> Result<()> {
        const OP: &str = "DbAdapter::delete_node";

        let query = DbQuery::with_query("MATCH (node { uuid: $uuid }) DELETE node")
            .set_bind(BindTable::from_iter([("uuid".to_owned(), Scalar::String(uuid.to_owned()))]));

        self.db.run(OP, &query)?;
        Ok(())
    }

    /// Load a node by its `uuid` property. Absence is not an error.
    pub fn load_node(&mut self, uuid: &str) -> Result<Option<Node>> {
        const OP: &str = "DbAdapter::load_node";

        let query = DbQuery::with_query("MATCH (node { uuid: $uuid }) RETURN node")
            .set_bind(BindTable::from_iter([("uuid".to_owned(), Scalar::String(uuid.to_owned()))]));

        let records = self.db.run(OP, &query)?;
        Self::first_node(&records, "node")
    }

    /// Load a node by the store's internal identifier.
    pub fn load_node_by_id(&mut self, node_id: i64) -> Result<Option<Node>> {
        const OP: &str = "DbAdapter::load_node_by_id";

        let query = DbQuery::with_query("MATCH (node) WHERE ID(node) = $id RETURN node")
            .set_bind(BindTable::from_iter([("id".to_owned(), Scalar::Integer(node_id))]));

        let records = self.db.run(OP, &query)?;
        Self::first_node(&records, "node")
    }

    /// Resolve an internal identifier to a `uuid`, or `""` when unknown.
    pub fn node_uuid_by_id(&mut self, node_id: i64) -> Result<String> {
        const OP: &str = "DbAdapter::node_uuid_by_id";

        let query = DbQuery::with_query("MATCH (node) WHERE ID(node) = $id RETURN node.uuid")
            .set_bind(BindTable::from_iter([("id".to_owned(), Scalar::Integer(node_id))]));

        let records = self.db.run(OP, &query)?;
        Ok(records
            .first()
            .and_then(|record| record.get_str("node.uuid"))
            .unwrap_or_default()
            .to_owned())
    }

    /// Paged node listing query, ordered by `uuid` for deterministic
    /// pagination.
    pub fn build_node_query(&self, label: &str, skip: usize, limit: usize) -> DbQuery {
        DbQuery::with_query(format!(
            "MATCH (node{}) RETURN node ORDER BY node.uuid SKIP {} LIMIT {}",
            cypher::labels_string([label]),
            skip,
            limit
        ))
    }

    /// Run a node listing query. Records whose node lacks a `uuid` are
    /// filtered out (defense against malformed data).
    pub fn list_nodes(&mut self, query: &DbQuery) -> Result<Vec<Node>> {
        const OP: &str = "DbAdapter::list_nodes";

        let records = self.db.run(OP, query)?;
        let mut nodes = Vec::new();

        for record in &records {
            if let Some(Field::Node(raw)) = record.get("node") {
                let node = node_from_raw(raw)?;
                if node.uuid().is_empty() {
                    continue;
                }
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    // ------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------

    /// Merge both endpoint nodes by their full label/property sets and merge
    /// the relationship between them, then reload the persisted state.
    pub fn create_relationship(&mut self, relationship: &Relationship) -> Result<Relationship> {
        const OP: &str = "DbAdapter::create_relationship";

        let mut query = DbQuery::new();
        let source_fragment =
            cypher::properties_string(&property_data(relationship.source().properties()), &mut query.bind);
        let target_fragment =
            cypher::properties_string(&property_data(relationship.target().properties()), &mut query.bind);
        let rel_fragment =
            cypher::properties_string(&property_data(relationship.properties()), &mut query.bind);

        query.query = format!(
            "MERGE (s{} {{ {} }}) MERGE (t{} {{ {} }}) MERGE (s)-[r{} {{ {} }}]->(t) RETURN ID(r)",
            cypher::labels_string(relationship.source().labels()),
            source_fragment,
            cypher::labels_string(relationship.target().labels()),
            target_fragment,
            cypher::labels_string([relationship.rel_type()]),
            rel_fragment
        );

        self.db.begin_transaction(OP)?;
        self.db.push(OP, &query)?;
        let records = self.db.commit(OP)?;

        let relationship_id = records
            .as_deref()
            .and_then(|records| records.first())
            .and_then(|record| record.get_int("ID(r)"))
            .unwrap_or(-1);

        self.load_relationship_by_id(relationship_id)?
            .ok_or_else(|| Error::NotFound {
                op: OP,
                what: format!("created relationship (internal id {relationship_id})"),
            })
    }

    /// Diff-based property update. Type and endpoint identity are immutable;
    /// violating that fails before any write query is issued.
    pub fn update_relationship(&mut self, new_relationship: &Relationship) -> Result<Relationship> {
        const OP: &str = "DbAdapter::update_relationship";

        let uuid = new_relationship.uuid();
        let old_relationship = self.load_relationship(&uuid)?.ok_or_else(|| Error::NotFound {
            op: OP,
            what: format!("relationship <{uuid}>"),
        })?;

        if new_relationship.rel_type() != old_relationship.rel_type() {
            return Err(Error::ImmutableFieldChanged { op: OP, field: "type" });
        }

        if new_relationship.source().uuid() != old_relationship.source().uuid() {
            return Err(Error::ImmutableFieldChanged { op: OP, field: "source node" });
        }

        if new_relationship.target().uuid() != old_relationship.target().uuid() {
            return Err(Error::ImmutableFieldChanged { op: OP, field: "target node" });
        }

        let diff = diff_properties(
            &update_snapshot(old_relationship.properties(), false),
            &update_snapshot(new_relationship.properties(), true),
        );

        if diff.is_empty() {
            return Ok(old_relationship);
        }

        self.db.begin_transaction(OP)?;

        let mut query = DbQuery::new();
        query.bind.insert("uuid".to_owned(), Scalar::String(uuid.clone()));
        let fragment = cypher::properties_update_string("relationship", &diff, &mut query.bind);
        query.query = format!("MATCH ()-[relationship {{ uuid: $uuid }}]->(){fragment}");

        self.db.push(OP, &query)?;
        self.db.commit(OP)?;

        self.load_relationship(&uuid)?.ok_or_else(|| Error::NotFound {
            op: OP,
            what: format!("relationship <{uuid}>"),
        })
    }

    pub fn load_relationship(&mut self, uuid: &str) -> Result<Option<Relationship>> {
        const OP: &str = "DbAdapter::load_relationship";

        let query = DbQuery::with_query("MATCH ()-[relationship { uuid: $uuid }]->() RETURN relationship")
            .set_bind(BindTable::from_iter([("uuid".to_owned(), Scalar::String(uuid.to_owned()))]));

        let records = self.db.run(OP, &query)?;
        let raw = Self::first_relationship(&records, "relationship");

        match raw {
            Some(raw) => self.relationship_from_raw(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn load_relationship_by_id(&mut self, relationship_id: i64) -> Result<Option<Relationship>> {
        const OP: &str = "DbAdapter::load_relationship_by_id";

        let query = DbQuery::with_query("MATCH ()-[rel]->() WHERE ID(rel) = $id RETURN rel")
            .set_bind(BindTable::from_iter([("id".to_owned(), Scalar::Integer(relationship_id))]));

        let records = self.db.run(OP, &query)?;
        let raw = Self::first_relationship(&records, "rel");

        match raw {
            Some(raw) => self.relationship_from_raw(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn build_relationship_query(&self, limit: usize) -> DbQuery {
        DbQuery::with_query(format!("MATCH (n1)-[r]->(n2) RETURN r LIMIT {limit}"))
    }

    /// Run a relationship listing query. Entries without a `uuid` are
    /// filtered out.
    pub fn list_relationships(&mut self, query: &DbQuery) -> Result<Vec<Relationship>> {
        const OP: &str = "DbAdapter::list_relationships";

        let records = self.db.run(OP, query)?;
        let raws: Vec<RawRelationship> = records
            .iter()
            .filter_map(|record| match record.get("r") {
                Some(Field::Relationship(raw)) => Some(raw.clone()),
                _ => None,
            })
            .collect();

        let mut relationships = Vec::new();

        for raw in &raws {
            let relationship = self.relationship_from_raw(raw)?;
            if relationship.uuid().is_empty() {
                continue;
            }
            relationships.push(relationship);
        }

        Ok(relationships)
    }

    /// All relationships touching the given node, in either direction.
    /// With `load_nodes` the endpoints are fully loaded instead of being
    /// uuid-only stubs.
    pub fn list_node_relationships(&mut self, uuid: &str, load_nodes: bool) -> Result<Vec<Relationship>> {
        const OP: &str = "DbAdapter::list_node_relationships";

        let query = DbQuery::with_query(format!(
            "MATCH (n1 {{ uuid: $n1uuid }})-[r]-(n2) RETURN r LIMIT {LIMIT_DEFAULT}"
        ))
        .set_bind(BindTable::from_iter([("n1uuid".to_owned(), Scalar::String(uuid.to_owned()))]));

        let records = self.db.run(OP, &query)?;
        let raws: Vec<RawRelationship> = records
            .iter()
            .filter_map(|record| match record.get("r") {
                Some(Field::Relationship(raw)) => Some(raw.clone()),
                _ => None,
            })
            .collect();

        let mut relationships = Vec::new();

        for raw in &raws {
            let mut relationship = self.relationship_from_raw(raw)?;
            if relationship.uuid().is_empty() {
                continue;
            }

            if load_nodes {
                if let Some(source) = self.load_node(&relationship.source().uuid())? {
                    relationship.set_source(source);
                }
                if let Some(target) = self.load_node(&relationship.target().uuid())? {
                    relationship.set_target(target);
                }
            }

            relationships.push(relationship);
        }

        Ok(relationships)
    }

    // ------------------------------------------------------------------
    // Store-wide metadata
    // ------------------------------------------------------------------

    pub fn list_node_labels(&mut self) -> Result<Vec<String>> {
        self.list_metadata("DbAdapter::list_node_labels", "CALL db.labels()", "label")
    }

    pub fn list_relationship_types(&mut self) -> Result<Vec<String>> {
        self.list_metadata(
            "DbAdapter::list_relationship_types",
            "CALL db.relationshipTypes()",
            "relationshipType",
        )
    }

    pub fn list_property_keys(&mut self) -> Result<Vec<String>> {
        self.list_metadata(
            "DbAdapter::list_property_keys",
            "CALL db.propertyKeys()",
            "propertyKey",
        )
    }

    fn list_metadata(&mut self, op: &'static str, query: &str, column: &str) -> Result<Vec<String>> {
        let records = self.db.run(op, &DbQuery::with_query(query))?;

        let mut names: Vec<String> = records
            .iter()
            .filter_map(|record| record.get_str(column))
            .map(str::to_owned)
            .collect();

        names.sort_by(|a, b| self.collation.compare(a, b));
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Arbitrary queries
    // ------------------------------------------------------------------

    /// Run an arbitrary query and convert every column of every row into the
    /// domain model, one conversion per record kind.
    pub fn list_results(&mut self, query: &DbQuery) -> Result<Vec<ResultRow>> {
        const OP: &str = "DbAdapter::list_results";

        let records = self.db.run(OP, query)?;
        let mut rows = Vec::new();

        for record in &records {
            let mut row = ResultRow::new();

            for (key, field) in record.iter() {
                let cell = match field {
                    Field::Null => ResultCell::Scalar(Scalar::String(String::new())),
                    Field::Scalar(scalar) => ResultCell::Scalar(scalar.clone()),
                    Field::Node(raw) => ResultCell::Node(node_from_raw(raw)?),
                    Field::Relationship(raw) => {
                        ResultCell::Relationship(self.relationship_from_raw(raw)?)
                    }
                };
                row.insert(key.to_owned(), cell);
            }

            rows.push(row);
        }

        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn first_node(records: &[crate::driver::Record], column: &str) -> Result<Option<Node>> {
        for record in records.iter().rev() {
            if let Some(Field::Node(raw)) = record.get(column) {
                return node_from_raw(raw).map(Some);
            }
        }
        Ok(None)
    }

    fn first_relationship(records: &[crate::driver::Record], column: &str) -> Option<RawRelationship> {
        records.iter().rev().find_map(|record| match record.get(column) {
            Some(Field::Relationship(raw)) => Some(raw.clone()),
            _ => None,
        })
    }

    /// Endpoint nodes come back as internal identifiers; resolve them to
    /// uuid-only stubs.
    fn relationship_from_raw(&mut self, raw: &RawRelationship) -> Result<Relationship> {
        let mut source = Node::new();
        source.set_uuid(self.node_uuid_by_id(raw.start_id)?)?;

        let mut target = Node::new();
        target.set_uuid(self.node_uuid_by_id(raw.end_id)?)?;

        let mut relationship = Relationship::new(raw.rel_type.clone())
            .with_source(source)
            .with_target(target);

        for (name, value) in &raw.properties {
            relationship.set_property(value_to_property(name, value))?;
        }

        Ok(relationship)
    }
}
