//! End-to-end adapter tests against the scripted mock client.
//!
//! Each test exercises: model -> query synthesis -> driver calls -> record
//! reconstruction, asserting exactly what hit the wire.

use graphport::driver::mock::MockClient;
use graphport::driver::{Field, RawNode, RawRelationship, RawValue, Record};
use graphport::model::{Node, Property, Relationship, Scalar};
use graphport::{Db, DbAdapter, DbConfig, Error};

// ============================================================================
// Helpers: canned records
// ============================================================================

fn adapter() -> DbAdapter<MockClient> {
    DbAdapter::new(Db::new(MockClient::new(DbConfig::new())))
}

fn scalar_record(column: &str, value: Scalar) -> Record {
    Record::new([(column.to_owned(), Field::Scalar(value))])
}

fn node_record(column: &str, labels: &[&str], properties: &[(&str, Scalar)]) -> Record {
    let raw = RawNode {
        labels: labels.iter().map(|label| label.to_string()).collect(),
        properties: properties
            .iter()
            .map(|(name, value)| (name.to_string(), RawValue::Scalar(value.clone())))
            .collect(),
    };
    Record::new([(column.to_owned(), Field::Node(raw))])
}

fn relationship_record(
    column: &str,
    rel_type: &str,
    uuid: &str,
    start_id: i64,
    end_id: i64,
) -> Record {
    let raw = RawRelationship {
        rel_type: rel_type.to_owned(),
        start_id,
        end_id,
        properties: vec![("uuid".to_owned(), RawValue::Scalar(Scalar::from(uuid)))],
    };
    Record::new([(column.to_owned(), Field::Relationship(raw))])
}

// ============================================================================
// 1. create_node — CREATE in a transaction, reload by internal id
// ============================================================================

#[test]
fn test_create_node_flow() {
    let mut adapter = adapter();
    adapter
        .client_mut()
        .enqueue_commit(vec![scalar_record("ID(n)", Scalar::Integer(7))]);
    adapter.client_mut().enqueue_run(vec![node_record(
        "node",
        &["Person"],
        &[("uuid", Scalar::from("u-1")), ("name", Scalar::from("Ada"))],
    )]);

    let mut node = Node::new().with_labels(["Person".to_owned()]);
    node.set_property(Property::single("name", Scalar::from("Ada"))).unwrap();

    let created = adapter.create_node(&node).unwrap();
    assert_eq!(created.uuid(), "u-1");
    assert_eq!(created.labels(), ["Person"]);

    let client = adapter.client_mut();
    assert_eq!(client.begins, 1);
    assert_eq!(client.commits, 1);
    assert_eq!(client.pushed.len(), 1);

    let (query, bind) = &client.pushed[0];
    assert!(query.starts_with("CREATE (n:`Person` {"));
    assert!(query.ends_with("}) RETURN ID(n)"));
    assert_eq!(bind.get("bind_0"), Some(&Scalar::from("Ada")));

    // Reload went by the returned internal id.
    let (query, bind) = &client.queries[0];
    assert_eq!(query, "MATCH (node) WHERE ID(node) = $id RETURN node");
    assert_eq!(bind.get("id"), Some(&Scalar::Integer(7)));
}

// ============================================================================
// 2. update_node — empty diff issues no write
// ============================================================================

#[test]
fn test_update_without_changes_issues_no_write() {
    let mut adapter = adapter();
    adapter.client_mut().enqueue_run(vec![node_record(
        "node",
        &["Person"],
        &[("uuid", Scalar::from("u-1")), ("name", Scalar::from("Ada"))],
    )]);

    let mut node = Node::new().with_labels(["Person".to_owned()]);
    node.set_uuid("u-1").unwrap();
    node.set_property(Property::single("name", Scalar::from("Ada"))).unwrap();

    let updated = adapter.update_node(&node).unwrap();
    assert_eq!(updated.uuid(), "u-1");

    let client = adapter.client_mut();
    assert_eq!(client.queries.len(), 1, "only the load query");
    assert!(client.pushed.is_empty());
    assert_eq!(client.begins, 0);
}

// ============================================================================
// 3. update_node — minimal diff: SET changed, REMOVE dropped, labels both ways
// ============================================================================

#[test]
fn test_update_writes_minimal_diff() {
    let mut adapter = adapter();

    let persisted = || {
        node_record(
            "node",
            &["Person"],
            &[
                ("uuid", Scalar::from("u-1")),
                ("name", Scalar::from("Ada")),
                ("obsolete", Scalar::from("x")),
            ],
        )
    };
    adapter.client_mut().enqueue_run(vec![persisted()]);
    adapter.client_mut().enqueue_run(vec![persisted()]); // reload after write

    let mut node = Node::new().with_labels(["Person".to_owned(), "Admin".to_owned()]);
    node.set_uuid("u-1").unwrap();
    node.set_property(Property::single("name", Scalar::from("Grace"))).unwrap();

    adapter.update_node(&node).unwrap();

    let client = adapter.client_mut();
    assert_eq!(client.pushed.len(), 1);

    let (query, bind) = &client.pushed[0];
    assert!(query.starts_with("MATCH (node { uuid: $uuid })"));
    assert!(query.contains(" SET node.`name` = $bind_1"));
    assert!(query.contains(" REMOVE node.`obsolete`"));
    assert!(query.contains(" SET node:`Admin`"));
    assert!(!query.contains("REMOVE node:"), "kept labels are not touched");
    assert!(!query.contains("`uuid` ="), "uuid is never part of a diff");
    assert_eq!(bind.get("uuid"), Some(&Scalar::from("u-1")));
    assert_eq!(bind.get("bind_1"), Some(&Scalar::from("Grace")));
}

// ============================================================================
// 4. update_node — unknown uuid
// ============================================================================

#[test]
fn test_update_unknown_node_fails() {
    let mut adapter = adapter();

    let mut node = Node::new();
    node.set_uuid("ghost").unwrap();

    let err = adapter.update_node(&node).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

// ============================================================================
// 5. create_relationship — three property maps, one bind table
// ============================================================================

#[test]
fn test_create_relationship_merges_endpoints() {
    let mut adapter = adapter();
    adapter
        .client_mut()
        .enqueue_commit(vec![scalar_record("ID(r)", Scalar::Integer(5))]);
    adapter
        .client_mut()
        .enqueue_run(vec![relationship_record("rel", "KNOWS", "r-9", 1, 2)]);
    // Endpoint uuid resolution for the reloaded relationship.
    adapter
        .client_mut()
        .enqueue_run(vec![scalar_record("node.uuid", Scalar::from("a-1"))]);
    adapter
        .client_mut()
        .enqueue_run(vec![scalar_record("node.uuid", Scalar::from("b-2"))]);

    let mut source = Node::new().with_labels(["Person".to_owned()]);
    source.set_uuid("a-1").unwrap();
    let mut target = Node::new().with_labels(["Person".to_owned()]);
    target.set_uuid("b-2").unwrap();

    let mut relationship = Relationship::new("KNOWS").with_source(source).with_target(target);
    relationship
        .set_property(Property::single("since", Scalar::Integer(2001)))
        .unwrap();

    let created = adapter.create_relationship(&relationship).unwrap();
    assert_eq!(created.uuid(), "r-9");
    assert_eq!(created.source().uuid(), "a-1");
    assert_eq!(created.target().uuid(), "b-2");

    let client = adapter.client_mut();
    let (query, bind) = &client.pushed[0];
    assert!(query.starts_with("MERGE (s:`Person` {"));
    assert!(query.contains("MERGE (t:`Person` {"));
    assert!(query.contains("MERGE (s)-[r:`KNOWS` {"));
    assert!(query.ends_with("}) RETURN ID(r)"));

    // Size-salted keys keep the three maps collision-free.
    assert_eq!(bind.len(), 3);
    assert_eq!(bind.get("bind_2"), Some(&Scalar::Integer(2001)));
}

// ============================================================================
// 6. update_relationship — immutable fields fail before any write
// ============================================================================

#[test]
fn test_update_relationship_rejects_type_change() {
    let mut adapter = adapter();
    adapter
        .client_mut()
        .enqueue_run(vec![relationship_record("relationship", "KNOWS", "r-9", 1, 2)]);
    adapter
        .client_mut()
        .enqueue_run(vec![scalar_record("node.uuid", Scalar::from("a-1"))]);
    adapter
        .client_mut()
        .enqueue_run(vec![scalar_record("node.uuid", Scalar::from("b-2"))]);

    let mut source = Node::new();
    source.set_uuid("a-1").unwrap();
    let mut target = Node::new();
    target.set_uuid("b-2").unwrap();

    let mut changed = Relationship::new("LIKES").with_source(source).with_target(target);
    changed.set_uuid("r-9").unwrap();

    let err = adapter.update_relationship(&changed).unwrap_err();
    assert!(matches!(err, Error::ImmutableFieldChanged { field: "type", .. }));

    let client = adapter.client_mut();
    assert!(client.pushed.is_empty(), "no write query was issued");
    assert_eq!(client.begins, 0);
}

// ============================================================================
// 7. list_nodes — entries without uuid are filtered
// ============================================================================

#[test]
fn test_list_nodes_filters_uuidless_entries() {
    let mut adapter = adapter();
    adapter.client_mut().enqueue_run(vec![
        node_record("node", &["Person"], &[("uuid", Scalar::from("u-1"))]),
        node_record("node", &["Person"], &[("name", Scalar::from("ghost"))]),
        node_record("node", &["Person"], &[("uuid", Scalar::from("u-2"))]),
    ]);

    let query = adapter.build_node_query("Person", 0, 10);
    assert_eq!(
        query.query,
        "MATCH (node:`Person`) RETURN node ORDER BY node.uuid SKIP 0 LIMIT 10"
    );

    let nodes = adapter.list_nodes(&query).unwrap();
    let uuids: Vec<String> = nodes.iter().map(Node::uuid).collect();
    assert_eq!(uuids, ["u-1", "u-2"]);
}

// ============================================================================
// 8. metadata listings — collation-sorted
// ============================================================================

#[test]
fn test_list_node_labels_sorted_by_collation() {
    let mut adapter = adapter();
    adapter.client_mut().enqueue_run(vec![
        scalar_record("label", Scalar::from("b")),
        scalar_record("label", Scalar::from("a")),
        scalar_record("label", Scalar::from("A")),
    ]);

    let labels = adapter.list_node_labels().unwrap();
    assert_eq!(labels, ["A", "a", "b"]);

    let (query, _) = &adapter.client_mut().queries[0];
    assert_eq!(query, "CALL db.labels()");
}

// ============================================================================
// 9. delete_node
// ============================================================================

#[test]
fn test_delete_node() {
    let mut adapter = adapter();
    adapter.delete_node("u-1").unwrap();

    let (query, bind) = &adapter.client_mut().queries[0];
    assert_eq!(query, "MATCH (node { uuid: $uuid }) DELETE node");
    assert_eq!(bind.get("uuid"), Some(&Scalar::from("u-1")));
}

// ============================================================================
// 10. load_node — absence is Ok(None), not an error
// ============================================================================

#[test]
fn test_load_missing_node_is_none() {
    let mut adapter = adapter();
    assert!(adapter.load_node("nope").unwrap().is_none());
}
