//! # Graph driver seam
//!
//! This is THE contract between graphport and whatever client actually talks
//! to the store. The adapter consumes nothing beyond it: run a query with
//! bound parameters, begin/commit/rollback the single transaction, get typed
//! records back.
//!
//! ## Implementations
//!
//! | Client | Module | Description |
//! |--------|--------|-------------|
//! | `MockClient` | `mock` | Scripted in-memory client for testing/embedding |
//! | Bolt/HTTP | external | Real network drivers live outside this crate |

pub mod mock;

use indexmap::IndexMap;

use crate::cypher::BindTable;
use crate::model::Scalar;

/// Whatever the underlying driver raises. Wrapped into [`crate::Error`] at
/// the adapter boundary.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Record values
// ============================================================================

/// A property value as it arrives off the wire: one scalar or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

/// A graph node as the driver reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawNode {
    pub labels: Vec<String>,
    pub properties: Vec<(String, RawValue)>,
}

/// A graph relationship as the driver reports it. Endpoints are the store's
/// internal identifiers, not uuids.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRelationship {
    pub rel_type: String,
    pub start_id: i64,
    pub end_id: i64,
    pub properties: Vec<(String, RawValue)>,
}

/// One column of a result record. An explicit kind discriminator instead of
/// type-testing opaque driver objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Scalar(Scalar),
    Node(RawNode),
    Relationship(RawRelationship),
}

/// One result record: an ordered column → field map with typed accessors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    pub fn new(fields: impl IntoIterator<Item = (String, Field)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Field::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            Field::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// GraphClient trait
// ============================================================================

/// The narrow, synchronous driver interface.
///
/// At most one transaction is open per client at a time; [`crate::db::Db`]
/// layers the reentrancy counter on top of it. After `rollback` the
/// underlying session is unusable and must be rebuilt via `reset`.
pub trait GraphClient {
    /// Run a query outside the transaction and return its records.
    fn run(&mut self, query: &str, bind: &BindTable) -> Result<Vec<Record>, DriverError>;

    /// Open the transaction.
    fn begin(&mut self) -> Result<(), DriverError>;

    /// Queue a statement into the open transaction.
    fn push(&mut self, query: &str, bind: &BindTable) -> Result<(), DriverError>;

    /// Commit the open transaction, returning the records of the queued
    /// statements if the driver surfaces them.
    fn commit(&mut self) -> Result<Option<Vec<Record>>, DriverError>;

    /// Roll back the open transaction.
    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Discard the session and reconnect.
    fn reset(&mut self) -> Result<(), DriverError>;
}
