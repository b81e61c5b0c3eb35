//! Driver: the abstract document-database connection
//!
//! The lock manager and document store are written against this trait only.
//! A driver provides physical, per-collection operations: point lookup,
//! unconditional save, one atomic insert-if-absent primitive, deletes,
//! range queries with sort/skip/limit, counting, and collection listing
//! and drop. Collection names arrive fully prefixed; the driver knows
//! nothing about the store's namespace.
//!
//! Values handed to a driver are already codec-encoded. Implementations
//! are free to reject values that violate the physical store's key or
//! type restrictions (the in-memory driver does, so codec omissions fail
//! loudly in tests).

use flowstore_core::{Result, Value};

/// Identifier selector for range queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelector {
    /// Match a document id exactly.
    Exact(String),
    /// Match every id containing the given fragment. The workflow engine
    /// uses this to gather all documents of one workflow run by `wfid`.
    Matches(String),
}

impl IdSelector {
    /// Does `id` satisfy this selector?
    pub fn matches(&self, id: &str) -> bool {
        match self {
            IdSelector::Exact(s) => id == s,
            IdSelector::Matches(fragment) => id.contains(fragment.as_str()),
        }
    }
}

/// Filter applied to a collection query.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Every document in the collection.
    All,
    /// Documents whose id satisfies at least one selector.
    Ids(Vec<IdSelector>),
    /// Documents whose named field is present and less than or equal to
    /// the given encoded value. Used for the schedule due-query.
    FieldLte(String, Value),
}

impl Criteria {
    /// Evaluate this filter against a stored document.
    pub fn accepts(&self, id: &str, doc: &Value) -> bool {
        match self {
            Criteria::All => true,
            Criteria::Ids(selectors) => selectors.iter().any(|s| s.matches(id)),
            Criteria::FieldLte(field, bound) => doc
                .as_object()
                .and_then(|map| map.get(field))
                .map(|v| value_lte(v, bound))
                .unwrap_or(false),
        }
    }
}

/// Sort, pagination and direction options for [`Driver::query`].
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Number of matching documents to skip first.
    pub skip: Option<usize>,
    /// Sort by id descending instead of the default ascending.
    pub descending: bool,
}

/// Same-variant ordering used by [`Criteria::FieldLte`] and the stale-lock
/// reaper. Values of different variants are never comparable (and thus
/// never "expired" or "due").
pub fn value_lte(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x <= y,
        (Value::Int(x), Value::Int(y)) => x <= y,
        (Value::Float(x), Value::Float(y)) => x <= y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x <= y,
        _ => false,
    }
}

/// Physical operations required of the underlying document database.
///
/// Implementations must be safe for arbitrary concurrent callers; the
/// atomicity of [`Driver::insert_if_absent`] is the single primitive the
/// whole locking scheme rests on.
pub trait Driver: Send + Sync + 'static {
    /// Point lookup by primary key.
    fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Unconditional upsert of a document under `id`.
    fn save(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Atomic insert-or-no-op: stores `doc` under `id` only if no record
    /// exists, returning whether the insert happened. Never overwrites.
    fn insert_if_absent(&self, collection: &str, id: &str, doc: Value) -> Result<bool>;

    /// Delete by primary key. Returns whether a record existed.
    fn remove(&self, collection: &str, id: &str) -> Result<bool>;

    /// Conditional delete: removes the record under `id` only if its
    /// `field` is missing or `value_lte` the cutoff. Returns whether a
    /// record was removed. This is the stale-lock reaper primitive; the
    /// missing-field case reclaims lock records that never got stamped.
    fn remove_older_than(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        cutoff: &Value,
    ) -> Result<bool>;

    /// Range query ordered by id, filtered by `criteria`, with skip/limit
    /// applied after filtering.
    fn query(
        &self,
        collection: &str,
        criteria: &Criteria,
        options: &QueryOptions,
    ) -> Result<Vec<Value>>;

    /// Number of documents in a collection (0 if it does not exist).
    fn count(&self, collection: &str) -> Result<u64>;

    /// All ids in a collection, ascending.
    fn ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Create an empty collection if it does not exist yet.
    fn ensure_collection(&self, collection: &str) -> Result<()>;

    /// Names of every collection in the database, including ones outside
    /// the store's prefix.
    fn collection_names(&self) -> Result<Vec<String>>;

    /// Drop a whole collection. A no-op if it does not exist.
    fn drop_collection(&self, collection: &str) -> Result<()>;
}
