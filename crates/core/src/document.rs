//! Document: the unit of storage
//!
//! A document is a string-keyed mapping of [`Value`]s with three reserved
//! fields:
//!
//! - `id` - primary key, unique within its `type`, immutable once assigned
//! - `type` - logical collection; collections are created lazily
//! - `rev` - monotonically increasing integer, the optimistic-concurrency
//!   token; absent until the first successful write seeds it to 0
//!
//! Everything else in the mapping is owned by the workflow engine
//! (`wfid`, expression trees, workitem payloads, ...). The store stamps
//! `put_at` on every successful write.

use crate::error::{Error, Result};
use crate::value::{Map, Value};
use chrono::{DateTime, Utc};

/// Reserved field: primary key.
pub const FIELD_ID: &str = "id";
/// Reserved field: logical collection name.
pub const FIELD_TYPE: &str = "type";
/// Reserved field: optimistic-concurrency revision.
pub const FIELD_REV: &str = "rev";
/// Reserved field: stamp of the last successful write.
pub const FIELD_PUT_AT: &str = "put_at";
/// Schedule field: fire-at instant, set by `put_schedule`.
pub const FIELD_AT: &str = "at";

/// A typed, identified, versioned record.
///
/// Thin wrapper over a [`Map`] that gives typed access to the reserved
/// fields. The in-memory document is unrestricted; key restrictions only
/// apply at the storage boundary, where the codec escapes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: Map,
}

impl Document {
    /// Create a new document with `type` and `id` set and no revision.
    pub fn new(doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_TYPE.to_string(), Value::String(doc_type.into()));
        fields.insert(FIELD_ID.to_string(), Value::String(id.into()));
        Document { fields }
    }

    /// Wrap an existing field map.
    pub fn from_map(fields: Map) -> Self {
        Document { fields }
    }

    /// Build a document from a JSON object.
    ///
    /// Fails if the JSON value is not an object; reserved fields are not
    /// validated here (that happens in `put`/`delete`).
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Object(fields) => Ok(Document { fields }),
            other => Err(Error::NotADocument(other.type_name())),
        }
    }

    /// Unwrap into a [`Value::Object`].
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Rebuild from a decoded storage value.
    ///
    /// The driver hands back `Value`s; anything but an object is a storage
    /// corruption and surfaces as an error.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Document { fields }),
            other => Err(Error::NotADocument(other.type_name())),
        }
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &Map {
        &self.fields
    }

    /// Get a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    // ========================================================================
    // Reserved field access
    // ========================================================================

    /// The primary key, if present.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(FIELD_ID).and_then(Value::as_str)
    }

    /// The logical collection name, if present.
    pub fn doc_type(&self) -> Option<&str> {
        self.fields.get(FIELD_TYPE).and_then(Value::as_str)
    }

    /// The current revision, if the document has ever been written.
    pub fn rev(&self) -> Option<i64> {
        self.fields.get(FIELD_REV).and_then(Value::as_int)
    }

    /// Overwrite the revision field.
    pub fn set_rev(&mut self, rev: i64) {
        self.fields.insert(FIELD_REV.to_string(), Value::Int(rev));
    }

    /// The `put_at` stamp of the last successful write, if any.
    pub fn put_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(FIELD_PUT_AT).and_then(Value::as_timestamp)
    }

    /// `id`, or a missing-field error. Used by write paths that must fail
    /// fast on malformed documents.
    pub fn require_id(&self) -> Result<&str> {
        self.id().ok_or(Error::MissingField(FIELD_ID))
    }

    /// `type`, or a missing-field error.
    pub fn require_type(&self) -> Result<&str> {
        self.doc_type().ok_or(Error::MissingField(FIELD_TYPE))
    }

    /// `rev`, or a missing-field error. `delete` rejects rev-less documents
    /// because there is no tombstone to disambiguate them against.
    pub fn require_rev(&self) -> Result<i64> {
        self.rev().ok_or(Error::MissingField(FIELD_REV))
    }
}
