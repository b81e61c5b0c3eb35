//! In-memory driver
//!
//! Reference [`Driver`] implementation backed by a `DashMap` of
//! collections, each an `RwLock<BTreeMap>`:
//!
//! - DashMap: sharded, lock-free reads of the collection table
//! - BTreeMap: primary ordering by id, so range queries come out sorted
//!   for free
//! - Per-collection RwLock: `insert_if_absent` takes the write lock for
//!   the check-then-insert, which makes it atomic with respect to every
//!   other writer of that collection
//!
//! The driver emulates the physical store's restrictions: documents whose
//! keys start with `$` or contain `.`, or that carry a raw timestamp
//! value, are rejected. The codec is supposed to make such documents
//! impossible; rejecting them here turns a missed encode into a loud test
//! failure instead of silent corruption.

use crate::driver::{Criteria, Driver, QueryOptions};
use dashmap::DashMap;
use flowstore_core::{Error, Result, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::trace;

type Collection = RwLock<BTreeMap<String, Value>>;

/// In-memory document database.
///
/// # Thread Safety
///
/// All operations are thread-safe. Readers of different collections never
/// contend; writers contend only within one collection.
#[derive(Default)]
pub struct MemoryDriver {
    collections: DashMap<String, Collection>,
}

impl MemoryDriver {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values the physical store could not hold.
    fn validate(doc: &Value) -> Result<()> {
        match doc {
            Value::Object(map) => {
                for (key, value) in map {
                    if key.starts_with('$') {
                        return Err(Error::backend(format!(
                            "key `{key}` starts with `$` and is not storable"
                        )));
                    }
                    if key.contains('.') {
                        return Err(Error::backend(format!(
                            "key `{key}` contains `.` and is not storable"
                        )));
                    }
                    Self::validate(value)?;
                }
                Ok(())
            }
            Value::Array(items) => items.iter().try_for_each(Self::validate),
            Value::Timestamp(_) => Err(Error::backend(
                "raw timestamp values are not storable".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl Driver for MemoryDriver {
    fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|coll| coll.read().get(id).cloned()))
    }

    fn save(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        Self::validate(&doc)?;
        let coll = self.collections.entry(collection.to_string()).or_default();
        coll.write().insert(id.to_string(), doc);
        Ok(())
    }

    fn insert_if_absent(&self, collection: &str, id: &str, doc: Value) -> Result<bool> {
        Self::validate(&doc)?;
        let coll = self.collections.entry(collection.to_string()).or_default();
        let mut map = coll.write();
        if map.contains_key(id) {
            return Ok(false);
        }
        map.insert(id.to_string(), doc);
        Ok(true)
    }

    fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get(collection)
            .map(|coll| coll.write().remove(id).is_some())
            .unwrap_or(false))
    }

    fn remove_older_than(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        cutoff: &Value,
    ) -> Result<bool> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(false);
        };
        let mut map = coll.write();
        let expired = match map.get(id) {
            None => return Ok(false),
            Some(doc) => match doc.as_object().and_then(|m| m.get(field)) {
                // a record that never got its stamp is reclaimable
                None => true,
                Some(stamp) => crate::driver::value_lte(stamp, cutoff),
            },
        };
        if expired {
            map.remove(id);
        }
        Ok(expired)
    }

    fn query(
        &self,
        collection: &str,
        criteria: &Criteria,
        options: &QueryOptions,
    ) -> Result<Vec<Value>> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let map = coll.read();

        let mut matching: Vec<Value> = map
            .iter()
            .filter(|(id, doc)| criteria.accepts(id, doc))
            .map(|(_, doc)| doc.clone())
            .collect();
        if options.descending {
            matching.reverse();
        }

        let skip = options.skip.unwrap_or(0);
        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(skip).take(limit).collect())
    }

    fn count(&self, collection: &str) -> Result<u64> {
        Ok(self
            .collections
            .get(collection)
            .map(|coll| coll.read().len() as u64)
            .unwrap_or(0))
    }

    fn ids(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self
            .collections
            .get(collection)
            .map(|coll| coll.read().keys().cloned().collect())
            .unwrap_or_default())
    }

    fn ensure_collection(&self, collection: &str) -> Result<()> {
        self.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    fn collection_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn drop_collection(&self, collection: &str) -> Result<()> {
        trace!(collection, "dropping collection");
        self.collections.remove(collection);
        Ok(())
    }
}
