//! DocumentStore: versioned per-type document CRUD
//!
//! The store is the engine-facing surface of this layer. It combines:
//! - optimistic concurrency via the `rev` field (a write applies only if
//!   the caller's `rev` matches the stored one)
//! - the lock manager, which serializes the read-check-write section per
//!   document key
//! - the storage codec, applied on every physical write and read
//!
//! ## Outcome encoding
//!
//! `put` and `delete` report conflicts as values, not errors:
//! - [`WriteOutcome::Applied`] - the write happened
//! - [`WriteOutcome::Conflict`] - revision mismatch; carries the
//!   authoritative current document so the caller can re-read and retry
//! - [`WriteOutcome::Gone`] - the caller expected an existing document
//!   but there is none (deleted underneath, or a stale create)
//!
//! ## Revision convention
//!
//! A document's first successful write seeds `rev` to 0; every later
//! write increments by exactly 1. Revisions are never reused.
//!
//! Reads are plain point lookups and take no lock; a caller needing a
//! consistent read-modify-write relies on `put`'s built-in check.

use chrono::Utc;
use flowstore_concurrency::LockManager;
use flowstore_core::document::FIELD_PUT_AT;
use flowstore_core::{Document, Result, StoreConfig, Value};
use flowstore_storage::codec;
use flowstore_storage::{Criteria, Driver, IdSelector, QueryOptions};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a `put` or `delete`.
///
/// Conflicts are expected and recoverable; callers retry with fresh state.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The write was applied.
    Applied,
    /// Revision mismatch; here is the authoritative current document.
    Conflict(Document),
    /// The caller supplied a revision but no document exists.
    Gone,
}

impl WriteOutcome {
    /// True if the write was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// Options for [`DocumentStore::put`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PutOptions {
    /// Skip locking; the caller already holds equivalent exclusivity.
    pub force: bool,
    /// On success, bump the caller's in-memory `rev` to the new revision
    /// so the document can be reused without a re-read.
    pub update_rev: bool,
}

/// Per-type collections of revisioned documents over a [`Driver`].
pub struct DocumentStore<D: Driver> {
    driver: Arc<D>,
    locks: LockManager<D>,
    config: StoreConfig,
}

impl<D: Driver> DocumentStore<D> {
    /// Build a store over `driver` with the given configuration.
    pub fn new(driver: Arc<D>, config: StoreConfig) -> Self {
        let locks = LockManager::new(Arc::clone(&driver), &config);
        DocumentStore {
            driver,
            locks,
            config,
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying driver.
    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    fn collection(&self, doc_type: &str) -> String {
        self.config.collection(doc_type)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Point read by (`type`, `id`). No locking; not linearizable with
    /// concurrent writes.
    pub fn get(&self, doc_type: &str, id: &str) -> Result<Option<Document>> {
        match self.driver.find_one(&self.collection(doc_type), id)? {
            Some(stored) => Ok(Some(Document::from_value(codec::decode(stored))?)),
            None => Ok(None),
        }
    }

    /// Documents of a type, optionally filtered by id selectors.
    ///
    /// An empty selector slice means "all documents of the type". Results
    /// are sorted by id, ascending unless `options.descending`.
    pub fn get_many(
        &self,
        doc_type: &str,
        selectors: &[IdSelector],
        options: &QueryOptions,
    ) -> Result<Vec<Document>> {
        let criteria = if selectors.is_empty() {
            Criteria::All
        } else {
            Criteria::Ids(selectors.to_vec())
        };
        self.driver
            .query(&self.collection(doc_type), &criteria, options)?
            .into_iter()
            .map(|stored| Document::from_value(codec::decode(stored)))
            .collect()
    }

    /// Number of documents of a type.
    pub fn count(&self, doc_type: &str) -> Result<u64> {
        self.driver.count(&self.collection(doc_type))
    }

    /// All identifiers of a type, ascending.
    pub fn ids(&self, doc_type: &str) -> Result<Vec<String>> {
        self.driver.ids(&self.collection(doc_type))
    }

    /// Sorted, newline-joined rendering of a whole collection. Debug aid.
    pub fn dump(&self, doc_type: &str) -> Result<String> {
        let mut lines: Vec<String> = self
            .get_many(doc_type, &[], &QueryOptions::default())?
            .into_iter()
            .map(|doc| doc.into_value().to_json().to_string())
            .collect();
        lines.sort();
        Ok(lines.join("\n"))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Write a document with optimistic concurrency.
    ///
    /// The caller's `rev` must match the stored one (or be absent for a
    /// first insert). On success the stored document gets `rev + 1` (0 for
    /// a first insert) and a fresh `put_at` stamp; `doc` itself is only
    /// mutated when `options.update_rev` is set.
    ///
    /// Fails fast with [`flowstore_core::Error::MissingField`] when `id`
    /// or `type` is absent.
    pub fn put(&self, doc: &mut Document, options: PutOptions) -> Result<WriteOutcome> {
        let id = doc.require_id()?.to_string();
        let doc_type = doc.require_type()?.to_string();
        let expected = doc.rev();
        let collection = self.collection(&doc_type);

        self.locks.run_locked(&id, options.force, || {
            if let Some(current) = self.get(&doc_type, &id)? {
                if current.rev() != expected {
                    debug!(
                        doc_type,
                        id,
                        expected_rev = ?expected,
                        current_rev = ?current.rev(),
                        "put conflict"
                    );
                    return Ok(WriteOutcome::Conflict(current));
                }
            } else if expected.is_some() {
                // stale create: the document was deleted underneath the caller
                return Ok(WriteOutcome::Gone);
            }

            let new_rev = expected.map_or(0, |rev| rev + 1);
            let mut stored = doc.clone();
            stored.set_rev(new_rev);
            stored.set(FIELD_PUT_AT, Value::Timestamp(Utc::now()));
            let encoded = codec::encode(stored.into_value());

            match self.driver.save(&collection, &id, encoded) {
                Ok(()) => {
                    if options.update_rev {
                        doc.set_rev(new_rev);
                    }
                    Ok(WriteOutcome::Applied)
                }
                Err(err) => {
                    // a driver hiccup reads as a lost conditional update:
                    // report whoever won instead of propagating
                    warn!(doc_type, id, %err, "physical save failed, treating as conflict");
                    match self.get(&doc_type, &id)? {
                        Some(current) => Ok(WriteOutcome::Conflict(current)),
                        None => Ok(WriteOutcome::Gone),
                    }
                }
            }
        })
    }

    /// Delete a document whose `rev` matches the stored one.
    ///
    /// A document without `rev` is rejected outright: with no tombstones a
    /// rev-less delete is ambiguous.
    pub fn delete(&self, doc: &Document, force: bool) -> Result<WriteOutcome> {
        let rev = doc.require_rev()?;
        let id = doc.require_id()?.to_string();
        let doc_type = doc.require_type()?.to_string();
        let collection = self.collection(&doc_type);

        self.locks.run_locked(&id, force, || {
            match self.get(&doc_type, &id)? {
                None => Ok(WriteOutcome::Gone),
                Some(current) if current.rev() != Some(rev) => {
                    debug!(doc_type, id, "delete conflict");
                    Ok(WriteOutcome::Conflict(current))
                }
                Some(_) => {
                    self.driver.remove(&collection, &id)?;
                    Ok(WriteOutcome::Applied)
                }
            }
        })
    }

    // ========================================================================
    // Collection management
    // ========================================================================

    /// Create the collection for a type ahead of its first write.
    /// Collections are otherwise created lazily.
    pub fn add_type(&self, doc_type: &str) -> Result<()> {
        self.driver.ensure_collection(&self.collection(doc_type))
    }

    /// Drop every document of one type.
    pub fn purge_type(&self, doc_type: &str) -> Result<()> {
        self.driver.drop_collection(&self.collection(doc_type))
    }

    /// Drop every collection under this store's prefix. Collections
    /// outside the prefix are never touched.
    pub fn purge(&self) -> Result<()> {
        for name in self.driver.collection_names()? {
            if self.config.owns_collection(&name) {
                self.driver.drop_collection(&name)?;
            }
        }
        Ok(())
    }
}
