//! flowstore: versioned document storage and locking for workflow engines
//!
//! A persistence layer over a schema-less document database, built for a
//! workflow-execution engine's process state (expressions, workitems,
//! errors, variables, schedules). Three ideas combined:
//!
//! - optimistic-concurrency CRUD keyed by (`type`, `id`), with a
//!   monotonic `rev` token deciding who wins
//! - a lease-based distributed lock serializing conflicting writes on top
//!   of one atomic insert-if-absent primitive (no native transactions)
//! - a lossless key/timestamp codec, because the physical store forbids
//!   keys starting with `$` or containing `.` and has no durable date type
//!
//! ```
//! use flowstore::{Document, DocumentStore, MemoryDriver, PutOptions, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = DocumentStore::new(Arc::new(MemoryDriver::new()), StoreConfig::default());
//!
//! let mut doc = Document::new("workitems", "wi-1");
//! doc.set("participant", "alice");
//! let outcome = store.put(&mut doc, PutOptions::default())?;
//! assert!(outcome.is_applied());
//!
//! let stored = store.get("workitems", "wi-1")?.unwrap();
//! assert_eq!(stored.rev(), Some(0));
//! # Ok::<(), flowstore::Error>(())
//! ```

#![warn(missing_docs)]

pub use flowstore_concurrency::LockManager;
pub use flowstore_core::{Document, Error, Map, Result, StoreConfig, Value};
pub use flowstore_engine::{DocumentStore, PutOptions, ScheduleStore, WriteOutcome, SCHEDULES_TYPE};
pub use flowstore_storage::{codec, Criteria, Driver, IdSelector, MemoryDriver, QueryOptions};
