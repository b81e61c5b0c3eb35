//! Store configuration
//!
//! One explicit struct passed at construction time. There is no process-wide
//! state: two stores with different prefixes can share a driver without
//! seeing each other's collections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the lock collection, appended to the prefix.
pub const LOCKS_TYPE: &str = "locks";

/// Configuration for a document store and its lock manager.
///
/// Every participant sharing a physical database must use the same
/// `collection_prefix` and `lock_lease`; the lease-based self-healing of
/// abandoned locks breaks if contenders disagree on the timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix for every collection this store touches. `purge` only ever
    /// drops collections under this prefix.
    pub collection_prefix: String,

    /// Age after which a lock record may be reclaimed by any contender.
    pub lock_lease: Duration,

    /// Sleep between lock acquisition attempts.
    pub lock_backoff: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            collection_prefix: "flow_".to_string(),
            lock_lease: Duration::from_secs(60),
            lock_backoff: Duration::from_millis(30),
        }
    }
}

impl StoreConfig {
    /// Config with a non-default collection prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        StoreConfig {
            collection_prefix: prefix.into(),
            ..StoreConfig::default()
        }
    }

    /// Physical collection name for a document type.
    pub fn collection(&self, doc_type: &str) -> String {
        format!("{}{}", self.collection_prefix, doc_type)
    }

    /// Physical name of the lock collection.
    pub fn lock_collection(&self) -> String {
        self.collection(LOCKS_TYPE)
    }

    /// True if `name` belongs to this store's namespace.
    pub fn owns_collection(&self, name: &str) -> bool {
        name.starts_with(&self.collection_prefix)
    }

    /// Strip the prefix off a physical collection name.
    pub fn type_of_collection<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(&self.collection_prefix)
    }
}
