//! Lease-based distributed lock
//!
//! Named mutual exclusion built on the driver's one atomic primitive,
//! `insert_if_absent`. No native transaction support is assumed.
//!
//! ## State machine per key
//!
//! ```text
//! UNLOCKED -> (acquire) -> HELD -> (release | lease-expired-reclaim) -> UNLOCKED
//! ```
//!
//! ## Acquisition protocol
//!
//! 1. Conditionally delete any lock record for the key whose stamp is
//!    older than the lease, or that has no stamp at all. A crashed holder
//!    therefore never wedges the key for longer than the lease.
//! 2. Atomically insert a fresh record carrying the acquisition stamp.
//!    Folding the stamp into the insert keeps the record reclaimable even
//!    if the holder dies immediately after acquiring.
//!
//! Every participant sharing the lock collection must use the same lease;
//! otherwise a slow holder's lock can be reclaimed while still live.
//!
//! No fairness is guaranteed among waiters. The protected sections are
//! single-document reads and writes, so contention is expected to be rare
//! and short-lived; `acquire_blocking` is a plain retry loop with a fixed
//! backoff.

use chrono::Utc;
use flowstore_core::document::FIELD_AT;
use flowstore_core::{Map, Result, StoreConfig, Value};
use flowstore_storage::codec;
use flowstore_storage::Driver;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Named, lease-based mutual exclusion over a shared lock collection.
pub struct LockManager<D: Driver> {
    driver: Arc<D>,
    collection: String,
    lease: Duration,
    backoff: Duration,
}

impl<D: Driver> LockManager<D> {
    /// Build a lock manager over the configured lock collection.
    pub fn new(driver: Arc<D>, config: &StoreConfig) -> Self {
        LockManager {
            driver,
            collection: config.lock_collection(),
            lease: config.lock_lease,
            backoff: config.lock_backoff,
        }
    }

    /// One acquisition attempt: reap a stale record, then race the atomic
    /// insert. Returns whether this caller now holds the lock.
    pub fn try_acquire(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::milliseconds(self.lease.as_millis() as i64);

        let reaped = self.driver.remove_older_than(
            &self.collection,
            key,
            FIELD_AT,
            &Value::String(codec::format_timestamp(cutoff)),
        )?;
        if reaped {
            warn!(key, "reclaimed a stale lock record");
        }

        let mut record = Map::new();
        record.insert(
            FIELD_AT.to_string(),
            Value::String(codec::format_timestamp(now)),
        );
        let acquired = self
            .driver
            .insert_if_absent(&self.collection, key, Value::Object(record))?;
        if acquired {
            debug!(key, "lock acquired");
        }
        Ok(acquired)
    }

    /// Retry [`Self::try_acquire`] until it succeeds.
    ///
    /// Worst-case wait is bounded by the lease: a dead holder's record is
    /// reclaimed on the first attempt after it expires. There is no
    /// cancellation; callers needing bounded latency wrap this themselves.
    pub fn acquire_blocking(&self, key: &str) -> Result<()> {
        loop {
            if self.try_acquire(key)? {
                return Ok(());
            }
            std::thread::sleep(self.backoff);
        }
    }

    /// Remove the lock record for `key`, held or not.
    pub fn release(&self, key: &str) -> Result<()> {
        self.driver.remove(&self.collection, key)?;
        debug!(key, "lock released");
        Ok(())
    }

    /// Run `body` while holding the lock for `key`.
    ///
    /// With `force` the lock is skipped entirely; callers use that when
    /// they already hold equivalent exclusivity (administrative paths).
    /// The lock record is removed on every exit path, including a panic
    /// inside `body`, so a failing critical section never leaves the key
    /// locked.
    pub fn run_locked<T>(
        &self,
        key: &str,
        force: bool,
        body: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        if force {
            return body();
        }
        self.acquire_blocking(key)?;
        let _guard = LockGuard { manager: self, key };
        body()
    }
}

/// Removes the lock record when dropped, whatever the exit path was.
struct LockGuard<'a, D: Driver> {
    manager: &'a LockManager<D>,
    key: &'a str,
}

impl<D: Driver> Drop for LockGuard<'_, D> {
    fn drop(&mut self) {
        if let Err(err) = self.manager.release(self.key) {
            // the lease will reclaim it eventually
            warn!(key = self.key, %err, "failed to release lock");
        }
    }
}
