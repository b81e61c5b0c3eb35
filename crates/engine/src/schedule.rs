//! ScheduleStore: timer records over the document store
//!
//! Thin specialization for the engine's timer subsystem. Schedules are
//! ordinary documents of type `schedules` tagged with an `at` instant;
//! the due-query returns everything that should have fired by `now`, in
//! no particular order - the engine re-sorts and filters as needed.

use crate::store::{DocumentStore, PutOptions};
use chrono::{DateTime, Utc};
use flowstore_core::document::FIELD_AT;
use flowstore_core::{Document, Error, Result, Value};
use flowstore_storage::codec;
use flowstore_storage::{Criteria, Driver, QueryOptions};
use std::sync::Arc;
use uuid::Uuid;

/// Document type used for timer records.
pub const SCHEDULES_TYPE: &str = "schedules";

/// Timer-record facade over a shared [`DocumentStore`].
#[derive(Clone)]
pub struct ScheduleStore<D: Driver> {
    store: Arc<DocumentStore<D>>,
}

impl<D: Driver> ScheduleStore<D> {
    /// Wrap a document store.
    pub fn new(store: Arc<DocumentStore<D>>) -> Self {
        ScheduleStore { store }
    }

    /// Every schedule whose `at` is at or before `now`.
    pub fn get_due(&self, now: DateTime<Utc>) -> Result<Vec<Document>> {
        let collection = self.store.config().collection(SCHEDULES_TYPE);
        let criteria = Criteria::FieldLte(
            FIELD_AT.to_string(),
            Value::String(codec::format_timestamp(now)),
        );
        self.store
            .driver()
            .query(&collection, &criteria, &QueryOptions::default())?
            .into_iter()
            .map(|stored| Document::from_value(codec::decode(stored)))
            .collect()
    }

    /// Store a new schedule firing at `at`, owned by `owner` (typically a
    /// workflow expression id), carrying the message to re-dispatch.
    /// Returns the generated schedule id.
    pub fn put_schedule(&self, owner: &str, at: DateTime<Utc>, msg: Value) -> Result<String> {
        let id = format!("sch-{}", Uuid::new_v4());
        let mut doc = Document::new(SCHEDULES_TYPE, id.clone());
        doc.set(FIELD_AT, Value::Timestamp(at));
        doc.set("owner", owner);
        doc.set("msg", msg);

        // the id is freshly generated, so a non-applied outcome means the
        // backend is misbehaving, not that the caller raced anyone
        let outcome = self.store.put(&mut doc, PutOptions::default())?;
        if !outcome.is_applied() {
            return Err(Error::backend(format!(
                "put_schedule failed for fresh id `{id}`"
            )));
        }
        Ok(id)
    }
}
