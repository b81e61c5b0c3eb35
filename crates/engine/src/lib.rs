//! Engine-facing storage surface for flowstore
//!
//! This crate assembles the pieces into what the workflow engine calls:
//! - [`DocumentStore`]: per-type CRUD with optimistic concurrency,
//!   serialized per key by the lock manager
//! - [`ScheduleStore`]: the timer-record specialization

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod schedule;
pub mod store;

pub use schedule::{ScheduleStore, SCHEDULES_TYPE};
pub use store::{DocumentStore, PutOptions, WriteOutcome};
