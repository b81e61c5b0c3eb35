//! Concurrency layer for flowstore
//!
//! This crate implements the lease-based lock serializing conflicting
//! document writes:
//! - [`LockManager`]: named mutual exclusion over the shared lock
//!   collection, self-healing via lease expiry

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lock;

pub use lock::LockManager;
