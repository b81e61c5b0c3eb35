//! Storage layer for flowstore
//!
//! This crate implements the boundary between in-memory documents and the
//! physical document database:
//! - [`Driver`]: the abstract database connection the rest of the system
//!   is written against
//! - [`MemoryDriver`]: reference in-memory implementation
//! - [`codec`]: lossless key/timestamp escaping applied on every physical
//!   write and read

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod driver;
pub mod memory;

pub use driver::{Criteria, Driver, IdSelector, QueryOptions};
pub use memory::MemoryDriver;
