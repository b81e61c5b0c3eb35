//! Core types for flowstore
//!
//! This crate defines the fundamental types used throughout the system:
//! - [`Value`]: tagged-variant document value (including timestamps)
//! - [`Document`]: typed, identified, versioned record
//! - [`StoreConfig`]: explicit per-store configuration
//! - [`Error`]: shared error type (conflicts are values, not errors)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod value;

pub use config::StoreConfig;
pub use document::Document;
pub use error::{Error, Result};
pub use value::{Map, Value};
