//! Shared fixtures for the integration suite.

use flowstore::{Document, DocumentStore, MemoryDriver, StoreConfig};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Fresh store over its own in-memory database, with logging wired up.
pub fn store() -> Arc<DocumentStore<MemoryDriver>> {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
    Arc::new(DocumentStore::new(
        Arc::new(MemoryDriver::new()),
        StoreConfig::default(),
    ))
}

/// Document from a JSON literal.
pub fn doc(json: serde_json::Value) -> Document {
    Document::from_json(json).expect("test document must be an object")
}
