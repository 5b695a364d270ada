//! In-memory project store.
//!
//! Keeps the encoded collection as a raw string, exactly like the SQLite
//! store, so decoding and corrupt-state recovery behave the same.

use crate::model::document::Document;
use crate::repo::project_repo::{decode_collection, encode_collection, ProjectStore, StoreResult};
use std::cell::{Cell, RefCell};

/// Process-local project store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    raw: RefCell<Option<String>>,
    writes: Cell<usize>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose stored value is `raw`, bypassing encoding.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
            writes: Cell::new(0),
        }
    }

    /// Returns the stored value as written.
    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }

    /// Number of `save_all` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn load_all(&self) -> StoreResult<Vec<Document>> {
        decode_collection(self.raw.borrow().as_deref())
    }

    fn save_all(&self, documents: &[Document]) -> StoreResult<()> {
        let encoded = encode_collection(documents)?;
        *self.raw.borrow_mut() = Some(encoded);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
