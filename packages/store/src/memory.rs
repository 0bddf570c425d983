//! In-memory store.

use crate::{Collections, Document, DocumentStore, Fields, Filter, StoreError};

/// [`DocumentStore`] held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Collections,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(crate::get_in(&self.collections, collection, id))
    }

    fn set(
        &mut self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError> {
        crate::set_in(&mut self.collections, collection, id, fields, merge);
        Ok(())
    }

    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(crate::query_in(&self.collections, collection, filter))
    }
}
