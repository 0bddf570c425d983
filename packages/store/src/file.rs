//! Single-file JSON store.
//!
//! The whole store is one JSON object `{collection: {id: fields}}`. Every
//! [`DocumentStore::set`] rewrites the file through a `.tmp` sibling and a
//! rename, so an interrupted write never leaves a truncated store behind.

use std::path::{Path, PathBuf};

use crate::{Collections, Document, DocumentStore, Fields, Filter, StoreError};

/// [`DocumentStore`] persisted to a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collections: Collections,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or
    /// parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let collections = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            log::debug!("{} does not exist yet, starting empty", path.display());
            Collections::new()
        };

        Ok(Self { path, collections })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let contents = serde_json::to_string_pretty(&self.collections)?;
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
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
        self.save()
    }

    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(crate::query_in(&self.collections, collection, filter))
    }
}
