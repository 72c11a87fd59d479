//! Dataset persistence boundary.
//!
//! The engine itself never touches storage. [`DatasetStore`] is the seam a
//! document database would sit behind; [`InMemoryStore`] is the bundled
//! implementation used by the CLI and the tests.
//!
//! # Thread Safety
//!
//! [`InMemoryStore`] keeps every dataset in a single `parking_lot::RwLock`.
//! Each call takes the lock once, so a single call is atomic, but a
//! fetch followed by a replace is not. Callers that read, transform and write
//! back a row set must serialize per dataset themselves (see
//! [`DatasetService::clean`](crate::service::DatasetService::clean)).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DatasetError, Result};
use crate::types::{DatasetMetadata, Row};

/// Storage for dataset metadata and row sets, keyed by dataset id.
pub trait DatasetStore: Send + Sync {
    /// Store a new dataset. An existing dataset with the same id is replaced.
    fn insert(&self, metadata: DatasetMetadata, rows: Vec<Row>) -> Result<()>;

    /// Metadata of one dataset.
    fn metadata(&self, id: &str) -> Result<DatasetMetadata>;

    /// Overwrite the metadata of an existing dataset.
    fn update_metadata(&self, metadata: DatasetMetadata) -> Result<()>;

    /// Metadata of every dataset, newest first. Datasets created at the same
    /// instant are ordered by insertion, latest first.
    fn list(&self) -> Vec<DatasetMetadata>;

    /// The full row set of one dataset.
    fn rows(&self, id: &str) -> Result<Vec<Row>>;

    /// At most `limit` rows starting at `offset`. Out-of-range offsets yield no rows.
    fn rows_page(&self, id: &str, offset: usize, limit: usize) -> Result<Vec<Row>>;

    /// Number of stored rows.
    fn row_count(&self, id: &str) -> Result<usize>;

    /// Replace the whole row set (delete-all then insert-all).
    fn replace_rows(&self, id: &str, rows: Vec<Row>) -> Result<()>;

    /// Remove a dataset and its rows.
    fn delete(&self, id: &str) -> Result<()>;
}

struct Entry {
    metadata: DatasetMetadata,
    rows: Vec<Row>,
    seq: u64,
}

/// Process-local [`DatasetStore`].
#[derive(Default)]
pub struct InMemoryStore {
    datasets: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored datasets.
    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }
}

static_assertions::assert_impl_all!(InMemoryStore: Send, Sync);

fn not_found(id: &str) -> DatasetError {
    DatasetError::DatasetNotFound(id.to_string())
}

impl DatasetStore for InMemoryStore {
    fn insert(&self, metadata: DatasetMetadata, rows: Vec<Row>) -> Result<()> {
        let id = metadata.id.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.datasets.write().insert(id, Entry { metadata, rows, seq });
        Ok(())
    }

    fn metadata(&self, id: &str) -> Result<DatasetMetadata> {
        self.datasets
            .read()
            .get(id)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| not_found(id))
    }

    fn update_metadata(&self, metadata: DatasetMetadata) -> Result<()> {
        let mut guard = self.datasets.write();
        let entry = guard
            .get_mut(&metadata.id)
            .ok_or_else(|| not_found(&metadata.id))?;
        entry.metadata = metadata;
        Ok(())
    }

    fn list(&self) -> Vec<DatasetMetadata> {
        let guard = self.datasets.read();
        let mut entries: Vec<&Entry> = guard.values().collect();
        entries.sort_by(|a, b| {
            b.metadata
                .created_at
                .cmp(&a.metadata.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|entry| entry.metadata.clone()).collect()
    }

    fn rows(&self, id: &str) -> Result<Vec<Row>> {
        self.datasets
            .read()
            .get(id)
            .map(|entry| entry.rows.clone())
            .ok_or_else(|| not_found(id))
    }

    fn rows_page(&self, id: &str, offset: usize, limit: usize) -> Result<Vec<Row>> {
        let guard = self.datasets.read();
        let entry = guard.get(id).ok_or_else(|| not_found(id))?;
        Ok(entry.rows.iter().skip(offset).take(limit).cloned().collect())
    }

    fn row_count(&self, id: &str) -> Result<usize> {
        self.datasets
            .read()
            .get(id)
            .map(|entry| entry.rows.len())
            .ok_or_else(|| not_found(id))
    }

    fn replace_rows(&self, id: &str, rows: Vec<Row>) -> Result<()> {
        let mut guard = self.datasets.write();
        let entry = guard.get_mut(id).ok_or_else(|| not_found(id))?;
        entry.rows = rows;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.datasets
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileType, Value};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    fn metadata(id: &str, created_secs: i64) -> DatasetMetadata {
        let created = Utc.timestamp_opt(created_secs, 0).unwrap();
        DatasetMetadata {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            file_name: format!("{id}.csv"),
            file_size: 0,
            file_type: FileType::Csv,
            column_types: IndexMap::new(),
            summary: IndexMap::new(),
            row_count: 0,
            created_at: created,
            last_modified: created,
        }
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row::from([("i".to_string(), Value::Number(i as f64))]))
            .collect()
    }

    #[test]
    fn test_insert_and_fetch() {
        let store = InMemoryStore::new();
        store.insert(metadata("a", 0), rows(3)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.metadata("a").unwrap().id, "a");
        assert_eq!(store.rows("a").unwrap().len(), 3);
        assert_eq!(store.row_count("a").unwrap(), 3);
    }

    #[test]
    fn test_missing_dataset() {
        let store = InMemoryStore::new();
        assert!(matches!(store.rows("nope"), Err(DatasetError::DatasetNotFound(_))));
        assert!(matches!(store.delete("nope"), Err(DatasetError::DatasetNotFound(_))));
        assert!(store.replace_rows("nope", vec![]).is_err());
    }

    #[test]
    fn test_rows_page_bounds() {
        let store = InMemoryStore::new();
        store.insert(metadata("a", 0), rows(5)).unwrap();

        let page = store.rows_page("a", 3, 10).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0]["i"], Value::Number(3.0));
        assert!(store.rows_page("a", 50, 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let store = InMemoryStore::new();
        store.insert(metadata("old", 10), vec![]).unwrap();
        store.insert(metadata("new", 20), vec![]).unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_list_same_timestamp_by_insertion() {
        let store = InMemoryStore::new();
        for n in 1..=12 {
            store.insert(metadata(&format!("ds-{n}"), 30), vec![]).unwrap();
        }

        let ids: Vec<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids[0], "ds-12");
        assert_eq!(ids[2], "ds-10");
        assert_eq!(ids[3], "ds-9");
        assert_eq!(ids[11], "ds-1");
    }

    #[test]
    fn test_replace_and_delete() {
        let store = InMemoryStore::new();
        store.insert(metadata("a", 0), rows(4)).unwrap();

        store.replace_rows("a", rows(1)).unwrap();
        assert_eq!(store.row_count("a").unwrap(), 1);

        store.delete("a").unwrap();
        assert!(store.is_empty());
    }
}
