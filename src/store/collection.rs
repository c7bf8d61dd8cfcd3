//! Ordered, lock-guarded record collection shared by both stores.
//!
//! Insertion order is collection order. Every value handed out is a clone,
//! so callers can never alias the stored records. The lock is only taken
//! inside synchronous sections and never held across an await point.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

use crate::error::{FlockError, Result};
use crate::id::{RecordId, next_id};

/// Trait for records owned by a [`Collection`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Get the record's identifier.
    fn id(&self) -> RecordId;

    /// Overwrite the record's identifier (used only by the collection).
    fn set_id(&mut self, id: RecordId);
}

#[derive(Debug)]
struct Inner<T> {
    records: Vec<T>,
    /// Largest id ever present in this collection
    high_water: RecordId,
}

/// Handle to an in-memory record collection.
///
/// Cloning the handle shares the underlying collection.
#[derive(Debug)]
pub struct Collection<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Build a collection from seed records.
    ///
    /// Records repeating an earlier id are dropped so that ids stay unique.
    pub fn new(seed: Vec<T>) -> Self {
        let mut seen = HashSet::with_capacity(seed.len());
        let mut records = Vec::with_capacity(seed.len());

        for record in seed {
            if seen.insert(record.id()) {
                records.push(record);
            } else {
                warn!("Dropping seed record with duplicate id {}", record.id());
            }
        }

        let high_water = records.iter().map(Record::id).max().unwrap_or(0);

        Self {
            inner: Arc::new(Mutex::new(Inner { records, high_water })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>> {
        self.inner.lock().map_err(|e| FlockError::Storage(e.to_string()))
    }

    /// Number of records currently held.
    ///
    /// Reports 0 (with a warning) when the collection lock is poisoned.
    pub fn len(&self) -> usize {
        match self.lock() {
            Ok(inner) => inner.records.len(),
            Err(e) => {
                warn!("Collection length unavailable: {}", e);
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record, in collection order.
    pub fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.records.clone())
    }

    /// Copy of the record with the given id.
    pub fn find(&self, id: RecordId) -> Result<Option<T>> {
        Ok(self.lock()?.records.iter().find(|r| r.id() == id).cloned())
    }

    /// Copies of the records matching `predicate`, in collection order.
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.lock()?.records.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Run a read-only computation against the stored slice.
    pub fn read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&[T]) -> R,
    {
        Ok(f(&self.lock()?.records))
    }

    /// Assign the next id, append the record built from it and return a copy.
    pub fn insert_with<F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(RecordId) -> T,
    {
        let mut inner = self.lock()?;
        let id = next_id(inner.records.iter().map(Record::id), inner.high_water)
            .ok_or_else(|| FlockError::Storage("id space exhausted".to_string()))?;

        let mut record = build(id);
        record.set_id(id);

        inner.high_water = id;
        inner.records.push(record.clone());
        Ok(record)
    }

    /// Apply `change` to a copy of the record and store it in place.
    ///
    /// The id is forced back to `id` afterwards. Returns `None` when absent.
    pub fn modify<F>(&self, id: RecordId, change: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.lock()?;
        let Some(index) = inner.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut updated = inner.records[index].clone();
        change(&mut updated);
        updated.set_id(id);

        inner.records[index] = updated.clone();
        Ok(Some(updated))
    }

    /// Remove the record with the given id. Returns false when absent.
    pub fn remove(&self, id: RecordId) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.records.iter().position(|r| r.id() == id) {
            Some(index) => {
                inner.records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
