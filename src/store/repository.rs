//! Typed access to persisted collections.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::{Collection, Store};

/// Decodes and encodes collections on top of a [`Store`].
///
/// Every read-modify-write goes through [`Repository::update`], which holds
/// a single write guard, so concurrent writers never drop each other's rows.
pub struct Repository {
    store: Arc<dyn Store>,
    write_guard: Mutex<()>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Wraps a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            write_guard: Mutex::new(()),
        }
    }

    /// Loads a collection.
    ///
    /// A collection that was never written, or whose contents no longer
    /// decode, reads as empty. Rows that fail to decode on their own are
    /// skipped. Only a failing store is an error.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> EngineResult<Vec<T>> {
        Ok(self
            .read_rows(collection)?
            .map(|rows| rows.items)
            .unwrap_or_default())
    }

    /// Runs `apply` against the decoded collection and writes it back.
    ///
    /// Nothing is written when `apply` fails. Rows that do not decode are
    /// written back untouched after the decoded ones. Stored contents that
    /// are not a list at all are never overwritten; the update fails with
    /// [`EngineError::Persistence`] instead.
    pub fn update<T, R, F>(&self, collection: Collection, apply: F) -> EngineResult<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> EngineResult<R>,
    {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let Rows {
            mut items,
            undecodable,
        } = self
            .read_rows(collection)?
            .ok_or_else(|| EngineError::Persistence {
                collection: collection.name().to_string(),
                message: "stored contents are not a list; refusing to overwrite".to_string(),
            })?;
        let outcome = apply(&mut items)?;
        self.save(collection, &items, undecodable)?;
        Ok(outcome)
    }

    /// Appends one item to a collection.
    pub fn append<T>(&self, collection: Collection, item: T) -> EngineResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.update(collection, |items: &mut Vec<T>| {
            items.push(item);
            Ok(())
        })
    }

    /// Decodes a collection row by row; `None` when the contents are not a list.
    fn read_rows<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> EngineResult<Option<Rows<T>>> {
        let Some(raw) = self.store.get(collection)? else {
            return Ok(Some(Rows::empty()));
        };
        if raw.trim().is_empty() {
            return Ok(Some(Rows::empty()));
        }
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    collection = %collection,
                    error = %err,
                    "Corrupt collection treated as empty"
                );
                return Ok(None);
            }
        };

        let mut rows = Rows::empty();
        for value in values {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(item) => rows.items.push(item),
                Err(err) => {
                    warn!(
                        collection = %collection,
                        error = %err,
                        "Undecodable row kept aside"
                    );
                    rows.undecodable.push(value);
                }
            }
        }
        Ok(Some(rows))
    }

    fn save<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
        undecodable: Vec<Value>,
    ) -> EngineResult<()> {
        let persistence = |e: serde_json::Error| EngineError::Persistence {
            collection: collection.name().to_string(),
            message: e.to_string(),
        };
        let mut values = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(persistence)?;
        values.extend(undecodable);
        let contents = serde_json::to_string_pretty(&values).map_err(persistence)?;
        self.store.set(collection, contents)
    }
}

/// A decoded collection plus the raw rows that did not decode.
struct Rows<T> {
    items: Vec<T>,
    undecodable: Vec<Value>,
}

impl<T> Rows<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            undecodable: Vec::new(),
        }
    }
}
