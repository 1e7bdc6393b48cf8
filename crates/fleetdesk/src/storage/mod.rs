//! Storage layer for fleetdesk.
//!
//! Collections are persisted as JSON arrays under one key each. The
//! [`RecordStore`] trait is the raw key-value boundary; [`load`], [`save`]
//! and [`WriteBatch`] add typed (de)serialization on top of any store.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A named collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Drivers.
    Drivers,
    /// Vehicles.
    Vehicles,
    /// Tires and their install cycles.
    Tires,
    /// Refuellings.
    Fuelings,
    /// Freight orders.
    Freights,
    /// Vehicle and driver documents.
    Documents,
    /// Alerts.
    Alerts,
    /// Maintenance records.
    Maintenance,
}

impl Collection {
    /// Every known collection.
    pub const ALL: [Self; 8] = [
        Self::Drivers,
        Self::Vehicles,
        Self::Tires,
        Self::Fuelings,
        Self::Freights,
        Self::Documents,
        Self::Alerts,
        Self::Maintenance,
    ];

    /// The storage key for this collection.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Drivers => "drivers",
            Self::Vehicles => "vehicles",
            Self::Tires => "tires",
            Self::Fuelings => "fuelings",
            Self::Freights => "freights",
            Self::Documents => "documents",
            Self::Alerts => "alerts",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| Error::UnknownCollection(s.to_string()))
    }
}

/// Durable key-value storage for serialized collections.
///
/// Implementations only move strings; they never look inside a payload.
pub trait RecordStore {
    /// Read the payload stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Replace several payloads.
    ///
    /// The default writes entries one after another, so a failure part way
    /// through leaves the earlier entries written. Stores that support
    /// transactions override this to write all or nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn write_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }

    /// Delete the payload stored under `key`.
    ///
    /// Returns `true` if something was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn remove(&self, key: &str) -> Result<bool>;

    /// List the keys that currently hold a payload, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Load the records of a collection for display.
///
/// A missing payload, or one that is not a JSON array, yields an empty
/// vector. Array elements that do not decode as `T` are skipped with a
/// warning; use [`load_for_update`] before writing the collection back.
///
/// # Errors
///
/// Returns an error only if the store itself fails.
pub fn load<T, S>(store: &S, collection: Collection) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    Ok(decode(store, collection)?.0)
}

/// Load the records of a collection that is about to be rewritten.
///
/// Same as [`load`], except that a payload with undecodable elements is an
/// error: saving the decoded subset would silently drop the rest.
///
/// # Errors
///
/// Returns [`Error::UndecodableRecords`] if any element fails to decode, or
/// an error if the store fails.
pub fn load_for_update<T, S>(store: &S, collection: Collection) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    let (records, rejected) = decode(store, collection)?;
    if rejected > 0 {
        return Err(Error::UndecodableRecords {
            collection: collection.key().to_string(),
            rejected,
        });
    }
    Ok(records)
}

/// Decode a collection element by element.
///
/// Returns the decoded records and the number of rejected elements.
fn decode<T, S>(store: &S, collection: Collection) -> Result<(Vec<T>, usize)>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    let Some(raw) = store.read(collection.key())? else {
        return Ok((Vec::new(), 0));
    };

    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(values) => values,
        Err(err) => {
            warn!("Malformed {} collection treated as empty: {}", collection, err);
            return Ok((Vec::new(), 0));
        }
    };

    let mut records = Vec::with_capacity(values.len());
    let mut rejected = 0;
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("Skipping {} record {}: {}", collection, index, err);
                rejected += 1;
            }
        }
    }

    debug!("Loaded {} records from {}", records.len(), collection);
    Ok((records, rejected))
}

/// Replace the records of a collection.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub fn save<T, S>(store: &S, collection: Collection, records: &[T]) -> Result<()>
where
    T: Serialize,
    S: RecordStore + ?Sized,
{
    let payload = serde_json::to_string(records)?;
    store.write(collection.key(), &payload)?;
    debug!("Saved {} records to {}", records.len(), collection);
    Ok(())
}

/// Several collections to be written together.
///
/// Entries are committed in insertion order through
/// [`RecordStore::write_all`].
#[derive(Debug, Default)]
pub struct WriteBatch {
    entries: Vec<(Collection, String)>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection to the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the records fail to serialize.
    pub fn put<T: Serialize>(mut self, collection: Collection, records: &[T]) -> Result<Self> {
        self.entries
            .push((collection, serde_json::to_string(records)?));
        Ok(self)
    }

    /// Number of collections in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every collection in the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn commit<S: RecordStore + ?Sized>(self, store: &S) -> Result<()> {
        let entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(collection, payload)| (collection.key(), payload.as_str()))
            .collect();
        store.write_all(&entries)?;
        debug!("Committed batch of {} collections", entries.len());
        Ok(())
    }
}

/// Statistics about a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored collections.
    pub collections: i64,
    /// Total size of all payloads in bytes.
    pub payload_bytes: i64,
    /// Time of the most recent write.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes (0 for in-memory stores).
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordId, Vehicle};

    fn vehicle(id: &str, plate: &str) -> Vehicle {
        serde_json::from_value(serde_json::json!({ "id": id, "plate": plate })).unwrap()
    }

    #[test]
    fn test_collection_keys_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.key().parse::<Collection>().unwrap(), collection);
        }
    }

    #[test]
    fn test_unknown_collection() {
        let err = "garages".parse::<Collection>().unwrap_err();
        assert!(matches!(err, Error::UnknownCollection(_)));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = MemoryStore::new();
        let vehicles: Vec<Vehicle> = load(&store, Collection::Vehicles).unwrap();
        assert!(vehicles.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let store = MemoryStore::new();
        for payload in ["not json", "", r#"{"id":"v1"}"#, "42", r#"[{"plate":1}]"#] {
            store.write("vehicles", payload).unwrap();
            let vehicles: Vec<Vehicle> = load(&store, Collection::Vehicles).unwrap();
            assert!(vehicles.is_empty(), "payload {payload:?} should load empty");
        }
    }

    #[test]
    fn test_load_skips_undecodable_elements() {
        let store = MemoryStore::new();
        store
            .write(
                "vehicles",
                r#"[{"id":"v1","plate":"ABC1"},{"id":"v2","plate":7},{"id":"v3","plate":"GHI3"}]"#,
            )
            .unwrap();

        let vehicles: Vec<Vehicle> = load(&store, Collection::Vehicles).unwrap();
        let plates: Vec<&str> = vehicles.iter().map(|v| v.plate.as_str()).collect();
        assert_eq!(plates, vec!["ABC1", "GHI3"]);
    }

    #[test]
    fn test_load_for_update_refuses_partial_collection() {
        let store = MemoryStore::new();
        store
            .write("vehicles", r#"[{"id":"v1","plate":"ABC1"},{"id":"v2"}]"#)
            .unwrap();

        let err = load_for_update::<Vehicle, _>(&store, Collection::Vehicles).unwrap_err();
        assert!(matches!(
            err,
            Error::UndecodableRecords { ref collection, rejected: 1 } if collection == "vehicles"
        ));
    }

    #[test]
    fn test_load_for_update_accepts_non_array_as_empty() {
        let store = MemoryStore::new();
        store.write("vehicles", "not json").unwrap();
        let vehicles: Vec<Vehicle> = load_for_update(&store, Collection::Vehicles).unwrap();
        assert!(vehicles.is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let store = MemoryStore::new();
        let records = vec![vehicle("v2", "BBB2"), vehicle("v1", "AAA1")];
        save(&store, Collection::Vehicles, &records).unwrap();

        let loaded: Vec<Vehicle> = load(&store, Collection::Vehicles).unwrap();
        let ids: Vec<&RecordId> = loaded.iter().map(|v| &v.id).collect();
        assert_eq!(ids, vec![&RecordId::new("v2"), &RecordId::new("v1")]);
    }

    #[test]
    fn test_write_batch_commits_every_collection() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .put(Collection::Vehicles, &[vehicle("v1", "AAA1")])
            .unwrap()
            .put::<Vehicle>(Collection::Drivers, &[])
            .unwrap();
        assert_eq!(batch.len(), 2);
        batch.commit(&store).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["drivers", "vehicles"]);
        assert_eq!(store.read("drivers").unwrap().as_deref(), Some("[]"));
    }
}
