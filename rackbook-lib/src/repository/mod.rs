use std::collections::HashSet;

use serde::de::Error as _;
use tracing::{debug, warn};

use crate::{
    Error, Result,
    config::{CoreConfig, DEFAULT_STORAGE_KEY},
    repository::{records::timestamp_now, storage::FileStorage},
};

mod records;

pub(crate) mod seed;

pub mod storage;

pub use records::{RecordId, ServerFormData, ServerRecord, Status, ValidationError};
pub use storage::{MemoryStorage, Storage};

/// Version of the snapshot layout written by this library.
pub const MODEL_VERSION: u16 = 1;

/// Where the records currently held by a [`RecordStore`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Nothing has been loaded yet.
    Unloaded,
    /// Read back from a persisted snapshot.
    Snapshot,
    /// No snapshot existed, so the seed set was persisted.
    Seed,
    /// The snapshot could not be parsed. It was copied to `backup_key` and replaced by the
    /// seed set.
    Recovered { backup_key: String, reason: String },
}

/// Owner of the authoritative list of [`ServerRecord`]s.
///
/// Every mutation writes the whole list through to its [`Storage`] before returning, so the
/// in-memory records and the persisted snapshot agree after each successful call. If the
/// write fails, the in-memory list is left as it was.
#[derive(Debug)]
pub struct RecordStore<S: Storage> {
    storage: S,
    key: String,
    records: Vec<ServerRecord>,
    next_uid: u64,
    origin: Origin,
}

impl RecordStore<FileStorage> {
    /// Open and load the file backed store described by `cfg`.
    pub fn open(cfg: &CoreConfig) -> Result<Self> {
        let storage = FileStorage::new(cfg.storage_dir()?)?;
        let mut store = Self::with_key(storage, &cfg.storage_key);

        store.load()?;

        Ok(store)
    }
}

impl<S: Storage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a store that persists its snapshot under `key`. No I/O happens until
    /// [`Self::load`] or the first mutation.
    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
            records: Vec::new(),
            next_uid: 1,
            origin: Origin::Unloaded,
        }
    }

    /// Read the persisted snapshot, replacing whatever is held in memory.
    ///
    /// Without a snapshot the seed set is persisted and returned. An unparsable snapshot is
    /// backed up and replaced by the seed set, while a snapshot written by a newer model
    /// version is refused and left untouched.
    pub fn load(&mut self) -> Result<&[ServerRecord]> {
        let (records, origin) = match self.storage.read(&self.key)? {
            None => {
                let seed = seed::records(timestamp_now());
                self.persist(&seed)?;

                debug!("Initialized '{}' with {} seed records", self.key, seed.len());

                (seed, Origin::Seed)
            }
            Some(raw) => match self.decode(&raw) {
                Ok(records) => {
                    debug!("Loaded {} records from '{}'", records.len(), self.key);

                    (records, Origin::Snapshot)
                }
                Err(Error::Deserialization(err)) => {
                    let backup_key = self.backup(&raw)?;
                    let seed = seed::records(timestamp_now());
                    self.persist(&seed)?;

                    warn!(
                        "Snapshot '{}' was unreadable ({err}), moved it to '{backup_key}' and restored the seed records",
                        self.key
                    );

                    let reason = err.to_string();
                    (seed, Origin::Recovered { backup_key, reason })
                }
                Err(err) => return Err(err),
            },
        };

        self.next_uid = next_uid(&records);
        self.records = records;
        self.origin = origin;

        Ok(&self.records)
    }

    /// Append a new record built from `data`.
    pub fn create(&mut self, data: ServerFormData) -> Result<ServerRecord> {
        self.ensure_loaded()?;

        let id = self.allocate_id();
        let record = ServerRecord::new(id, data, timestamp_now());

        let mut records = self.records.clone();
        records.push(record.clone());
        self.commit(records)?;

        debug!("Created server {}: {}", record.id(), record.name());

        Ok(record)
    }

    /// Replace every field but the id of an existing record, keeping its position.
    pub fn update(&mut self, id: &RecordId, data: ServerFormData) -> Result<ServerRecord> {
        self.ensure_loaded()?;

        let mut records = self.records.clone();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        record.apply(data, timestamp_now());
        let updated = record.clone();

        self.commit(records)?;

        debug!("Updated server {}: {}", updated.id(), updated.name());

        Ok(updated)
    }

    /// Remove a record, returning it if it was present. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &RecordId) -> Result<Option<ServerRecord>> {
        self.ensure_loaded()?;

        let Some(removed) = self.get(id).cloned() else {
            debug!("Nothing to delete for server {id}");
            return Ok(None);
        };

        let records = self
            .records
            .iter()
            .filter(|r| r.id() != id)
            .cloned()
            .collect();
        self.commit(records)?;

        debug!("Deleted server {}: {}", removed.id(), removed.name());

        Ok(Some(removed))
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ServerRecord] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&ServerRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.origin == Origin::Unloaded {
            self.load()?;
        }

        Ok(())
    }

    fn allocate_id(&mut self) -> RecordId {
        loop {
            let candidate = RecordId::from(self.next_uid.to_string());
            // Past the largest representable id, scan again from the bottom for a free one
            self.next_uid = self.next_uid.checked_add(1).unwrap_or(1);

            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn commit(&mut self, records: Vec<ServerRecord>) -> Result<()> {
        self.persist(&records)?;
        self.records = records;

        Ok(())
    }

    fn persist(&self, records: &[ServerRecord]) -> Result<()> {
        let snapshot = serde_json::to_string(records).map_err(Error::Serialization)?;

        // The version goes first so a failed snapshot write never leaves a newer marker
        // next to older data
        self.storage
            .write(&self.version_key(), &MODEL_VERSION.to_string())?;
        self.storage.write(&self.key, &snapshot)?;

        Ok(())
    }

    fn decode(&self, raw: &str) -> Result<Vec<ServerRecord>> {
        let version = self.stored_version()?;

        if version > MODEL_VERSION {
            return Err(Error::UnsupportedVersion {
                found: version,
                supported: MODEL_VERSION,
            });
        }

        let records: Vec<ServerRecord> =
            serde_json::from_str(raw).map_err(Error::Deserialization)?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = records.iter().find(|r| !seen.insert(r.id())) {
            return Err(Error::Deserialization(serde_json::Error::custom(format!(
                "duplicate id '{}'",
                duplicate.id()
            ))));
        }

        Ok(records)
    }

    /// The model version the snapshot was written with.
    ///
    /// Snapshots written before versioning have the current layout. A marker that can't be
    /// read says nothing about the snapshot itself, so it is treated the same way and
    /// rewritten.
    fn stored_version(&self) -> Result<u16> {
        let version_key = self.version_key();

        let Some(raw) = self.storage.read(&version_key)? else {
            return Ok(MODEL_VERSION);
        };

        match serde_json::from_str(&raw) {
            Ok(version) => Ok(version),
            Err(err) => {
                warn!("Replacing unreadable version marker '{version_key}' ({err})");
                self.storage
                    .write(&version_key, &MODEL_VERSION.to_string())?;

                Ok(MODEL_VERSION)
            }
        }
    }

    /// Copy an unreadable snapshot aside, returning the key it was written to. Earlier
    /// backups are never overwritten.
    fn backup(&self, raw: &str) -> Result<String> {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let base = format!("{}.corrupt-{timestamp}", self.key);

        let mut backup_key = base.clone();
        let mut attempt: u32 = 1;
        while self.storage.read(&backup_key)?.is_some() {
            backup_key = format!("{base}-{attempt}");
            attempt = attempt.saturating_add(1);
        }

        self.storage.write(&backup_key, raw)?;

        Ok(backup_key)
    }

    fn version_key(&self) -> String {
        format!("{}.version", self.key)
    }
}

#[cfg(test)]
impl RecordStore<MemoryStorage> {
    /// Return a store backed by fresh in-memory storage.
    pub(crate) fn mock() -> Self {
        Self::new(MemoryStorage::new())
    }
}

/// The first counter value past every numeric id in `records`.
fn next_uid(records: &[ServerRecord]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.id().as_str().parse::<u64>().ok())
        .max()
        .and_then(|max| max.checked_add(1))
        .unwrap_or(1)
}
