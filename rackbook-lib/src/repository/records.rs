use chrono::{DateTime, SubsecRound, Utc};
use clap::ValueEnum;
use derive_more::{Display, From};
use getset::Getters;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Opaque identity of a [`ServerRecord`]. Assigned once at creation and never reused for a
/// different live record.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Online,
    #[default]
    Offline,
    Maintenance,
}

/// A single inventory entry describing one physical or virtual server.
///
/// Records can only be created and modified through a
/// [`RecordStore`](crate::repository::RecordStore), which owns the `id` and
/// `last_updated` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
#[getset(get = "pub")]
pub struct ServerRecord {
    id: RecordId,
    name: String,
    location: String,
    ip_address: String,
    operating_system: String,
    cpu: String,
    ram: String,
    storage: String,
    status: Status,
    purpose: String,
    /// Comma separated login names, kept as a single string.
    usernames: String,
    #[serde(with = "iso8601")]
    last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl ServerRecord {
    pub(crate) fn new(id: RecordId, data: ServerFormData, now: DateTime<Utc>) -> Self {
        let ServerFormData {
            name,
            location,
            ip_address,
            operating_system,
            cpu,
            ram,
            storage,
            status,
            purpose,
            usernames,
            notes,
        } = data;

        Self {
            id,
            name,
            location,
            ip_address,
            operating_system,
            cpu,
            ram,
            storage,
            status,
            purpose,
            usernames,
            last_updated: now,
            notes,
        }
    }

    /// Replace every editable field with `data`. The id is kept and `last_updated` never
    /// moves backwards, even if the clock does.
    pub(crate) fn apply(&mut self, data: ServerFormData, now: DateTime<Utc>) {
        let ServerFormData {
            name,
            location,
            ip_address,
            operating_system,
            cpu,
            ram,
            storage,
            status,
            purpose,
            usernames,
            notes,
        } = data;

        self.name = name;
        self.location = location;
        self.ip_address = ip_address;
        self.operating_system = operating_system;
        self.cpu = cpu;
        self.ram = ram;
        self.storage = storage;
        self.status = status;
        self.purpose = purpose;
        self.usernames = usernames;
        self.notes = notes;
        self.last_updated = now.max(self.last_updated);
    }

    /// The individual login names in [`Self::usernames`], trimmed and without blanks.
    pub fn usernames_list(&self) -> Vec<&str> {
        self.usernames
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// User supplied values for every editable field of a [`ServerRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFormData {
    pub name: String,
    pub location: String,
    pub ip_address: String,
    pub operating_system: String,
    pub cpu: String,
    pub ram: String,
    pub storage: String,
    pub status: Status,
    pub purpose: String,
    pub usernames: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServerFormData {
    /// Check that every required text field has a value. `usernames` and `notes` are
    /// optional.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("location", &self.location),
            ("IP address", &self.ip_address),
            ("operating system", &self.operating_system),
            ("CPU", &self.cpu),
            ("RAM", &self.ram),
            ("storage", &self.storage),
            ("purpose", &self.purpose),
        ];

        let missing: Vec<_> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

impl From<&ServerRecord> for ServerFormData {
    fn from(record: &ServerRecord) -> Self {
        Self {
            name: record.name.clone(),
            location: record.location.clone(),
            ip_address: record.ip_address.clone(),
            operating_system: record.operating_system.clone(),
            cpu: record.cpu.clone(),
            ram: record.ram.clone(),
            storage: record.storage.clone(),
            status: record.status,
            purpose: record.purpose.clone(),
            usernames: record.usernames.clone(),
            notes: record.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// Current time at the millisecond precision snapshots are stored with.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// ISO-8601 timestamps with a millisecond fraction and a `Z` suffix.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc).trunc_subsecs(3))
            .map_err(de::Error::custom)
    }
}
