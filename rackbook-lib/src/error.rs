use thiserror::Error;

use crate::{
    config::ConfigError,
    repository::{RecordId, storage::PersistenceError},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No server with id '{0}'")]
    NotFound(RecordId),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Stored snapshot could not be parsed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("Snapshot model version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u16, supported: u16 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Filesystem error: {0}")]
    Fs(#[from] std::io::Error),
}
