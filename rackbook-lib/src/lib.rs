//! Core library for rackbook, a small inventory of physical and virtual servers.
//!
//! The [`RecordStore`] owns the canonical list of [`ServerRecord`]s and keeps it durable
//! through a pluggable [`Storage`] backend. The [`query`] module derives filtered views of
//! that list for display.

pub mod config;
pub mod error;
pub mod fs;
pub mod query;
pub mod repository;

pub use error::{Error, Result};
pub use query::{QueryCriteria, StatusCounts, StatusFilter};
pub use repository::{
    Origin, RecordId, RecordStore, ServerFormData, ServerRecord, Status, ValidationError,
    storage::{FileStorage, MemoryStorage, PersistenceError, Storage},
};
