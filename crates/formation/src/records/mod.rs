//! Company, draft and submission records.
//!
//! Records are open JSON objects. The service stamps `id` and timestamps on
//! creation, merges request bodies over stored records on update, and the
//! router exposes the three collections over HTTP.

pub mod body;
pub mod clock;
pub mod domain;
mod form;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use body::RecordBody;
pub use clock::{Clock, MonotonicClock, Stamp, SystemClock};
pub use domain::{CollectionKind, Fields, Record, RecordId};
pub use memory::InMemoryRecordRepository;
pub use repository::{RecordRepository, RepositoryError};
pub use router::record_router;
pub use service::{RecordService, RecordServiceError};
