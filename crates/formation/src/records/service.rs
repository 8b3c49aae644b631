use std::sync::Arc;

use tracing::debug;

use super::clock::{Clock, MonotonicClock, Stamp, SystemClock};
use super::domain::{CollectionKind, Fields, Record, RecordId};
use super::repository::{RecordRepository, RepositoryError};

/// Record lifecycle over a repository: stamping on create, merge on update.
pub struct RecordService<R, C = SystemClock> {
    repository: Arc<R>,
    clock: Arc<MonotonicClock<C>>,
}

impl<R> RecordService<R, SystemClock>
where
    R: RecordRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(MonotonicClock::system()))
    }
}

impl<R, C> RecordService<R, C>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(repository: Arc<R>, clock: Arc<MonotonicClock<C>>) -> Self {
        Self { repository, clock }
    }

    /// Every record of `kind`, in insertion order.
    pub fn list(&self, kind: CollectionKind) -> Result<Vec<Record>, RecordServiceError> {
        Ok(self.repository.list(kind)?)
    }

    /// Stamp system fields, spread `body` over them and append the result.
    ///
    /// The body is applied last, so callers may override any stamped field.
    pub fn create(
        &self,
        kind: CollectionKind,
        body: Fields,
    ) -> Result<Record, RecordServiceError> {
        let stamp = self.clock.tick();
        let mut record = stamped_record(kind, &stamp);
        record.merge(body);

        let stored = self.repository.append(kind, record)?;
        debug!(collection = kind.key(), id = stamp.millis(), "record created");
        Ok(stored)
    }

    /// First record of `kind` whose id matches the leniently parsed `raw_id`.
    pub fn get(&self, kind: CollectionKind, raw_id: &str) -> Result<Record, RecordServiceError> {
        let id = parse_id(kind, raw_id)?;
        self.repository
            .find(kind, id)?
            .ok_or(RecordServiceError::NotFound(kind))
    }

    /// Shallow-merge `body` into the matching record, then reset `updatedAt`.
    pub fn update(
        &self,
        kind: CollectionKind,
        raw_id: &str,
        body: Fields,
    ) -> Result<Record, RecordServiceError> {
        ensure_mutable(kind)?;
        let id = parse_id(kind, raw_id)?;

        // Ticked under the collection lock: `updatedAt` follows apply order.
        let clock = &self.clock;
        let mut body = Some(body);
        let mut apply = |record: &mut Record| {
            let stamp = clock.tick();
            if let Some(body) = body.take() {
                record.merge(body);
            }
            record.set("updatedAt", stamp.iso());
        };

        self.repository
            .modify(kind, id, &mut apply)?
            .ok_or(RecordServiceError::NotFound(kind))
    }

    /// Remove the matching record, returning it.
    pub fn delete(&self, kind: CollectionKind, raw_id: &str) -> Result<Record, RecordServiceError> {
        ensure_mutable(kind)?;
        let id = parse_id(kind, raw_id)?;
        let removed = self
            .repository
            .remove(kind, id)?
            .ok_or(RecordServiceError::NotFound(kind))?;
        debug!(collection = kind.key(), id = ?id, "record deleted");
        Ok(removed)
    }
}

fn stamped_record(kind: CollectionKind, stamp: &Stamp) -> Record {
    let at = stamp.iso();
    let mut record = Record::default();
    record.set("id", stamp.millis());
    if let Some(status) = kind.initial_status() {
        record.set("status", status);
    }
    match kind {
        CollectionKind::Companies => {
            record.set("submittedAt", at.clone());
            record.set("createdAt", at.clone());
            record.set("updatedAt", at);
        }
        CollectionKind::Drafts => {
            record.set("createdAt", at.clone());
            record.set("updatedAt", at);
        }
        CollectionKind::Submissions => {
            record.set("submittedAt", at);
        }
    }
    record
}

fn parse_id(kind: CollectionKind, raw_id: &str) -> Result<RecordId, RecordServiceError> {
    RecordId::parse_lenient(raw_id).ok_or(RecordServiceError::NotFound(kind))
}

fn ensure_mutable(kind: CollectionKind) -> Result<(), RecordServiceError> {
    if kind.is_mutable() {
        Ok(())
    } else {
        Err(RecordServiceError::Immutable(kind))
    }
}

/// Error raised by the record service.
#[derive(Debug, thiserror::Error)]
pub enum RecordServiceError {
    #[error("{} not found", .0.label())]
    NotFound(CollectionKind),
    #[error("{} records cannot be modified", .0.label())]
    Immutable(CollectionKind),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
