use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{CollectionKind, Record, RecordId};
use super::repository::{RecordRepository, RepositoryError};

/// Process-memory store: one insertion-ordered `Vec` per collection, each
/// behind its own mutex. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordRepository {
    companies: Arc<Mutex<Vec<Record>>>,
    drafts: Arc<Mutex<Vec<Record>>>,
    submissions: Arc<Mutex<Vec<Record>>>,
}

impl InMemoryRecordRepository {
    fn lock(&self, kind: CollectionKind) -> Result<MutexGuard<'_, Vec<Record>>, RepositoryError> {
        let collection = match kind {
            CollectionKind::Companies => &self.companies,
            CollectionKind::Drafts => &self.drafts,
            CollectionKind::Submissions => &self.submissions,
        };
        collection
            .lock()
            .map_err(|_| RepositoryError::Poisoned(kind))
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn list(&self, kind: CollectionKind) -> Result<Vec<Record>, RepositoryError> {
        Ok(self.lock(kind)?.clone())
    }

    fn append(&self, kind: CollectionKind, record: Record) -> Result<Record, RepositoryError> {
        let mut guard = self.lock(kind)?;
        guard.push(record.clone());
        Ok(record)
    }

    fn find(&self, kind: CollectionKind, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        let guard = self.lock(kind)?;
        Ok(guard.iter().find(|record| record.has_id(id)).cloned())
    }

    fn modify(
        &self,
        kind: CollectionKind,
        id: RecordId,
        change: &mut dyn FnMut(&mut Record),
    ) -> Result<Option<Record>, RepositoryError> {
        let mut guard = self.lock(kind)?;
        Ok(guard.iter_mut().find(|record| record.has_id(id)).map(|record| {
            change(record);
            record.clone()
        }))
    }

    fn remove(&self, kind: CollectionKind, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        let mut guard = self.lock(kind)?;
        Ok(guard
            .iter()
            .position(|record| record.has_id(id))
            .map(|index| guard.remove(index)))
    }
}
