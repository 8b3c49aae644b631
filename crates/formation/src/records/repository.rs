use super::domain::{CollectionKind, Record, RecordId};

/// Storage abstraction for the three record collections.
///
/// Implementations keep insertion order per collection and resolve ids by
/// returning the *first* record whose `id` matches, since callers may create
/// records with duplicate ids.
pub trait RecordRepository: Send + Sync {
    fn list(&self, kind: CollectionKind) -> Result<Vec<Record>, RepositoryError>;
    fn append(&self, kind: CollectionKind, record: Record) -> Result<Record, RepositoryError>;
    fn find(&self, kind: CollectionKind, id: RecordId) -> Result<Option<Record>, RepositoryError>;
    /// Apply `change` to the first matching record in place and return the result.
    fn modify(
        &self,
        kind: CollectionKind,
        id: RecordId,
        change: &mut dyn FnMut(&mut Record),
    ) -> Result<Option<Record>, RepositoryError>;
    fn remove(&self, kind: CollectionKind, id: RecordId) -> Result<Option<Record>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{} collection lock poisoned", .0.key())]
    Poisoned(CollectionKind),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
