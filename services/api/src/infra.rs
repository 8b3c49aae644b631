use formation::records::{InMemoryRecordRepository, RecordService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type RecordStore = RecordService<InMemoryRecordRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fresh, empty store. Every process start begins with no records.
pub(crate) fn in_memory_store() -> Arc<RecordStore> {
    let repository = Arc::new(InMemoryRecordRepository::default());
    Arc::new(RecordService::new(repository))
}
