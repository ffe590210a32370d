use tracing::debug;

use crate::errors::ServiceError;
use crate::record::Record;
use crate::storage::map_store::MapStore;

/// Records keyed by id. Entries are never removed.
///
/// `put`/`get`/`contains` are the raw primitives; handlers go through
/// [`RecordStore::insert_new`] and [`RecordStore::replace`], which perform
/// their existence check and write under one write guard.
#[derive(Clone, Default)]
pub struct RecordStore {
    map: MapStore<i64, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite unconditionally.
    pub async fn put(&self, id: i64, record: Record) {
        self.map.insert(id, record).await;
    }

    pub async fn get(&self, id: i64) -> Option<Record> {
        self.map.get(&id).await
    }

    pub async fn contains(&self, id: i64) -> bool {
        self.map.contains(&id).await
    }

    pub async fn len(&self) -> usize {
        self.map.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.map.is_empty().await
    }

    /// Store `record` under its own id unless that id is taken.
    pub async fn insert_new(&self, record: Record) -> Result<Record, ServiceError> {
        self.map
            .update_map(|map| {
                if map.contains_key(&record.id) {
                    return Err(ServiceError::Conflict(record.id));
                }
                map.insert(record.id, record.clone());
                Ok(record)
            })
            .await
            .inspect(|r| debug!(id = r.id, "record inserted"))
    }

    /// Replace the record at `id` wholesale. The stored id is always `id`,
    /// whatever the incoming record carries. Never creates.
    pub async fn replace(&self, id: i64, mut record: Record) -> Result<Record, ServiceError> {
        record.id = id;
        self.map
            .update_map(|map| {
                let slot = map.get_mut(&id).ok_or(ServiceError::NotFound(id))?;
                *slot = record.clone();
                Ok(record)
            })
            .await
            .inspect(|r| debug!(id = r.id, "record replaced"))
    }
}
