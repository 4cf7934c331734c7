//! # In-Memory Data Service
//!
//! A complete [`DataService`] over an ordered map, used by the demo binary and the
//! full-system tests.
//!
//! # Implementation Details
//!
//! The service keeps a `BTreeMap` of records keyed by id and an `i64` counter for id
//! generation, starting at 1. Records seeded with an id `<= 0` are given the next id.
//!
//! * **Create**: stamps the record with the next id, stores it, and reports the id in
//!   `new_id`.
//! * **Update / Delete**: fail with a `Danger` result when the id is not stored.
//! * **Filtered list**: evaluates every supplied filter by column equality. An empty
//!   filter list returns everything unless filters are required.

use crate::controller::FilterList;
use crate::framework::entity::DbRecord;
use crate::framework::error::DataError;
use crate::framework::service::{DataService, MessageKind, TaskResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

struct MemoryStore<R> {
    records: BTreeMap<i64, R>,
    next_id: i64,
}

pub struct InMemoryDataService<R> {
    store: Mutex<MemoryStore<R>>,
}

impl<R: DbRecord> Default for InMemoryDataService<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: DbRecord> InMemoryDataService<R> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(MemoryStore {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let service = Self::new();
        {
            let mut store = service.lock();
            for record in records {
                let record = if record.id() > 0 {
                    record
                } else {
                    let id = store.next_id;
                    record.with_id(id)
                };
                store.next_id = store.next_id.max(record.id() + 1);
                store.records.insert(record.id(), record);
            }
        }
        service
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore<R>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }
}

#[async_trait]
impl<R: DbRecord> DataService<R> for InMemoryDataService<R> {
    async fn get_record(&self, id: i64) -> Result<Option<R>, DataError> {
        let record = self.lock().records.get(&id).cloned();
        debug!(record_type = R::type_name(), id, found = record.is_some(), "Get");
        Ok(record)
    }

    async fn get_record_by_guid(&self, guid: Uuid) -> Result<Option<R>, DataError> {
        if guid.is_nil() {
            return Ok(None);
        }
        Ok(self
            .lock()
            .records
            .values()
            .find(|r| r.guid() == guid)
            .cloned())
    }

    async fn get_record_list(&self) -> Result<Vec<R>, DataError> {
        Ok(self.lock().records.values().cloned().collect())
    }

    async fn get_filtered_record_list(&self, filters: &FilterList) -> Result<Vec<R>, DataError> {
        if !filters.should_load() {
            return Ok(Vec::new());
        }
        let columns = R::columns();
        let mut accessors = Vec::with_capacity(filters.len());
        for filter in filters {
            let accessor = columns.accessor(&filter.field_name).ok_or_else(|| {
                DataError::Rejected(format!("no column named {}", filter.field_name))
            })?;
            accessors.push((accessor, &filter.value));
        }
        let records: Vec<R> = self
            .lock()
            .records
            .values()
            .filter(|r| accessors.iter().all(|(get, value)| get(r).matches(value)))
            .cloned()
            .collect();
        debug!(
            record_type = R::type_name(),
            filters = filters.len(),
            found = records.len(),
            "Filtered list"
        );
        Ok(records)
    }

    async fn get_record_count(&self) -> Result<usize, DataError> {
        Ok(self.lock().records.len())
    }

    async fn create_record(&self, record: &R) -> Result<TaskResult, DataError> {
        let info = R::record_info();
        let mut store = self.lock();
        let id = store.next_id;
        store.next_id += 1;
        store.records.insert(id, record.clone().with_id(id));
        info!(record_type = R::type_name(), id, size = store.records.len(), "Created");
        Ok(TaskResult::success(format!("{} saved", info.record_description)).with_new_id(id))
    }

    async fn update_record(&self, record: &R) -> Result<TaskResult, DataError> {
        let info = R::record_info();
        let id = record.id();
        let mut store = self.lock();
        match store.records.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                info!(record_type = R::type_name(), id, "Updated");
                Ok(TaskResult::success(format!("{} saved", info.record_description)).with_new_id(id))
            }
            None => {
                warn!(record_type = R::type_name(), id, "Not found");
                Ok(TaskResult::failure(
                    format!("{} {} not found", info.record_description, id),
                    MessageKind::Danger,
                ))
            }
        }
    }

    async fn delete_record(&self, record: &R) -> Result<TaskResult, DataError> {
        let info = R::record_info();
        let id = record.id();
        let mut store = self.lock();
        match store.records.remove(&id) {
            Some(_) => {
                info!(record_type = R::type_name(), id, size = store.records.len(), "Deleted");
                Ok(TaskResult::success(format!("{} deleted", info.record_description)))
            }
            None => {
                warn!(record_type = R::type_name(), id, "Not found");
                Ok(TaskResult::failure(
                    format!("{} {} not found", info.record_description, id),
                    MessageKind::Danger,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{sample_stations, WeatherStation};

    #[tokio::test]
    async fn test_seeded_ids_and_create() {
        let service = InMemoryDataService::with_records(sample_stations());
        assert_eq!(service.len(), 2);

        let result = service
            .create_record(&WeatherStation::new(0, "Oban", 56.4, -5.5, 4.0))
            .await
            .unwrap();
        assert!(result.ok);
        assert_eq!(result.new_id, 3);
        assert_eq!(result.message, "Weather Station saved");

        let stored = service.get_record(3).await.unwrap().unwrap();
        assert_eq!(stored.id, 3);
        assert_eq!(stored.name, "Oban");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_report_failure() {
        let service = InMemoryDataService::<WeatherStation>::new();
        let ghost = WeatherStation::new(9, "Ghost", 0.0, 0.0, 0.0);

        let update = service.update_record(&ghost).await.unwrap();
        assert!(!update.ok);
        assert_eq!(update.kind, MessageKind::Danger);

        let delete = service.delete_record(&ghost).await.unwrap();
        assert!(!delete.ok);
    }

    #[tokio::test]
    async fn test_filtered_list_applies_every_filter() {
        let service = InMemoryDataService::with_records(sample_stations());
        let mut filters = FilterList::new(true);
        assert!(service
            .get_filtered_record_list(&filters)
            .await
            .unwrap()
            .is_empty());

        filters.set_filter("Name", "Tiree", true);
        let found = service.get_filtered_record_list(&filters).await.unwrap();
        assert_eq!(found.len(), 1);

        filters.set_filter("Elevation", 120i64, true);
        let found = service.get_filtered_record_list(&filters).await.unwrap();
        assert!(found.is_empty());

        filters.set_filter("Bogus", 1i64, true);
        assert!(service.get_filtered_record_list(&filters).await.is_err());
    }

    #[tokio::test]
    async fn test_default_lookup_and_distinct() {
        let service = InMemoryDataService::with_records(sample_stations());
        let lookup = service.get_lookup_list().await.unwrap();
        assert_eq!(lookup.get(&1).map(String::as_str), Some("Tiree"));

        let names = service.get_distinct_values("name").await.unwrap();
        assert_eq!(names, vec!["Ross-on-Wye".to_string(), "Tiree".to_string()]);
    }
}
