//! # Record Controller
//!
//! Holds the current record of one type, its editable field values, and the result of the
//! last write.
//!
//! # Architecture Note
//! The controller owns a [`SharedFieldValues`] store that edit projections share by
//! reference. A [`DirtyTracker`] is installed as the store's change callback, so any write
//! through any projection flips the controller's clean flag and raises `OnDirty` or
//! `OnClean` without the controller having to poll.
//!
//! Loading the record that is already current is a no-op unless a refresh is asked for.
//! Saving folds data-service failures into the stored [`TaskResult`] and leaves the
//! current record untouched.

use crate::framework::{
    ControllerEvent, DataService, DbRecord, EventBus, MessageKind, RecordError, RecordInfo,
    TaskResult,
};
use crate::values::SharedFieldValues;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Store callback that mirrors the dirty flag into the controller.
#[derive(Clone)]
struct DirtyTracker {
    clean: Arc<AtomicBool>,
    events: EventBus,
}

impl DirtyTracker {
    fn set(&self, dirty: bool) {
        self.clean.store(!dirty, Ordering::SeqCst);
        self.events.emit(if dirty {
            ControllerEvent::OnDirty
        } else {
            ControllerEvent::OnClean
        });
    }
}

pub struct RecordController<R: DbRecord> {
    service: Arc<dyn DataService<R>>,
    events: EventBus,
    record: R,
    values: SharedFieldValues,
    tracker: DirtyTracker,
    task_result: TaskResult,
}

impl<R: DbRecord> RecordController<R> {
    pub fn new(service: Arc<dyn DataService<R>>, events: EventBus) -> Self {
        let record = R::default();
        let tracker = DirtyTracker {
            clean: Arc::new(AtomicBool::new(true)),
            events: events.clone(),
        };
        let values = SharedFieldValues::new(record.as_properties());
        let callback = tracker.clone();
        values.write(|store| {
            store.set_on_change(Arc::new(move |dirty: bool| callback.set(dirty)));
        });
        Self {
            service,
            events,
            record,
            values,
            tracker,
            task_result: TaskResult::default(),
        }
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    /// The shared edit store. Clones write to the same values.
    pub fn values(&self) -> &SharedFieldValues {
        &self.values
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn task_result(&self) -> &TaskResult {
        &self.task_result
    }

    pub(crate) fn set_task_result(&mut self, result: TaskResult) {
        self.task_result = result;
    }

    pub fn is_clean(&self) -> bool {
        self.tracker.clean.load(Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    /// Forces the dirty flag and raises the matching event.
    pub fn set_dirty(&self, dirty: bool) {
        self.tracker.set(dirty);
    }

    /// True when the current record has been persisted.
    pub fn is_record(&self) -> bool {
        self.record.id() > 0
    }

    pub fn is_new_record(&self) -> bool {
        self.record.is_new()
    }

    pub fn record_guid(&self) -> Uuid {
        self.record.guid()
    }

    pub fn record_info(&self) -> RecordInfo {
        R::record_info()
    }

    fn set_record(&mut self, record: R) {
        self.values.replace(record.as_properties());
        self.record = record;
        self.tracker.clean.store(true, Ordering::SeqCst);
        self.events.emit(ControllerEvent::RecordChanged);
    }

    /// Loads the record with `id`. Returns whether the current record changed.
    ///
    /// An id `<= 0` gives a blank record. A missing record also gives a blank record.
    #[instrument(skip(self), fields(record_type = R::type_name()))]
    pub async fn load(&mut self, id: i64, refresh: bool) -> Result<bool, RecordError> {
        if !refresh && id == self.record.id() {
            debug!("Already current");
            return Ok(false);
        }
        let record = if id > 0 {
            match self.service.get_record(id).await? {
                Some(record) => record,
                None => {
                    warn!("Record not found, using a blank record");
                    R::default()
                }
            }
        } else {
            R::default()
        };
        self.set_record(record);
        Ok(true)
    }

    /// Loads the record with `guid`. A nil guid gives a blank record.
    #[instrument(skip(self), fields(record_type = R::type_name()))]
    pub async fn load_by_guid(&mut self, guid: Uuid, refresh: bool) -> Result<bool, RecordError> {
        if !refresh && !guid.is_nil() && guid == self.record.guid() {
            debug!("Already current");
            return Ok(false);
        }
        let record = if guid.is_nil() {
            R::default()
        } else {
            match self.service.get_record_by_guid(guid).await? {
                Some(record) => record,
                None => {
                    warn!("Record not found, using a blank record");
                    R::default()
                }
            }
        };
        self.set_record(record);
        Ok(true)
    }

    /// Persists `record`, or the edited values when `None`.
    ///
    /// New records are created and adopt the id the store assigns. On failure the
    /// stored [`TaskResult`] explains why and nothing else changes.
    #[instrument(skip(self, record), fields(record_type = R::type_name()))]
    pub async fn save(&mut self, record: Option<R>) -> Result<bool, RecordError> {
        let record = record.unwrap_or_else(|| self.values.read(R::from_properties));
        let is_new = record.is_new();
        let outcome = if is_new {
            self.service.create_record(&record).await
        } else {
            self.service.update_record(&record).await
        };
        let result =
            outcome.unwrap_or_else(|e| TaskResult::failure(e.to_string(), MessageKind::Danger));
        self.task_result = result.clone();
        if !result.ok {
            warn!(message = %result.message, kind = ?result.kind, "Save failed");
            return Ok(false);
        }

        let id = if is_new { result.new_id } else { record.id() };
        let saved = match self.service.get_record(id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => record.with_id(id),
            Err(e) => {
                warn!(id, error = %e, "Re-fetch after save failed, keeping saved copy");
                record.with_id(id)
            }
        };
        info!(id, created = is_new, "Saved");
        self.set_record(saved);
        self.events.emit(ControllerEvent::ListChanged);
        Ok(true)
    }

    /// Deletes the current record and resets to a blank one.
    #[instrument(skip(self), fields(record_type = R::type_name(), id = self.record.id()))]
    pub async fn delete(&mut self) -> Result<bool, RecordError> {
        if !self.is_record() {
            self.task_result = TaskResult::failure(
                format!("No {} selected to delete", R::record_info().record_description),
                MessageKind::Warning,
            );
            return Ok(false);
        }
        let result = self
            .service
            .delete_record(&self.record)
            .await
            .unwrap_or_else(|e| TaskResult::failure(e.to_string(), MessageKind::Danger));
        self.task_result = result.clone();
        if !result.ok {
            warn!(message = %result.message, "Delete failed");
            return Ok(false);
        }
        info!("Deleted");
        self.reset();
        self.events.emit(ControllerEvent::ListChanged);
        Ok(true)
    }

    /// Abandons the current edit for a blank record and raises `OnClean`.
    pub fn reset(&mut self) {
        self.set_record(R::default());
        self.tracker.set(false);
    }

    /// Starts editing a new record, from `template` or a blank one.
    pub fn set_to_new_record(&mut self, template: Option<R>) {
        let record = template.map(|r| r.with_id(0)).unwrap_or_default();
        self.set_record(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{DataError, MockDataService, NO_RECORD_ID};
    use crate::weather::{fields, WeatherStation};

    fn setup() -> (Arc<MockDataService<WeatherStation>>, RecordController<WeatherStation>) {
        let mock = Arc::new(MockDataService::new());
        let controller = RecordController::new(mock.clone(), EventBus::default());
        (mock, controller)
    }

    fn tiree() -> WeatherStation {
        WeatherStation::new(5, "Tiree Airport", 56.5, -6.9, 9.0)
    }

    #[tokio::test]
    async fn test_loading_same_id_twice_fetches_once() {
        let (mock, mut controller) = setup();
        mock.expect_get_record(5).return_ok(Some(tiree()));

        assert!(controller.load(5, false).await.unwrap());
        assert!(!controller.load(5, false).await.unwrap());
        assert_eq!(controller.record().name, "Tiree Airport");
        mock.verify();
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let (mock, mut controller) = setup();
        mock.expect_get_record(5).return_ok(Some(tiree()));
        mock.expect_get_record(5).return_ok(Some(tiree()));

        controller.load(5, false).await.unwrap();
        assert!(controller.load(5, true).await.unwrap());
        mock.verify();
    }

    #[tokio::test]
    async fn test_missing_record_gives_blank() {
        let (mock, mut controller) = setup();
        mock.expect_get_record(99).return_ok(None);

        controller.load(99, false).await.unwrap();
        assert_eq!(controller.record().id, NO_RECORD_ID);
        assert!(!controller.is_record());
        mock.verify();
    }

    #[tokio::test]
    async fn test_nil_guid_gives_blank_without_fetch() {
        let (mock, mut controller) = setup();
        assert!(controller.load_by_guid(Uuid::nil(), false).await.unwrap());
        assert_eq!(controller.record().name, "No Name");
        mock.verify();
    }

    #[tokio::test]
    async fn test_edits_drive_dirty_flag_and_events() {
        let (mock, mut controller) = setup();
        mock.expect_get_record(5).return_ok(Some(tiree()));
        controller.load(5, false).await.unwrap();
        let mut rx = controller.events().subscribe();

        controller.values().set(fields::NAME, "Tiree Airfield");
        assert!(controller.is_dirty());
        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::OnDirty);

        controller.values().set(fields::NAME, "Tiree Airport");
        assert!(controller.is_clean());
        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::OnClean);
    }

    #[tokio::test]
    async fn test_save_new_record_adopts_store_id() {
        let (mock, mut controller) = setup();
        controller.set_to_new_record(None);
        controller.values().set(fields::NAME, "Ross-on-Wye");

        mock.expect_create()
            .return_ok(TaskResult::success("Weather Station saved").with_new_id(42));
        let stored = WeatherStation::new(42, "Ross-on-Wye", 1000.0, 1000.0, 1000.0);
        mock.expect_get_record(42).return_ok(Some(stored));

        let mut rx = controller.events().subscribe();
        assert!(controller.save(None).await.unwrap());
        assert_eq!(controller.record().id, 42);
        assert!(controller.is_clean());
        assert!(controller.task_result().ok);
        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::RecordChanged);
        assert_eq!(rx.recv().await.unwrap(), ControllerEvent::ListChanged);

        let written = mock.written_records();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].name, "Ross-on-Wye");
        mock.verify();
    }

    #[tokio::test]
    async fn test_refetch_error_keeps_saved_copy() {
        let (mock, mut controller) = setup();
        controller.set_to_new_record(None);
        controller.values().set(fields::NAME, "Lerwick Observatory");

        mock.expect_create()
            .return_ok(TaskResult::success("Weather Station saved").with_new_id(7));
        mock.expect_get_record(7)
            .return_err(DataError::Unavailable("offline".into()));

        assert!(controller.save(None).await.unwrap());
        assert_eq!(controller.record().id, 7);
        assert_eq!(controller.record().name, "Lerwick Observatory");
        assert!(controller.is_clean());
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_save_changes_nothing() {
        let (mock, mut controller) = setup();
        mock.expect_get_record(5).return_ok(Some(tiree()));
        controller.load(5, false).await.unwrap();
        controller.values().set(fields::NAME, "Renamed Station");

        mock.expect_update()
            .return_ok(TaskResult::failure("Record locked", MessageKind::Danger));
        assert!(!controller.save(None).await.unwrap());

        assert_eq!(controller.record().name, "Tiree Airport");
        assert!(controller.is_dirty());
        assert_eq!(controller.task_result().message, "Record locked");
        assert_eq!(controller.values().get_edited::<String>(fields::NAME), "Renamed Station");
        mock.verify();
    }

    #[tokio::test]
    async fn test_service_error_becomes_task_result() {
        let (mock, mut controller) = setup();
        mock.expect_create()
            .return_err(DataError::Unavailable("offline".into()));
        assert!(!controller.save(Some(WeatherStation::default())).await.unwrap());
        assert_eq!(controller.task_result().kind, MessageKind::Danger);
        assert!(controller.task_result().message.contains("offline"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_delete_requires_persisted_record() {
        let (mock, mut controller) = setup();
        assert!(!controller.delete().await.unwrap());
        assert_eq!(controller.task_result().kind, MessageKind::Warning);

        mock.expect_get_record(5).return_ok(Some(tiree()));
        mock.expect_delete()
            .return_ok(TaskResult::success("Weather Station deleted"));
        controller.load(5, false).await.unwrap();
        assert!(controller.delete().await.unwrap());
        assert!(!controller.is_record());
        mock.verify();
    }

    #[tokio::test]
    async fn test_new_record_from_template() {
        let (_mock, mut controller) = setup();
        controller.set_to_new_record(Some(tiree()));
        assert!(controller.is_new_record());
        assert_eq!(controller.record().name, "Tiree Airport");
        assert_eq!(controller.record_info().record_description, "Weather Station");
    }
}
