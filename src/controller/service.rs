//! # Controller Service
//!
//! The façade UI code talks to: one [`RecordController`] and one [`ListController`] for
//! the same record type, sharing one [`EventBus`].
//!
//! # Architecture Note
//! The façade keeps the two halves consistent. A successful save or delete invalidates
//! the list so the next page move refetches it. Changing a filter invalidates the list and
//! raises `FilterChanged`. Validation gates saving: an invalid edit projection never
//! reaches the data service.

use crate::config::ControllerConfig;
use crate::controller::{FilterList, ListController, PageLoader, RecordController};
use crate::edit::{EditProjection, FieldView};
use crate::framework::{
    ControllerEvent, DataService, DbRecord, EventBus, MessageKind, RecordError, TaskResult,
};
use crate::values::FieldValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct ControllerService<R: DbRecord> {
    pub record: RecordController<R>,
    pub list: ListController<R>,
    service: Arc<dyn DataService<R>>,
    events: EventBus,
    config: ControllerConfig,
}

impl<R: DbRecord> ControllerService<R> {
    pub fn new(service: Arc<dyn DataService<R>>, config: ControllerConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        let record = RecordController::new(service.clone(), events.clone());
        let list = ListController::new(service.clone(), events.clone(), &config);
        info!(record_type = R::type_name(), "Controller service created");
        Self {
            record,
            list,
            service,
            events,
            config,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn task_result(&self) -> &TaskResult {
        self.record.task_result()
    }

    pub async fn load(&mut self, id: i64, refresh: bool) -> Result<bool, RecordError> {
        self.record.load(id, refresh).await
    }

    pub async fn load_by_guid(&mut self, guid: Uuid, refresh: bool) -> Result<bool, RecordError> {
        self.record.load_by_guid(guid, refresh).await
    }

    pub async fn save(&mut self, record: Option<R>) -> Result<bool, RecordError> {
        let saved = self.record.save(record).await?;
        if saved {
            self.list.invalidate();
        }
        Ok(saved)
    }

    /// Validates `projection` and saves the edited values only if every rule passes.
    pub async fn save_edit<M: FieldView>(
        &mut self,
        projection: &EditProjection<M>,
    ) -> Result<bool, RecordError> {
        if !projection.validate() {
            let messages = projection.messages();
            warn!(
                record_type = R::type_name(),
                failures = messages.len(),
                "Save blocked by validation"
            );
            self.record.set_task_result(TaskResult::failure(
                format!(
                    "{} has validation errors",
                    R::record_info().record_description
                ),
                MessageKind::Warning,
            ));
            return Ok(false);
        }
        self.save(None).await
    }

    pub async fn delete(&mut self) -> Result<bool, RecordError> {
        let deleted = self.record.delete().await?;
        if deleted {
            self.list.invalidate();
        }
        Ok(deleted)
    }

    /// A projection over the current record's shared field values.
    pub fn edit_projection<M: FieldView>(&self) -> Result<EditProjection<M>, RecordError> {
        EditProjection::new(Some(self.record.values().clone()))
    }

    pub fn set_field(&self, name: &str, value: impl Into<FieldValue>) -> bool {
        self.record.values().set(name, value)
    }

    /// Adds or replaces a filter. Returns whether the collection changed.
    pub fn set_filter(&mut self, name: &str, value: impl Into<FieldValue>, overwrite: bool) -> bool {
        let changed = self.list.filters_mut().set_filter(name, value, overwrite);
        if changed {
            debug!(record_type = R::type_name(), filter = name, "Filter set");
            self.filters_changed();
        }
        changed
    }

    pub fn clear_filter(&mut self, name: &str) -> bool {
        let changed = self.list.filters_mut().clear_filter(name);
        if changed {
            debug!(record_type = R::type_name(), filter = name, "Filter cleared");
            self.filters_changed();
        }
        changed
    }

    pub fn clear_filters(&mut self) {
        if !self.list.filters().is_empty() {
            self.list.filters_mut().clear();
            self.filters_changed();
        }
    }

    fn filters_changed(&mut self) {
        self.list.invalidate();
        self.events.emit(ControllerEvent::FilterChanged);
    }

    pub fn reset_list(&mut self) {
        self.list.reset_list();
    }

    /// Back to a blank record, fresh filters and a confirmed-empty list.
    pub fn reset(&mut self) {
        self.list
            .replace_filters(FilterList::new(self.config.filters.only_load_if_filters));
        self.record.reset();
        self.list.set_records(Vec::new());
        self.events.emit(ControllerEvent::ListChanged);
    }

    pub async fn load_paging(&mut self, loader: PageLoader<R>) -> Result<(), RecordError> {
        self.list.load_paging(loader).await
    }

    /// Id to display name for every record, with `(0, select_all)` prepended when given.
    pub async fn lookup_list(
        &self,
        select_all: Option<&str>,
    ) -> Result<BTreeMap<i64, String>, RecordError> {
        let mut lookup = self.service.get_lookup_list().await?;
        if let Some(text) = select_all {
            lookup.insert(0, text.to_string());
        }
        Ok(lookup)
    }

    pub async fn distinct_values(&self, field: &str) -> Result<Vec<String>, RecordError> {
        Ok(self.service.get_distinct_values(field).await?)
    }

    pub async fn record_count(&self) -> Result<usize, RecordError> {
        Ok(self.service.get_record_count().await?)
    }
}
