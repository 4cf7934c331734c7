//! # Data Access Contract
//!
//! [`DataService`] is everything the controllers know about persistence. Whether an
//! implementation talks to a database, a remote endpoint, or a map in memory is its own
//! business.
//!
//! # Architecture Note
//! Reads return `Result<_, DataError>` and a failure there propagates to the caller.
//! Writes return a [`TaskResult`]: a failed create/update/delete is an expected outcome
//! the user can correct and retry, so it travels as data rather than as an error.

use crate::controller::FilterList;
use crate::framework::entity::DbRecord;
use crate::framework::error::DataError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Severity attached to a [`TaskResult`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageKind {
    #[default]
    None,
    Success,
    Danger,
    Warning,
    NotImplemented,
}

/// Outcome of a create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskResult {
    pub message: String,
    pub kind: MessageKind,
    pub ok: bool,
    pub new_id: i64,
}

impl TaskResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageKind::Success,
            ok: true,
            new_id: 0,
        }
    }

    pub fn failure(message: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            message: message.into(),
            kind,
            ok: false,
            new_id: 0,
        }
    }

    pub fn not_implemented(operation: &str) -> Self {
        Self::failure(
            format!("{} is not implemented for this service", operation),
            MessageKind::NotImplemented,
        )
    }

    pub fn with_new_id(mut self, id: i64) -> Self {
        self.new_id = id;
        self
    }
}

/// The abstract data-access contract consumed by the record and list controllers.
///
/// Create, update and delete default to a `NotImplemented` result so read-only services
/// only implement the reads. Lookup and distinct-value lists default to deriving their
/// answer from the full record list.
#[async_trait]
pub trait DataService<R: DbRecord>: Send + Sync + 'static {
    async fn get_record(&self, id: i64) -> Result<Option<R>, DataError>;

    async fn get_record_by_guid(&self, guid: Uuid) -> Result<Option<R>, DataError>;

    async fn get_record_list(&self) -> Result<Vec<R>, DataError>;

    async fn get_filtered_record_list(&self, filters: &FilterList) -> Result<Vec<R>, DataError>;

    async fn get_record_count(&self) -> Result<usize, DataError>;

    async fn create_record(&self, _record: &R) -> Result<TaskResult, DataError> {
        Ok(TaskResult::not_implemented("Create"))
    }

    async fn update_record(&self, _record: &R) -> Result<TaskResult, DataError> {
        Ok(TaskResult::not_implemented("Update"))
    }

    async fn delete_record(&self, _record: &R) -> Result<TaskResult, DataError> {
        Ok(TaskResult::not_implemented("Delete"))
    }

    /// Id to display-name map of every record.
    async fn get_lookup_list(&self) -> Result<BTreeMap<i64, String>, DataError> {
        let records = self.get_record_list().await?;
        Ok(records
            .iter()
            .map(|r| (r.id(), r.display_name()))
            .collect())
    }

    /// Sorted distinct non-empty values of one column.
    async fn get_distinct_values(&self, field: &str) -> Result<Vec<String>, DataError> {
        let columns = R::columns();
        let accessor = columns
            .accessor(field)
            .ok_or_else(|| DataError::Rejected(format!("no column named {}", field)))?;
        let records = self.get_record_list().await?;
        let values: BTreeSet<String> = records
            .iter()
            .map(|r| accessor(r).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        Ok(values.into_iter().collect())
    }
}
