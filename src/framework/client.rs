//! # Controller Client
//!
//! The cloneable handle to a running [`ControllerActor`](crate::framework::ControllerActor).

use crate::controller::{PageLoader, PageState};
use crate::edit::{EditProjection, FieldView};
use crate::framework::entity::DbRecord;
use crate::framework::error::RecordError;
use crate::framework::message::{ControllerRequest, Response};
use crate::framework::service::{MessageKind, TaskResult};
use crate::values::{FieldValue, FieldValueStore};
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Async API over a controller actor.
///
/// Cloning only clones the channel sender. The actor shuts down once every clone is
/// dropped.
pub struct ControllerClient<R: DbRecord> {
    sender: mpsc::Sender<ControllerRequest<R>>,
}

impl<R: DbRecord> Clone for ControllerClient<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<R: DbRecord> ControllerClient<R> {
    pub fn new(sender: mpsc::Sender<ControllerRequest<R>>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Response<T>) -> ControllerRequest<R>,
    ) -> Result<T, RecordError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| RecordError::ActorClosed)?;
        response.await.map_err(|_| RecordError::ActorDropped)?
    }

    pub async fn load(&self, id: i64, refresh: bool) -> Result<bool, RecordError> {
        self.request(|respond_to| ControllerRequest::Load {
            id,
            refresh,
            respond_to,
        })
        .await
    }

    pub async fn load_by_guid(&self, guid: Uuid, refresh: bool) -> Result<bool, RecordError> {
        self.request(|respond_to| ControllerRequest::LoadByGuid {
            guid,
            refresh,
            respond_to,
        })
        .await
    }

    /// Saves the edited values of the current record.
    pub async fn save(&self) -> Result<TaskResult, RecordError> {
        self.request(|respond_to| ControllerRequest::Save {
            record: None,
            respond_to,
        })
        .await
    }

    pub async fn save_record(&self, record: R) -> Result<TaskResult, RecordError> {
        self.request(|respond_to| ControllerRequest::Save {
            record: Some(record),
            respond_to,
        })
        .await
    }

    /// Validates `projection` locally and saves only when it passes.
    #[instrument(skip_all, fields(record_type = R::type_name()))]
    pub async fn save_edit<M: FieldView>(
        &self,
        projection: &EditProjection<M>,
    ) -> Result<TaskResult, RecordError> {
        if !projection.validate() {
            warn!(failures = projection.messages().len(), "Save blocked by validation");
            return Ok(TaskResult::failure(
                format!("{} has validation errors", R::record_info().record_description),
                MessageKind::Warning,
            ));
        }
        self.save().await
    }

    pub async fn delete(&self) -> Result<TaskResult, RecordError> {
        self.request(|respond_to| ControllerRequest::Delete { respond_to })
            .await
    }

    pub async fn reset(&self) -> Result<(), RecordError> {
        self.request(|respond_to| ControllerRequest::Reset { respond_to })
            .await
    }

    pub async fn new_record(&self, template: Option<R>) -> Result<(), RecordError> {
        self.request(|respond_to| ControllerRequest::NewRecord {
            template,
            respond_to,
        })
        .await
    }

    pub async fn record(&self) -> Result<R, RecordError> {
        self.request(|respond_to| ControllerRequest::GetRecord { respond_to })
            .await
    }

    /// Detached copy of the current field values.
    pub async fn values(&self) -> Result<FieldValueStore, RecordError> {
        let shared = self
            .request(|respond_to| ControllerRequest::GetValues { respond_to })
            .await?;
        Ok(shared.snapshot())
    }

    /// A projection writing straight into the actor's edit store.
    pub async fn edit_projection<M: FieldView>(&self) -> Result<EditProjection<M>, RecordError> {
        let shared = self
            .request(|respond_to| ControllerRequest::GetValues { respond_to })
            .await?;
        EditProjection::new(Some(shared))
    }

    pub async fn set_field(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<bool, RecordError> {
        let name = name.to_string();
        let value = value.into();
        self.request(|respond_to| ControllerRequest::SetField {
            name,
            value,
            respond_to,
        })
        .await
    }

    pub async fn set_filter(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
        overwrite: bool,
    ) -> Result<bool, RecordError> {
        let name = name.to_string();
        let value = value.into();
        self.request(|respond_to| ControllerRequest::SetFilter {
            name,
            value,
            overwrite,
            respond_to,
        })
        .await
    }

    pub async fn clear_filter(&self, name: &str) -> Result<bool, RecordError> {
        let name = name.to_string();
        self.request(|respond_to| ControllerRequest::ClearFilter { name, respond_to })
            .await
    }

    pub async fn load_paging(&self, loader: PageLoader<R>) -> Result<Vec<R>, RecordError> {
        self.request(|respond_to| ControllerRequest::LoadPaging { loader, respond_to })
            .await
    }

    pub async fn move_one_page(&self, direction: i32) -> Result<Vec<R>, RecordError> {
        self.request(|respond_to| ControllerRequest::MoveOnePage {
            direction,
            respond_to,
        })
        .await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<Vec<R>, RecordError> {
        self.request(|respond_to| ControllerRequest::GoToPage { page, respond_to })
            .await
    }

    pub async fn change_block(
        &self,
        direction: i32,
        suppress_page_update: bool,
    ) -> Result<Vec<R>, RecordError> {
        self.request(|respond_to| ControllerRequest::ChangeBlock {
            direction,
            suppress_page_update,
            respond_to,
        })
        .await
    }

    pub async fn sort(&self, column: &str) -> Result<Vec<R>, RecordError> {
        let column = column.to_string();
        self.request(|respond_to| ControllerRequest::Sort { column, respond_to })
            .await
    }

    pub async fn reset_list(&self) -> Result<(), RecordError> {
        self.request(|respond_to| ControllerRequest::ResetList { respond_to })
            .await
    }

    pub async fn page_state(&self) -> Result<PageState, RecordError> {
        self.request(|respond_to| ControllerRequest::GetPageState { respond_to })
            .await
    }

    pub async fn lookup_list(
        &self,
        select_all: Option<&str>,
    ) -> Result<BTreeMap<i64, String>, RecordError> {
        let select_all = select_all.map(str::to_string);
        self.request(|respond_to| ControllerRequest::LookupList {
            select_all,
            respond_to,
        })
        .await
    }

    pub async fn distinct_values(&self, field: &str) -> Result<Vec<String>, RecordError> {
        let field = field.to_string();
        self.request(|respond_to| ControllerRequest::DistinctValues { field, respond_to })
            .await
    }
}
