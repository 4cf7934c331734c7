//! # Controller Actor
//!
//! Hosts one [`ControllerService`] in its own Tokio task.
//!
//! # Architecture Note
//! The controllers are plain `&mut self` state machines. Hosting them behind a channel
//! gives every caller a cloneable handle while requests are still applied one at a time,
//! in arrival order, with exclusive access to the record and list state. No locks guard
//! the controllers themselves.
//!
//! The actor owns the [`EventBus`]. Subscribe through [`ControllerActor::events`] before
//! spawning, or through the system wrapper afterwards.

use crate::config::ControllerConfig;
use crate::controller::ControllerService;
use crate::framework::client::ControllerClient;
use crate::framework::entity::DbRecord;
use crate::framework::error::RecordError;
use crate::framework::events::EventBus;
use crate::framework::message::ControllerRequest;
use crate::framework::service::DataService;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct ControllerActor<R: DbRecord> {
    receiver: mpsc::Receiver<ControllerRequest<R>>,
    controller: ControllerService<R>,
}

impl<R: DbRecord> ControllerActor<R> {
    /// Creates the actor and its client. The channel holds `config.channel_capacity`
    /// requests before senders wait.
    pub fn new(service: Arc<dyn DataService<R>>, config: ControllerConfig) -> (Self, ControllerClient<R>) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let actor = Self {
            receiver,
            controller: ControllerService::new(service, config),
        };
        (actor, ControllerClient::new(sender))
    }

    pub fn events(&self) -> &EventBus {
        self.controller.events()
    }

    fn current_page(&self) -> Vec<R> {
        self.controller
            .list
            .paged_records()
            .map(<[R]>::to_vec)
            .unwrap_or_default()
    }

    fn page_reply(&self, result: Result<(), RecordError>) -> Result<Vec<R>, RecordError> {
        result.map(|()| self.current_page())
    }

    /// Runs the request loop until every client is dropped.
    pub async fn run(mut self) {
        let record_type = R::type_name();
        info!(record_type, "Controller started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ControllerRequest::Load {
                    id,
                    refresh,
                    respond_to,
                } => {
                    debug!(record_type, id, refresh, "Load");
                    let _ = respond_to.send(self.controller.load(id, refresh).await);
                }
                ControllerRequest::LoadByGuid {
                    guid,
                    refresh,
                    respond_to,
                } => {
                    debug!(record_type, %guid, refresh, "LoadByGuid");
                    let _ = respond_to.send(self.controller.load_by_guid(guid, refresh).await);
                }
                ControllerRequest::Save { record, respond_to } => {
                    debug!(record_type, ?record, "Save");
                    let result = self.controller.save(record).await;
                    let _ = respond_to.send(result.map(|_| self.controller.task_result().clone()));
                }
                ControllerRequest::Delete { respond_to } => {
                    let result = self.controller.delete().await;
                    let _ = respond_to.send(result.map(|_| self.controller.task_result().clone()));
                }
                ControllerRequest::Reset { respond_to } => {
                    self.controller.reset();
                    let _ = respond_to.send(Ok(()));
                }
                ControllerRequest::NewRecord {
                    template,
                    respond_to,
                } => {
                    self.controller.record.set_to_new_record(template);
                    let _ = respond_to.send(Ok(()));
                }
                ControllerRequest::GetRecord { respond_to } => {
                    let _ = respond_to.send(Ok(self.controller.record.record().clone()));
                }
                ControllerRequest::GetValues { respond_to } => {
                    let _ = respond_to.send(Ok(self.controller.record.values().clone()));
                }
                ControllerRequest::SetField {
                    name,
                    value,
                    respond_to,
                } => {
                    debug!(record_type, field = %name, %value, "SetField");
                    let _ = respond_to.send(Ok(self.controller.set_field(&name, value)));
                }
                ControllerRequest::SetFilter {
                    name,
                    value,
                    overwrite,
                    respond_to,
                } => {
                    let changed = self.controller.set_filter(&name, value, overwrite);
                    let _ = respond_to.send(Ok(changed));
                }
                ControllerRequest::ClearFilter { name, respond_to } => {
                    let _ = respond_to.send(Ok(self.controller.clear_filter(&name)));
                }
                ControllerRequest::LoadPaging { loader, respond_to } => {
                    debug!(record_type, ?loader, "LoadPaging");
                    let result = self.controller.load_paging(loader).await;
                    let _ = respond_to.send(self.page_reply(result));
                }
                ControllerRequest::MoveOnePage {
                    direction,
                    respond_to,
                } => {
                    let result = self.controller.list.move_one_page(direction).await;
                    let _ = respond_to.send(self.page_reply(result));
                }
                ControllerRequest::GoToPage { page, respond_to } => {
                    let result = self.controller.list.go_to_page(page).await;
                    let _ = respond_to.send(self.page_reply(result));
                }
                ControllerRequest::ChangeBlock {
                    direction,
                    suppress_page_update,
                    respond_to,
                } => {
                    let result = self
                        .controller
                        .list
                        .change_block(direction, suppress_page_update)
                        .await;
                    let _ = respond_to.send(self.page_reply(result));
                }
                ControllerRequest::Sort { column, respond_to } => {
                    let result = self.controller.list.sort(&column).await;
                    if let Err(e) = &result {
                        warn!(record_type, error = %e, "Sort failed");
                    }
                    let _ = respond_to.send(self.page_reply(result));
                }
                ControllerRequest::ResetList { respond_to } => {
                    self.controller.reset_list();
                    let _ = respond_to.send(Ok(()));
                }
                ControllerRequest::GetPageState { respond_to } => {
                    let _ = respond_to.send(Ok(self.controller.list.page_state()));
                }
                ControllerRequest::LookupList {
                    select_all,
                    respond_to,
                } => {
                    let result = self.controller.lookup_list(select_all.as_deref()).await;
                    let _ = respond_to.send(result);
                }
                ControllerRequest::DistinctValues { field, respond_to } => {
                    let _ = respond_to.send(self.controller.distinct_values(&field).await);
                }
            }
        }

        info!(record_type, "Shutdown");
    }
}
