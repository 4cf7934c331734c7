//! # Controller Messages
//!
//! Requests a [`ControllerClient`](crate::framework::ControllerClient) sends to its
//! [`ControllerActor`](crate::framework::ControllerActor). Each carries a oneshot sender
//! for the reply.
//!
//! # Architecture Note
//! The variants mirror the façade's operations one to one. Page-moving requests all
//! reply with the page the move produced, so a caller never needs a second round trip
//! to see what it navigated to.

use crate::controller::{PageLoader, PageState};
use crate::framework::entity::DbRecord;
use crate::framework::error::RecordError;
use crate::framework::service::TaskResult;
use crate::values::{FieldValue, SharedFieldValues};
use std::collections::BTreeMap;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, RecordError>>;

#[derive(Debug)]
pub enum ControllerRequest<R: DbRecord> {
    Load {
        id: i64,
        refresh: bool,
        respond_to: Response<bool>,
    },
    LoadByGuid {
        guid: Uuid,
        refresh: bool,
        respond_to: Response<bool>,
    },
    /// Saves `record`, or the edited values when `None`.
    Save {
        record: Option<R>,
        respond_to: Response<TaskResult>,
    },
    Delete {
        respond_to: Response<TaskResult>,
    },
    Reset {
        respond_to: Response<()>,
    },
    NewRecord {
        template: Option<R>,
        respond_to: Response<()>,
    },
    GetRecord {
        respond_to: Response<R>,
    },
    /// Hands out the shared edit store, for building edit projections client side.
    GetValues {
        respond_to: Response<SharedFieldValues>,
    },
    SetField {
        name: String,
        value: FieldValue,
        respond_to: Response<bool>,
    },
    SetFilter {
        name: String,
        value: FieldValue,
        overwrite: bool,
        respond_to: Response<bool>,
    },
    ClearFilter {
        name: String,
        respond_to: Response<bool>,
    },
    LoadPaging {
        loader: PageLoader<R>,
        respond_to: Response<Vec<R>>,
    },
    MoveOnePage {
        direction: i32,
        respond_to: Response<Vec<R>>,
    },
    GoToPage {
        page: u32,
        respond_to: Response<Vec<R>>,
    },
    ChangeBlock {
        direction: i32,
        suppress_page_update: bool,
        respond_to: Response<Vec<R>>,
    },
    Sort {
        column: String,
        respond_to: Response<Vec<R>>,
    },
    ResetList {
        respond_to: Response<()>,
    },
    GetPageState {
        respond_to: Response<PageState>,
    },
    LookupList {
        select_all: Option<String>,
        respond_to: Response<BTreeMap<i64, String>>,
    },
    DistinctValues {
        field: String,
        respond_to: Response<Vec<String>>,
    },
}
