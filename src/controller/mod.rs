//! Record, list and filter controllers, and the façade that ties them together.

mod filter;
mod list;
mod record;
mod service;

pub use filter::{FilterItem, FilterList, ShowState};
pub use list::{
    ListController, PageFn, PageLoader, PageQuery, PageState, Pagination, RecordList,
    SortDirection, SortIndicator,
};
pub use record::RecordController;
pub use service::ControllerService;
