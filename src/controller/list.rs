//! # List & Pagination Engine
//!
//! Owns the filtered record list, the visible page, and the block window of page numbers
//! shown by a pager.
//!
//! # Architecture Note
//! The list is a tagged state, [`RecordList::NotLoaded`] or [`RecordList::Loaded`].
//! `NotLoaded` means "fetch before use"; `Loaded(vec![])` means "the store confirmed
//! there is nothing". Every page loader goes through
//! [`get_filtered_list`](ListController::get_filtered_list), so invalidating the list is
//! all it takes to force a refetch on the next page move.
//!
//! Filtering sends only the *first* filter to the data service. The remaining filters
//! refine the returned records in memory. The first filter is therefore the only one that
//! reduces what the store transfers, and callers should make it the most selective.
//!
//! Sorting happens in memory, after filtering, through the record type's
//! [`ColumnMap`](crate::framework::ColumnMap).
//!
//! # Pagination invariants
//! Whenever there is at least one page:
//! `1 <= start_page <= current_page <= end_page <= total_pages` and
//! `end_page - start_page < block_size`. With no pages the window is `1..=1`.

use crate::config::ControllerConfig;
use crate::controller::{FilterItem, FilterList};
use crate::framework::{
    ColumnAccessor, ColumnMap, ControllerEvent, DataService, DbRecord, EventBus, RecordError,
};
use crate::values::same_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// What a column header should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecordList<R> {
    #[default]
    NotLoaded,
    Loaded(Vec<R>),
}

impl<R> RecordList<R> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, RecordList::Loaded(_))
    }

    pub fn as_slice(&self) -> Option<&[R]> {
        match self {
            RecordList::Loaded(records) => Some(records),
            RecordList::NotLoaded => None,
        }
    }

    pub fn len(&self) -> Option<usize> {
        self.as_slice().map(<[R]>::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub page_size: usize,
    pub block_size: u32,
}

/// Snapshot of paging and sorting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub total_pages: u32,
    pub page_size: usize,
    pub record_count: Option<usize>,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
}

/// The page a loader is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub start: usize,
    pub size: usize,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
}

pub type PageFn<R> = Arc<dyn Fn(&[R], &PageQuery) -> Vec<R> + Send + Sync>;

/// How the visible page is produced from the filtered list.
pub enum PageLoader<R> {
    /// Unsorted slice of the filtered list.
    Page,
    /// Slice of the filtered list sorted by the active column.
    SortedPage,
    Custom(PageFn<R>),
}

impl<R> Clone for PageLoader<R> {
    fn clone(&self) -> Self {
        match self {
            PageLoader::Page => PageLoader::Page,
            PageLoader::SortedPage => PageLoader::SortedPage,
            PageLoader::Custom(f) => PageLoader::Custom(f.clone()),
        }
    }
}

impl<R> fmt::Debug for PageLoader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLoader::Page => f.write_str("Page"),
            PageLoader::SortedPage => f.write_str("SortedPage"),
            PageLoader::Custom(_) => f.write_str("Custom"),
        }
    }
}

pub struct ListController<R: DbRecord> {
    service: Arc<dyn DataService<R>>,
    events: EventBus,
    columns: ColumnMap<R>,
    records: RecordList<R>,
    paged_records: Option<Vec<R>>,
    filters: FilterList,
    pagination: Pagination,
    no_pagination: bool,
    sort_column: Option<String>,
    sort_direction: SortDirection,
    default_sort_column: Option<String>,
    default_sort_direction: SortDirection,
    loader: Option<PageLoader<R>>,
}

impl<R: DbRecord> ListController<R> {
    pub fn new(service: Arc<dyn DataService<R>>, events: EventBus, config: &ControllerConfig) -> Self {
        Self {
            service,
            events,
            columns: R::columns(),
            records: RecordList::NotLoaded,
            paged_records: None,
            filters: FilterList::new(config.filters.only_load_if_filters),
            pagination: Pagination {
                current_page: 1,
                start_page: 1,
                end_page: 1,
                page_size: config.paging.page_size.max(1),
                block_size: config.paging.block_size.max(1),
            },
            no_pagination: false,
            sort_column: config.sorting.default_column.clone(),
            sort_direction: config.sorting.default_direction,
            default_sort_column: config.sorting.default_column.clone(),
            default_sort_direction: config.sorting.default_direction,
            loader: None,
        }
    }

    pub fn records(&self) -> &RecordList<R> {
        &self.records
    }

    pub fn paged_records(&self) -> Option<&[R]> {
        self.paged_records.as_deref()
    }

    pub fn filters(&self) -> &FilterList {
        &self.filters
    }

    /// Direct filter access. Callers changing filters should invalidate the list.
    pub fn filters_mut(&mut self) -> &mut FilterList {
        &mut self.filters
    }

    pub fn replace_filters(&mut self, filters: FilterList) {
        self.filters = filters;
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn record_count(&self) -> Option<usize> {
        self.records.len()
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.page_size = page_size.max(1);
    }

    /// Shows the whole list as a single page.
    pub fn set_no_pagination(&mut self, no_pagination: bool) {
        self.no_pagination = no_pagination;
    }

    pub fn set_default_sort(&mut self, column: Option<&str>, direction: SortDirection) {
        self.default_sort_column = column.map(str::to_string);
        self.default_sort_direction = direction;
    }

    fn effective_page_size(&self) -> usize {
        if self.no_pagination {
            self.record_count().unwrap_or(0).max(1)
        } else {
            self.pagination.page_size.max(1)
        }
    }

    pub fn total_pages(&self) -> u32 {
        let count = self.record_count().unwrap_or(0);
        let pages = count.div_ceil(self.effective_page_size());
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_pagination(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn has_paged_records(&self) -> bool {
        self.paged_records.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_no_paged_records(&self) -> bool {
        self.paged_records.as_ref().is_some_and(Vec::is_empty)
    }

    fn page_start(&self) -> usize {
        (self.pagination.current_page.max(1) as usize - 1) * self.effective_page_size()
    }

    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.pagination.current_page,
            start: self.page_start(),
            size: self.effective_page_size(),
            sort_column: self.sort_column.clone(),
            sort_direction: self.sort_direction,
        }
    }

    pub fn page_state(&self) -> PageState {
        PageState {
            current_page: self.pagination.current_page,
            start_page: self.pagination.start_page,
            end_page: self.pagination.end_page,
            total_pages: self.total_pages(),
            page_size: self.effective_page_size(),
            record_count: self.record_count(),
            sort_column: self.sort_column.clone(),
            sort_direction: self.sort_direction,
        }
    }

    pub fn sort_indicator(&self, column: &str) -> SortIndicator {
        match &self.sort_column {
            Some(active) if same_name(active, column) => match self.sort_direction {
                SortDirection::Ascending => SortIndicator::Ascending,
                SortDirection::Descending => SortIndicator::Descending,
            },
            _ => SortIndicator::Unsorted,
        }
    }

    /// Marks the list stale without notifying.
    pub fn invalidate(&mut self) {
        self.records = RecordList::NotLoaded;
    }

    /// Marks the list stale and raises `ListChanged`.
    pub fn reset_list(&mut self) {
        self.invalidate();
        self.events.emit(ControllerEvent::ListChanged);
    }

    /// Installs `records` as the confirmed list contents.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = RecordList::Loaded(records);
    }

    /// Fetches the filtered list if it is not loaded. Returns whether a fetch happened.
    #[instrument(skip(self), fields(record_type = R::type_name()))]
    pub async fn get_filtered_list(&mut self) -> Result<bool, RecordError> {
        if self.records.is_loaded() {
            return Ok(false);
        }
        let records = if self.filters.should_load() {
            let (query, rest) = self.filters.split_first();
            let fetched = self.service.get_filtered_record_list(&query).await?;
            let fetched_count = fetched.len();
            let refined = refine(&self.columns, fetched, rest)?;
            debug!(
                fetched = fetched_count,
                refined = refined.len(),
                filters = self.filters.len(),
                "Filtered list loaded"
            );
            refined
        } else {
            debug!("Filters required but none set");
            Vec::new()
        };
        self.records = RecordList::Loaded(records);
        Ok(true)
    }

    /// Loads the list if needed and fits the window to its page count.
    async fn load_list(&mut self) -> Result<(), RecordError> {
        self.get_filtered_list().await?;
        self.clamp_window();
        Ok(())
    }

    /// Pulls the current page into `1..=total_pages` and re-derives the block window around
    /// it when the window no longer fits the list.
    fn clamp_window(&mut self) {
        let total = self.total_pages();
        let block = self.pagination.block_size.max(1);
        let p = &mut self.pagination;
        p.current_page = p.current_page.clamp(1, total.max(1));
        let fits = p.start_page >= 1
            && p.start_page <= p.current_page
            && p.current_page <= p.end_page
            && p.end_page <= total.max(1)
            && p.end_page - p.start_page < block;
        if !fits {
            p.start_page = ((p.current_page - 1) / block) * block + 1;
            p.end_page = (p.start_page + block - 1).min(total).max(p.start_page);
        }
    }

    /// Unsorted slice for the current page.
    pub async fn data_page(&mut self) -> Result<Vec<R>, RecordError> {
        self.load_list().await?;
        let start = self.page_start();
        let size = self.effective_page_size();
        let records = self.records.as_slice().unwrap_or(&[]);
        Ok(records.iter().skip(start).take(size).cloned().collect())
    }

    /// Sorted slice for the current page.
    pub async fn data_page_with_sorting(&mut self) -> Result<Vec<R>, RecordError> {
        self.load_list().await?;
        let start = self.page_start();
        let size = self.effective_page_size();
        let sorted = self.sorted(self.records.as_slice().unwrap_or(&[]));
        Ok(sorted.into_iter().skip(start).take(size).collect())
    }

    fn sorted(&self, records: &[R]) -> Vec<R> {
        let mut out = records.to_vec();
        let accessor = self
            .sort_column
            .as_deref()
            .and_then(|c| self.columns.accessor(c));
        if let Some(accessor) = accessor {
            let direction = self.sort_direction;
            out.sort_by(|a, b| {
                let order = accessor(a).sort_cmp(&accessor(b));
                match direction {
                    SortDirection::Ascending => order,
                    SortDirection::Descending => order.reverse(),
                }
            });
        }
        out
    }

    async fn run_loader(&mut self) -> Result<(), RecordError> {
        let Some(loader) = self.loader.clone() else {
            return Ok(());
        };
        let page = match loader {
            PageLoader::Page => self.data_page().await?,
            PageLoader::SortedPage => self.data_page_with_sorting().await?,
            PageLoader::Custom(load) => {
                self.load_list().await?;
                let query = self.page_query();
                load(self.records.as_slice().unwrap_or(&[]), &query)
            }
        };
        self.paged_records = Some(page);
        Ok(())
    }

    /// Installs `loader` and reloads from page 1 with the default sort.
    #[instrument(skip(self), fields(record_type = R::type_name()))]
    pub async fn load_paging(&mut self, loader: PageLoader<R>) -> Result<(), RecordError> {
        self.records = RecordList::NotLoaded;
        self.loader = Some(loader);
        self.reload().await
    }

    /// Restarts paging with the installed loader: page 1, default sort, first block.
    /// Always raises `ListChanged` on success.
    pub async fn reload(&mut self) -> Result<(), RecordError> {
        self.pagination.current_page = 1;
        self.sort_column = self.default_sort_column.clone();
        self.sort_direction = self.default_sort_direction;
        self.get_filtered_list().await?;
        self.shift_block(0);
        self.run_loader().await?;
        debug!(
            record_type = R::type_name(),
            records = self.record_count().unwrap_or(0),
            pages = self.total_pages(),
            "Paging loaded"
        );
        self.events
            .emit(ControllerEvent::PageChanged(self.pagination.current_page));
        self.events.emit(ControllerEvent::ListChanged);
        Ok(())
    }

    /// Re-runs the loader for the current page and raises `PageChanged`.
    pub async fn paginate(&mut self) -> Result<(), RecordError> {
        self.run_loader().await?;
        self.events
            .emit(ControllerEvent::PageChanged(self.pagination.current_page));
        Ok(())
    }

    /// Moves the block window. Returns whether it moved.
    fn shift_block(&mut self, direction: i32) -> bool {
        let total = self.total_pages();
        let block = self.pagination.block_size.max(1);
        let p = &mut self.pagination;
        if direction > 0 {
            if p.end_page < total {
                p.start_page = p.end_page + 1;
                p.end_page = (p.start_page + block - 1).min(total);
                return true;
            }
            false
        } else if direction < 0 {
            if p.start_page > 1 {
                p.end_page = p.start_page - 1;
                p.start_page = p.start_page.saturating_sub(block).max(1);
                return true;
            }
            false
        } else {
            p.start_page = 1;
            p.end_page = block.min(total).max(1);
            true
        }
    }

    /// Moves to the next (`+1`), previous (`-1`) or first (`0`) block.
    ///
    /// With `suppress_page_update` false the current page snaps to the new block's first
    /// page and is re-fetched. The current page is never left outside the window: if the
    /// move would do that, it snaps and re-fetches regardless.
    pub async fn change_block(
        &mut self,
        direction: i32,
        suppress_page_update: bool,
    ) -> Result<(), RecordError> {
        self.load_list().await?;
        let moved = self.shift_block(direction);
        let p = self.pagination;
        let outside = p.current_page < p.start_page || p.current_page > p.end_page;
        if (moved && !suppress_page_update) || outside {
            self.pagination.current_page = p.start_page;
        }
        if !suppress_page_update || outside {
            self.paginate().await?;
        }
        Ok(())
    }

    /// Moves one page forward or back, shifting the block at its edges.
    pub async fn move_one_page(&mut self, direction: i32) -> Result<(), RecordError> {
        self.load_list().await?;
        let total = self.total_pages();
        if direction > 0 {
            if self.pagination.current_page < total {
                if self.pagination.current_page == self.pagination.end_page {
                    self.shift_block(1);
                }
                self.pagination.current_page += 1;
            }
        } else if direction < 0 && self.pagination.current_page > 1 {
            if self.pagination.current_page == self.pagination.start_page {
                self.shift_block(-1);
            }
            self.pagination.current_page -= 1;
        }
        self.paginate().await
    }

    /// Jumps to `page`, clamped to the available pages, with the window around it.
    pub async fn go_to_page(&mut self, page: u32) -> Result<(), RecordError> {
        self.load_list().await?;
        let total = self.total_pages();
        let page = page.clamp(1, total.max(1));
        let block = self.pagination.block_size.max(1);
        let start = ((page - 1) / block) * block + 1;
        self.pagination.current_page = page;
        self.pagination.start_page = start;
        self.pagination.end_page = (start + block - 1).min(total).max(start);
        self.paginate().await
    }

    /// Sorts by `column`, flipping direction when it is already active, then shows page 1.
    pub async fn sort(&mut self, column: &str) -> Result<(), RecordError> {
        let Some(name) = self
            .columns
            .names()
            .find(|n| same_name(n, column))
            .map(str::to_string)
        else {
            warn!(record_type = R::type_name(), column, "Unknown sort column");
            return Err(RecordError::UnknownColumn(column.to_string()));
        };
        match &self.sort_column {
            Some(active) if same_name(active, &name) => {
                self.sort_direction = self.sort_direction.flipped();
            }
            _ => {
                self.sort_column = Some(name);
                self.sort_direction = SortDirection::Ascending;
            }
        }
        debug!(
            record_type = R::type_name(),
            column = self.sort_column.as_deref(),
            direction = ?self.sort_direction,
            "Sort"
        );
        self.go_to_page(1).await
    }
}

fn refine<R>(
    columns: &ColumnMap<R>,
    records: Vec<R>,
    filters: &[FilterItem],
) -> Result<Vec<R>, RecordError> {
    if filters.is_empty() {
        return Ok(records);
    }
    let checks: Vec<(ColumnAccessor<R>, &FilterItem)> = filters
        .iter()
        .map(|f| {
            columns
                .accessor(&f.field_name)
                .map(|a| (a, f))
                .ok_or_else(|| RecordError::UnknownColumn(f.field_name.clone()))
        })
        .collect::<Result<_, _>>()?;
    Ok(records
        .into_iter()
        .filter(|r| checks.iter().all(|(get, f)| get(r).matches(&f.value)))
        .collect())
}
