//! The list controller.
//!
//! A [`ListView`] owns a list's options, the dataset it loaded, the working
//! dataset produced by the query pipeline, the page on display and the row
//! selection. Loading picks a source from the options (inline records, then a
//! JSON file, then the configured transport), fetches, and pages the result.
//!
//! # Paging modes
//!
//! Inline and file sources always page locally: the whole dataset is
//! filtered, sorted and limited, then sliced. A transport pages on the server
//! unless `pagination_on_client` is set; the server then receives `offset` and
//! `pagesize` and returns a single page plus the total `rowcount`.
//!
//! # Concurrent loads
//!
//! [`ListView::begin_load`] issues a [`LoadTicket`]. Only the most recently
//! issued ticket can complete; an older fetch that finishes late is discarded
//! with [`LoadError::Superseded`] and leaves the list untouched.

use std::fmt;
use std::sync::Arc;

use pagewise_query::{process, ConditionError, Dir, OrderBy, Pager, Pagination, Record, Seekable};
use tracing::{debug, error, warn};

use crate::error::LoadError;
use crate::options::{ListOptions, OptionsPatch};
use crate::selection::Selection;
use crate::source::{fetch_blocking, DataSource, FetchRequest, FetchResponse, ResponseMeta};
use crate::sources::{InlineSource, JsonFileSource};

/// Which kind of source served a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Inline,
    JsonFile,
    Transport,
}

impl SourceKind {
    /// Whether this source serves a whole dataset.
    pub fn serves_whole_dataset(self) -> bool {
        !matches!(self, SourceKind::Transport)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::JsonFile => write!(f, "json-file"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

/// Identifies one load. Only the latest ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    source: SourceKind,
}

impl LoadTicket {
    /// Sequence number of the load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Source the load was issued against.
    pub fn source(&self) -> SourceKind {
        self.source
    }
}

/// A started load: the ticket, the request and the source to fetch from.
pub struct PendingLoad {
    ticket: LoadTicket,
    request: FetchRequest,
    source: Arc<dyn DataSource>,
}

impl PendingLoad {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Fetches on the current thread.
    pub fn fetch(&self) -> Result<FetchResponse, LoadError> {
        self.source.fetch(&self.request)
    }

    /// Fetches on tokio's blocking pool, handing back the ticket.
    pub async fn fetch_async(self) -> (LoadTicket, Result<FetchResponse, LoadError>) {
        let ticket = self.ticket;
        (ticket, fetch_blocking(self.source, self.request).await)
    }
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .field("request", &self.request)
            .field("source", &self.source.name())
            .finish()
    }
}

/// Summary of the list state after a load or a change.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Source of the dataset on display, if anything was loaded.
    pub source: Option<SourceKind>,
    /// Records on the current page.
    pub records: usize,
    /// Rows in the working dataset (or reported by the server).
    pub rowcount: usize,
    pub pagination: Option<Pagination>,
    /// Conditions that could not be evaluated and were treated as passed.
    pub condition_errors: Vec<ConditionError>,
}

/// A paged, sortable, selectable list of records.
pub struct ListView {
    options: ListOptions,
    transport: Option<Arc<dyn DataSource>>,
    loaded: Vec<Record>,
    working: Vec<Record>,
    page: Vec<Record>,
    rowcount: usize,
    offset: usize,
    client_paging: bool,
    pagination: Option<Pagination>,
    selection: Selection,
    server_response: Option<ResponseMeta>,
    condition_errors: Vec<ConditionError>,
    last_source: Option<SourceKind>,
    generation: u64,
}

impl ListView {
    /// Creates an empty list. Nothing is fetched until [`load`](Self::load).
    pub fn new(options: ListOptions) -> Self {
        ListView {
            options,
            transport: None,
            loaded: Vec::new(),
            working: Vec::new(),
            page: Vec::new(),
            rowcount: 0,
            offset: 0,
            client_paging: false,
            pagination: None,
            selection: Selection::new(),
            server_response: None,
            condition_errors: Vec::new(),
            last_source: None,
            generation: 0,
        }
    }

    /// Sets the transport used when the options name no inline data or file.
    pub fn with_transport(mut self, transport: impl DataSource + 'static) -> Self {
        self.set_transport(Arc::new(transport));
        self
    }

    /// Replaces the transport.
    pub fn set_transport(&mut self, transport: Arc<dyn DataSource>) {
        self.transport = Some(transport);
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetches from the configured source and pages the result.
    pub fn load(&mut self) -> Result<Loaded, LoadError> {
        let pending = self.begin_load()?;
        let result = pending.fetch();
        self.complete_load(pending.ticket(), result)
    }

    /// Merges options, then loads.
    pub fn load_with(&mut self, patch: OptionsPatch) -> Result<Loaded, LoadError> {
        self.options.apply(patch);
        self.load()
    }

    /// Loads again with the current options and offset.
    pub fn refresh(&mut self) -> Result<Loaded, LoadError> {
        self.load()
    }

    /// Loads with the fetch running on tokio's blocking pool.
    pub async fn load_async(&mut self) -> Result<Loaded, LoadError> {
        let pending = self.begin_load()?;
        let (ticket, result) = pending.fetch_async().await;
        self.complete_load(ticket, result)
    }

    /// Starts a load: picks the source, builds the request and issues a
    /// ticket that supersedes every earlier one.
    pub fn begin_load(&mut self) -> Result<PendingLoad, LoadError> {
        let Some((kind, source)) = self.resolve_source() else {
            error!(list = %self.options.log_id, "no data source configured");
            return Err(LoadError::NoDataSource);
        };
        self.options.pager()?;

        self.generation += 1;
        self.selection.clear();
        let server_paging = !kind.serves_whole_dataset() && !self.options.pagination_on_client;
        let request = FetchRequest::from_options(&self.options, self.offset, server_paging);
        debug!(
            list = %self.options.log_id,
            source = %kind,
            generation = self.generation,
            offset = self.offset,
            "load started"
        );
        Ok(PendingLoad {
            ticket: LoadTicket {
                generation: self.generation,
                source: kind,
            },
            request,
            source,
        })
    }

    /// Applies the result of a fetch started by [`begin_load`](Self::begin_load).
    ///
    /// A failed fetch, or a response whose `result` is `"ERROR"`, empties the
    /// list and returns the error.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchResponse, LoadError>,
    ) -> Result<Loaded, LoadError> {
        if ticket.generation != self.generation {
            debug!(
                list = %self.options.log_id,
                stale = ticket.generation,
                latest = self.generation,
                "discarding superseded load"
            );
            return Err(LoadError::Superseded);
        }

        match result.and_then(FetchResponse::into_result) {
            Ok(response) => self.apply_response(ticket.source, response),
            Err(err) => {
                warn!(list = %self.options.log_id, source = %ticket.source, error = %err, "load failed");
                if err.resets_records() {
                    self.reset_records();
                }
                Err(err)
            }
        }
    }

    fn resolve_source(&self) -> Option<(SourceKind, Arc<dyn DataSource>)> {
        if let Some(data) = &self.options.data {
            let source: Arc<dyn DataSource> = Arc::new(InlineSource::new(data.clone()));
            return Some((SourceKind::Inline, source));
        }
        if let Some(path) = &self.options.json_file {
            let source: Arc<dyn DataSource> = Arc::new(JsonFileSource::new(path));
            return Some((SourceKind::JsonFile, source));
        }
        self.transport
            .as_ref()
            .map(|transport| (SourceKind::Transport, Arc::clone(transport)))
    }

    fn apply_response(
        &mut self,
        kind: SourceKind,
        response: FetchResponse,
    ) -> Result<Loaded, LoadError> {
        let pager = self.options.pager()?;
        self.last_source = Some(kind);

        if kind.serves_whole_dataset() {
            self.client_paging = true;
            self.loaded = response.records;
            self.reprocess(pager);
        } else {
            self.server_response = Some(response.meta());
            if let Some(orderby) = response.orderby {
                self.options.orderby = orderby;
            }
            self.client_paging = self.options.pagination_on_client;
            self.rowcount = response.rowcount.unwrap_or(response.records.len());
            self.condition_errors.clear();
            self.loaded = response.records;
            self.working = self.loaded.clone();

            if !self.options.pagination {
                self.page = self.loaded.clone();
                self.pagination = None;
            } else if self.client_paging {
                self.page = pager.slice(&self.working, self.offset).to_vec();
                self.pagination = Some(pager.metadata(self.rowcount, self.offset));
            } else {
                self.offset = response.offset.unwrap_or(self.offset);
                self.page = self.loaded.clone();
                self.pagination = Some(pager.metadata(self.rowcount, self.offset));
            }
        }

        debug!(
            list = %self.options.log_id,
            source = %kind,
            rowcount = self.rowcount,
            records = self.page.len(),
            "list loaded"
        );
        Ok(self.summary())
    }

    /// Runs the pipeline over the loaded dataset and pages the result.
    fn reprocess(&mut self, pager: Pager) {
        let processed = process(
            &self.loaded,
            &self.options.conditions,
            &self.options.orderby,
            self.options.limit,
            Record::accessor,
        );
        self.condition_errors = processed.errors.clone();
        self.working = processed.cloned();
        self.rowcount = self.working.len();
        self.repage(pager);
    }

    /// Slices the working dataset at the current offset.
    fn repage(&mut self, pager: Pager) {
        if self.options.pagination {
            self.page = pager.slice(&self.working, self.offset).to_vec();
            self.pagination = Some(pager.metadata(self.rowcount, self.offset));
        } else {
            self.page = self.working.clone();
            self.pagination = None;
        }
    }

    fn reset_records(&mut self) {
        self.loaded.clear();
        self.working.clear();
        self.page.clear();
        self.rowcount = 0;
        self.condition_errors.clear();
        self.selection.clear();
        self.pagination = match self.options.pager() {
            Ok(pager) if self.options.pagination => Some(pager.metadata(0, 0)),
            _ => None,
        };
    }

    fn summary(&self) -> Loaded {
        Loaded {
            source: self.last_source,
            records: self.page.len(),
            rowcount: self.rowcount,
            pagination: self.pagination.clone(),
            condition_errors: self.condition_errors.clone(),
        }
    }

    // ========================================================================
    // Changing options and pages
    // ========================================================================

    /// Merges options and re-processes the loaded dataset from page 1,
    /// without fetching.
    pub fn change(&mut self, patch: OptionsPatch) -> Result<Loaded, LoadError> {
        self.options.apply(patch);
        let pager = self.options.pager()?;
        self.selection.clear();
        self.offset = 0;
        self.reprocess(pager);
        debug!(
            list = %self.options.log_id,
            rowcount = self.rowcount,
            "options changed"
        );
        Ok(self.summary())
    }

    /// Moves to a 1-based page.
    ///
    /// Pages outside `1..=totalpages` are ignored and `Ok(false)` is
    /// returned. Locally paged lists slice the working dataset; server-paged
    /// lists fetch the page.
    pub fn change_page(&mut self, page: usize) -> Result<bool, LoadError> {
        let in_range = self
            .pagination
            .as_ref()
            .is_some_and(|pagination| pagination.has_page(page));
        if !in_range {
            debug!(list = %self.options.log_id, page, "page out of range, ignored");
            return Ok(false);
        }
        let pager = self.options.pager()?;
        if self.options.selectable && self.options.pagination_clear_selection {
            self.selection.clear();
        }
        self.offset = pager.offset_of(page);
        self.goto_offset(pager)?;
        Ok(true)
    }

    /// Changes the page size and moves to page 1.
    pub fn set_page_size(&mut self, pagesize: usize) -> Result<(), LoadError> {
        let pager = Pager::new(pagesize, self.options.pages)?;
        self.options.pagesize = pagesize;
        if self.options.selectable && self.options.pagination_clear_selection {
            self.selection.clear();
        }
        self.offset = 0;
        self.goto_offset(pager)
    }

    fn goto_offset(&mut self, pager: Pager) -> Result<(), LoadError> {
        if self.client_paging || self.last_source.is_none() {
            self.repage(pager);
            Ok(())
        } else {
            self.load().map(|_| ())
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Records on the current page.
    pub fn records(&self) -> &[Record] {
        &self.page
    }

    /// The working dataset: every record that passed the pipeline.
    pub fn working_records(&self) -> &[Record] {
        &self.working
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn rowcount(&self) -> usize {
        self.rowcount
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the current page has no records.
    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    /// Conditions that failed during the last pipeline run.
    pub fn condition_errors(&self) -> &[ConditionError] {
        &self.condition_errors
    }

    /// The last transport response, without its records.
    pub fn server_response(&self) -> Option<&ResponseMeta> {
        self.server_response.as_ref()
    }

    pub fn pagination_enabled(&self) -> bool {
        self.options.pagination
    }

    pub fn sort_enabled(&self) -> bool {
        self.options.sortable
    }

    pub fn select_enabled(&self) -> bool {
        self.options.selectable
    }

    pub fn multiselect_enabled(&self) -> bool {
        self.options.selectable && self.options.multiselect
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    pub fn is_sorted_asc(&self, field: &str) -> bool {
        self.sort_dir(field) == Some(Dir::Asc)
    }

    pub fn is_sorted_desc(&self, field: &str) -> bool {
        self.sort_dir(field) == Some(Dir::Desc)
    }

    fn sort_dir(&self, field: &str) -> Option<Dir> {
        self.options
            .orderby
            .iter()
            .find(|order| order.field == field)
            .map(|order| order.dir)
    }

    /// Replaces the ordering. Takes effect on the next load or change.
    pub fn set_orderby(&mut self, orderby: Vec<OrderBy>) {
        self.options.orderby = orderby;
    }

    /// Sets the direction of an ordered field, appending it if absent.
    /// Takes effect on the next load or change.
    pub fn add_orderby(&mut self, order: OrderBy) {
        match self
            .options
            .orderby
            .iter_mut()
            .find(|existing| existing.field == order.field)
        {
            Some(existing) => existing.dir = order.dir,
            None => self.options.orderby.push(order),
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn is_selected(&self, row: usize) -> bool {
        self.selection.is_selected(row)
    }

    /// Flips a row on the current page. Returns `true` if it changed.
    pub fn toggle(&mut self, row: usize) -> bool {
        self.options.selectable
            && self
                .selection
                .toggle(&self.page, row, self.options.multiselect)
    }

    pub fn select(&mut self, row: usize) -> bool {
        self.options.selectable
            && self
                .selection
                .select(&self.page, row, self.options.multiselect)
    }

    pub fn unselect(&mut self, row: usize) -> bool {
        self.options.selectable && self.selection.unselect(&self.page, row)
    }

    /// Selects or unselects every row of the page. Returns the state
    /// applied, or `None` when multiple selection is off.
    pub fn toggle_all(&mut self) -> Option<bool> {
        if !self.multiselect_enabled() {
            return None;
        }
        Some(self.selection.toggle_all(&self.page))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selection.count()
    }

    /// Selected records of the current page, in page order.
    pub fn selected_rows(&self) -> Vec<&Record> {
        self.selection
            .rows()
            .filter_map(|row| self.page.get(row))
            .collect()
    }
}

impl fmt::Debug for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("options", &self.options)
            .field("transport", &self.transport.as_ref().map(|t| t.name()))
            .field("rowcount", &self.rowcount)
            .field("offset", &self.offset)
            .field("client_paging", &self.client_paging)
            .field("pagination", &self.pagination)
            .field("selection", &self.selection)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbered(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                let mut record = Record::new();
                record.insert("n".to_string(), json!(i));
                record
            })
            .collect()
    }

    fn ns(records: &[Record]) -> Vec<u64> {
        records.iter().filter_map(|r| r["n"].as_u64()).collect()
    }

    #[test]
    fn inline_load_pages_locally() {
        let mut list = ListView::new(ListOptions::inline(numbered(23)));
        let loaded = list.load().unwrap();
        assert_eq!(loaded.source, Some(SourceKind::Inline));
        assert_eq!(loaded.records, 10);
        assert_eq!(loaded.rowcount, 23);
        assert_eq!(list.pagination().unwrap().totalpages, 3);
        assert_eq!(ns(list.records()), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn no_source_leaves_state_untouched() {
        let mut list = ListView::new(ListOptions::default());
        assert!(matches!(list.load(), Err(LoadError::NoDataSource)));
        assert!(list.is_empty());
        assert!(list.pagination().is_none());
    }

    #[test]
    fn zero_page_size_fails_before_fetching() {
        let options = ListOptions {
            pagesize: 0,
            ..ListOptions::inline(numbered(3))
        };
        let mut list = ListView::new(options);
        assert!(matches!(list.load(), Err(LoadError::Paging(_))));
    }

    #[test]
    fn stale_ticket_is_superseded() {
        let mut list = ListView::new(ListOptions::inline(numbered(3)));
        let first = list.begin_load().unwrap();
        let second = list.begin_load().unwrap();
        assert!(second.ticket().generation() > first.ticket().generation());

        let stale = first.fetch();
        assert!(matches!(
            list.complete_load(first.ticket(), stale),
            Err(LoadError::Superseded)
        ));
        assert!(list.is_empty());

        let fresh = second.fetch();
        assert_eq!(list.complete_load(second.ticket(), fresh).unwrap().rowcount, 3);
    }

    #[test]
    fn ordering_helpers() {
        let mut list = ListView::new(ListOptions::default());
        list.add_orderby(OrderBy::asc("name"));
        list.add_orderby(OrderBy::desc("age"));
        list.add_orderby(OrderBy::desc("name"));
        assert_eq!(
            list.options().orderby,
            vec![OrderBy::desc("name"), OrderBy::desc("age")]
        );
        assert!(list.is_sorted_desc("name"));
        assert!(!list.is_sorted_asc("name"));
        assert!(!list.is_sorted_asc("missing"));
        list.set_orderby(vec![OrderBy::asc("id")]);
        assert!(list.is_sorted_asc("id"));
        assert!(!list.is_sorted_desc("age"));
    }

    #[test]
    fn flags() {
        let list = ListView::new(ListOptions {
            selectable: false,
            ..ListOptions::default()
        });
        assert!(!list.select_enabled());
        assert!(!list.multiselect_enabled());
        assert!(list.sort_enabled());
        assert!(list.pagination_enabled());
    }
}
