//! # Pagewise - Paged record lists
//!
//! Pagewise drives a list of records the way a data table does: it loads a
//! dataset from inline records, a JSON file or a server transport, filters,
//! sorts and limits it, shows one page at a time with a sliding window of
//! page numbers, and keeps track of selected rows.
//!
//! The query pipeline lives in the [`query`] crate and is re-exported here.
//!
//! ## Core Concepts
//!
//! - [`ListOptions`]: Where data comes from and how it is shown
//! - [`ListView`]: The controller that loads, pages and selects
//! - [`DataSource`]: Anything that answers a [`FetchRequest`]
//! - [`LoadTicket`]: Identifies the latest load; older loads are discarded
//!
//! ## Quick Start
//!
//! ```rust
//! use pagewise::{ListOptions, ListView, OptionsPatch, OrderBy, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = serde_json::from_value(json!([
//!     {"name": "ada", "year": 1815},
//!     {"name": "grace", "year": 1906},
//!     {"name": "alan", "year": 1912},
//! ])).unwrap();
//!
//! let mut list = ListView::new(ListOptions::inline(records));
//! list.load().unwrap();
//! assert_eq!(list.records().len(), 3);
//!
//! list.change(OptionsPatch::new().orderby(vec![OrderBy::desc("year")]).pagesize(2))
//!     .unwrap();
//! assert_eq!(list.records()[0]["name"], "alan");
//! assert_eq!(list.pagination().unwrap().totalpages, 2);
//! ```
//!
//! ## Server Transports
//!
//! A transport is any [`DataSource`]. Closures qualify:
//!
//! ```rust
//! use pagewise::{FetchRequest, FetchResponse, ListOptions, ListView, LoadError};
//!
//! let transport = |request: &FetchRequest| -> Result<FetchResponse, LoadError> {
//!     // Send `request.to_json()` to the server and parse its reply.
//!     Ok(FetchResponse { rowcount: Some(0), offset: request.offset, ..Default::default() })
//! };
//! let mut list = ListView::new(ListOptions::default()).with_transport(transport);
//! assert!(list.load().is_ok());
//! ```

mod error;
mod list;
mod options;
mod selection;
mod source;
pub mod sources;

pub use error::{LoadError, OptionsError};
pub use list::{ListView, LoadTicket, Loaded, PendingLoad, SourceKind};
pub use options::{ListOptions, Method, OptionsPatch};
pub use selection::{is_readonly, Selection};
pub use source::{fetch_blocking, DataSource, FetchRequest, FetchResponse, ResponseMeta};
pub use sources::{InlineSource, JsonFileSource};

// Re-export the query pipeline
pub use pagewise_query as query;
pub use pagewise_query::{
    Condition, ConditionError, Dir, Op, OrderBy, Pager, Pagination, Query, Record, Seekable,
    Value,
};
