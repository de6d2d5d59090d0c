//! pagewise-query - Filter, sort, limit and paginate record collections.
//!
//! The crate implements the query half of a paged list: a where-clause of
//! field conditions, a single-key stable sort, a leading-records limit and a
//! page slicer with a sliding page-number window. Records are read through an
//! accessor function, so the same pipeline works over JSON records and over
//! typed structs that implement [`Seekable`].
//!
//! # Quick Start
//!
//! ```rust
//! use pagewise_query::{Pager, Query, Record, Seekable};
//! use serde_json::json;
//!
//! let records: Vec<Record> = serde_json::from_value(json!([
//!     {"name": "alpha", "size": 3},
//!     {"name": "beta", "size": 12},
//!     {"name": "gamma", "size": 7},
//!     {"name": "delta"},
//! ])).unwrap();
//!
//! let query = Query::new()
//!     .and_gt("size", 2)
//!     .order_desc("size")
//!     .build();
//!
//! let working = query.process(&records, Record::accessor);
//! assert_eq!(working.len(), 3);
//!
//! let pager = Pager::new(2, 5).unwrap();
//! let page = pager.slice(&working, 0);
//! let meta = pager.metadata(working.len(), 0);
//! assert_eq!(page[0]["name"], "beta");
//! assert_eq!(meta.totalpages, 2);
//! assert_eq!(meta.pages, vec![1, 2]);
//! ```
//!
//! # Evaluation Semantics
//!
//! Conditions are ANDed, left to right. Evaluation fails open:
//!
//! - a record whose field is absent or null passes every operator except
//!   `is_not_null`
//! - a condition without a pattern passes
//! - an unknown operator or a regular expression that does not compile lets
//!   every record pass; the error is logged and returned in
//!   [`Processed::errors`]
//!
//! # Operators
//!
//! | Wire name | Meaning |
//! |-----------|---------|
//! | `eq`, `ne` | loose equality (`"5"` equals `5`), optional case folding |
//! | `gt`, `ge`, `lt`, `le` | numeric or lexical comparison |
//! | `like_r`, `like_l`, `like_b` | starts with, ends with, contains |
//! | `is_null`, `is_not_null` | absent, null or empty string |
//! | `regexp` | regular expression with `imsxU` flags |

mod condition;
mod error;
mod op;
mod ordering;
mod page;
mod pipeline;
mod query;
mod traits;
mod value;

// Re-export public API
pub use condition::{evaluate, Condition, ConditionOption, Pattern, PreparedCondition};
pub use error::{ConditionError, QueryError, Result};
pub use op::{Op, Operator};
pub use ordering::{compare_values, Dir, OrderBy};
pub use page::{compute_metadata, page_slice, Pager, Pagination};
pub use pipeline::{filter, filter_report, limit, process, sort, Processed};
pub use query::Query;
pub use traits::{Record, Seekable};
pub use value::{Number, Value};
