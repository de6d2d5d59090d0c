//! Data source trait and the fetch request/response shapes.
//!
//! A [`DataSource`] is anything that can turn a [`FetchRequest`] into a
//! [`FetchResponse`]: inline records, a JSON file, or a transport that talks
//! to a server. Transports are left to the embedding application; any
//! closure of the right shape is a source.

use std::sync::Arc;

use pagewise_query::{Condition, OrderBy, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::LoadError;
use crate::options::{ListOptions, Method};

/// A source of records for a list.
///
/// # Implementation Guidelines
///
/// - [`fetch`](Self::fetch) returns `Err` for transport failures. A source
///   that talks to a server may also return `Ok` with a response whose
///   `result` is `"ERROR"`; the list treats both as a failed load.
/// - Sources that serve a whole dataset ignore the request; the list applies
///   the where-clause, ordering, limit and paging itself.
///
/// # Example
///
/// ```
/// use pagewise::{DataSource, FetchRequest, FetchResponse, LoadError};
///
/// struct Empty;
///
/// impl DataSource for Empty {
///     fn name(&self) -> &'static str { "empty" }
///
///     fn fetch(&self, _: &FetchRequest) -> Result<FetchResponse, LoadError> {
///         Ok(FetchResponse::default())
///     }
/// }
/// ```
pub trait DataSource: Send + Sync {
    /// Human-readable name for this source, used in log events.
    fn name(&self) -> &'static str;

    /// Fetches records for the given request.
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, LoadError>;
}

impl<F> DataSource for F
where
    F: Fn(&FetchRequest) -> Result<FetchResponse, LoadError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        "transport"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, LoadError> {
        self(request)
    }
}

/// Runs a source on tokio's blocking pool.
///
/// Sources are synchronous; this lets async callers await a fetch without
/// stalling the runtime.
pub async fn fetch_blocking(
    source: Arc<dyn DataSource>,
    request: FetchRequest,
) -> Result<FetchResponse, LoadError> {
    let name = source.name();
    tokio::task::spawn_blocking(move || source.fetch(&request))
        .await
        .map_err(|error| {
            tracing::warn!(%error, source = name, "fetch task failed");
            LoadError::rejected(format!("fetch task failed: {error}"))
        })?
}

/// Parameters sent to a source.
///
/// Serializes to the body a server expects: `where`, `orderby`, `limit` when
/// set, and `offset`/`pagesize` when the server does the paging. The target
/// address, method and encoding travel alongside but are not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    #[serde(rename = "where")]
    pub conditions: Vec<Condition>,
    pub orderby: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagesize: Option<usize>,
    #[serde(skip)]
    pub url: Option<String>,
    #[serde(skip)]
    pub method: Method,
    #[serde(skip)]
    pub urlencoded: bool,
}

impl FetchRequest {
    /// Builds a request from list options.
    ///
    /// `offset` is only included when paging happens on the server.
    pub fn from_options(options: &ListOptions, offset: usize, server_paging: bool) -> Self {
        let paged = options.pagination && server_paging;
        FetchRequest {
            conditions: options.conditions.clone(),
            orderby: options.orderby.clone(),
            limit: options.limit,
            offset: paged.then_some(offset),
            pagesize: paged.then_some(options.pagesize),
            url: options.list_url.clone(),
            method: options.method,
            urlencoded: options.urlencoded,
        }
    }

    /// Serializes the request body as JSON.
    pub fn to_json(&self) -> Json {
        // Conditions, orderings and integers always serialize.
        serde_json::to_value(self).unwrap_or(Json::Null)
    }
}

/// Response returned by a source.
///
/// Deserializes from a server body. Fields a list does not know about are
/// kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowcount: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Ordering the server actually applied; replaces the list's ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderby: Option<Vec<OrderBy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl FetchResponse {
    /// A successful response carrying a whole dataset.
    pub fn from_records(records: Vec<Record>) -> Self {
        FetchResponse {
            rowcount: Some(records.len()),
            records,
            ..FetchResponse::default()
        }
    }

    /// Total number of rows; defaults to the number of records returned.
    pub fn rowcount(&self) -> usize {
        self.rowcount.unwrap_or(self.records.len())
    }

    /// Whether the server marked this response as failed.
    pub fn is_error(&self) -> bool {
        self.result.as_deref() == Some("ERROR")
    }

    /// Turns an error response into a [`LoadError::Rejected`].
    pub fn into_result(self) -> Result<Self, LoadError> {
        if self.is_error() {
            let reason = self.message.clone().unwrap_or_else(|| "ERROR".to_string());
            return Err(LoadError::rejected(reason));
        }
        Ok(self)
    }

    /// Everything except the records.
    pub fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            records: self.records.len(),
            rowcount: self.rowcount,
            offset: self.offset,
            orderby: self.orderby.clone(),
            result: self.result.clone(),
            message: self.message.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// The last response of a transport, without its records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseMeta {
    /// Number of records the response carried.
    pub records: usize,
    pub rowcount: Option<usize>,
    pub offset: Option<usize>,
    pub orderby: Option<Vec<OrderBy>>,
    pub result: Option<String>,
    pub message: Option<String>,
    pub extra: Map<String, Json>,
}
