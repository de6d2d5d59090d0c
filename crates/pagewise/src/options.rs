//! List options and option patches.
//!
//! [`ListOptions`] is the full configuration of a list: where its data comes
//! from, how it is filtered, sorted and paged, and whether rows can be
//! selected. Options are plain values; [`ListOptions::with`] merges an
//! [`OptionsPatch`] and returns the result, leaving the original untouched.
//!
//! Options read from JSON or YAML. Keys use snake case; the camel-case
//! spellings `jsonFile`, `listURL` and `paginationOnClient` are accepted as
//! aliases.

use std::fs;
use std::path::Path;

use pagewise_query::{Condition, OrderBy, Pager, QueryError, Record};
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// HTTP method a transport should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// Configuration of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Inline records. Takes precedence over every other source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,
    /// Path of a JSON file holding an array of records.
    #[serde(alias = "jsonFile", skip_serializing_if = "Option::is_none")]
    pub json_file: Option<String>,
    /// Address handed to the transport.
    #[serde(alias = "listURL", skip_serializing_if = "Option::is_none")]
    pub list_url: Option<String>,
    pub selectable: bool,
    pub multiselect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(rename = "where")]
    pub conditions: Vec<Condition>,
    pub sortable: bool,
    pub orderby: Vec<OrderBy>,
    pub pagination: bool,
    /// Slice pages locally even when records come from a transport.
    #[serde(alias = "paginationOnClient")]
    pub pagination_on_client: bool,
    /// Clear the selection when the page changes.
    pub pagination_clear_selection: bool,
    pub pagesize: usize,
    /// Width of the page-number window.
    pub pages: usize,
    pub method: Method,
    pub urlencoded: bool,
    /// Identifier attached to every log event of the list.
    pub log_id: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            data: None,
            json_file: None,
            list_url: None,
            selectable: true,
            multiselect: true,
            limit: None,
            conditions: Vec::new(),
            sortable: true,
            orderby: Vec::new(),
            pagination: true,
            pagination_on_client: false,
            pagination_clear_selection: true,
            pagesize: 10,
            pages: 5,
            method: Method::Get,
            urlencoded: true,
            log_id: "FL".to_string(),
        }
    }
}

impl ListOptions {
    /// Options for a list over inline records.
    pub fn inline(data: Vec<Record>) -> Self {
        ListOptions {
            data: Some(data),
            ..ListOptions::default()
        }
    }

    /// Options for a list over a JSON file.
    pub fn json_file(path: impl Into<String>) -> Self {
        ListOptions {
            json_file: Some(path.into()),
            ..ListOptions::default()
        }
    }

    /// Parses options from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses options from a YAML string.
    pub fn from_yaml_str(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Reads options from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> Result<Self, OptionsError> {
        let content = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(OptionsError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Returns a copy of these options with the patch applied.
    pub fn with(&self, patch: OptionsPatch) -> Self {
        let mut merged = self.clone();
        merged.apply(patch);
        merged
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: OptionsPatch) {
        let OptionsPatch {
            data,
            json_file,
            list_url,
            selectable,
            multiselect,
            limit,
            conditions,
            sortable,
            orderby,
            pagination,
            pagination_on_client,
            pagination_clear_selection,
            pagesize,
            pages,
            method,
            urlencoded,
            log_id,
        } = patch;

        if let Some(data) = data {
            self.data = Some(data);
        }
        if let Some(json_file) = json_file {
            self.json_file = Some(json_file);
        }
        if let Some(list_url) = list_url {
            self.list_url = Some(list_url);
        }
        if let Some(limit) = limit {
            self.limit = Some(limit).filter(|n| *n > 0);
        }
        if let Some(conditions) = conditions {
            self.conditions = conditions;
        }
        if let Some(orderby) = orderby {
            self.orderby = orderby;
        }
        if let Some(method) = method {
            self.method = method;
        }
        if let Some(log_id) = log_id {
            self.log_id = log_id;
        }
        merge(&mut self.selectable, selectable);
        merge(&mut self.multiselect, multiselect);
        merge(&mut self.sortable, sortable);
        merge(&mut self.pagination, pagination);
        merge(&mut self.pagination_on_client, pagination_on_client);
        merge(&mut self.pagination_clear_selection, pagination_clear_selection);
        merge(&mut self.pagesize, pagesize);
        merge(&mut self.pages, pages);
        merge(&mut self.urlencoded, urlencoded);
    }

    /// Builds the pager for the configured page size and window.
    pub fn pager(&self) -> Result<Pager, QueryError> {
        Pager::new(self.pagesize, self.pages)
    }
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Optional overrides for [`ListOptions`].
///
/// Every field left as `None` keeps the current value. A patch is also
/// deserializable, so a partial options document can be merged over a base.
/// A `limit` of zero clears the limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,
    #[serde(alias = "jsonFile", skip_serializing_if = "Option::is_none")]
    pub json_file: Option<String>,
    #[serde(alias = "listURL", skip_serializing_if = "Option::is_none")]
    pub list_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiselect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<Vec<OrderBy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<bool>,
    #[serde(alias = "paginationOnClient", skip_serializing_if = "Option::is_none")]
    pub pagination_on_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_clear_selection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagesize: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urlencoded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
}

impl OptionsPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        OptionsPatch::default()
    }

    /// Replaces the where-clause.
    pub fn conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Replaces the ordering.
    pub fn orderby(mut self, orderby: Vec<OrderBy>) -> Self {
        self.orderby = Some(orderby);
        self
    }

    /// Sets the limit. Zero clears it.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the page size.
    pub fn pagesize(mut self, pagesize: usize) -> Self {
        self.pagesize = Some(pagesize);
        self
    }

    /// Sets the page-number window.
    pub fn pages(mut self, pages: usize) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Enables or disables paging.
    pub fn pagination(mut self, enabled: bool) -> Self {
        self.pagination = Some(enabled);
        self
    }

    /// Enables or disables multiple selection.
    pub fn multiselect(mut self, enabled: bool) -> Self {
        self.multiselect = Some(enabled);
        self
    }
}
