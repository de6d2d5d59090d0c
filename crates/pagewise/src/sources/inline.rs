//! In-memory records.

use std::sync::Arc;

use pagewise_query::Record;

use crate::error::LoadError;
use crate::source::{DataSource, FetchRequest, FetchResponse};

/// Serves records held in memory.
///
/// The dataset is shared, so cloning the source or fetching from it does not
/// copy the records until a response is built.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    records: Arc<Vec<Record>>,
}

impl InlineSource {
    /// Creates a source over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Number of records served.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for InlineSource {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl DataSource for InlineSource {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn fetch(&self, _request: &FetchRequest) -> Result<FetchResponse, LoadError> {
        Ok(FetchResponse::from_records(self.records.as_ref().clone()))
    }
}
