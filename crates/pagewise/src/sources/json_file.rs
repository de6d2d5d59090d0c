//! Records read from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use pagewise_query::Record;
use serde::Deserialize;

use crate::error::LoadError;
use crate::source::{DataSource, FetchRequest, FetchResponse};

/// Reads a dataset from a JSON file on every fetch.
///
/// The file holds either an array of records or a response object with a
/// `records` array. A file containing `null` yields an empty dataset.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileContent {
    Records(Vec<Record>),
    Response(FetchResponse),
    Null(()),
}

impl JsonFileSource {
    /// Creates a source reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses file content.
    pub fn parse(content: &str) -> Result<FetchResponse, LoadError> {
        let response = match serde_json::from_str(content)? {
            FileContent::Records(records) => FetchResponse::from_records(records),
            FileContent::Response(response) => response,
            FileContent::Null(()) => FetchResponse::default(),
        };
        response.into_result()
    }
}

impl DataSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn fetch(&self, _request: &FetchRequest) -> Result<FetchResponse, LoadError> {
        let content = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ListOptions;

    fn request() -> FetchRequest {
        FetchRequest::from_options(&ListOptions::default(), 0, false)
    }

    #[test]
    fn reads_record_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        fs::write(&path, r#"[{"name": "Ann"}, {"name": "Bob"}]"#).unwrap();

        let response = JsonFileSource::new(&path).fetch(&request()).unwrap();
        assert_eq!(response.rowcount(), 2);
        assert_eq!(response.records[1]["name"], "Bob");
    }

    #[test]
    fn reads_response_object() {
        let response =
            JsonFileSource::parse(r#"{"records": [{"a": 1}], "rowcount": 40}"#).unwrap();
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.rowcount(), 40);
    }

    #[test]
    fn null_is_empty() {
        assert!(JsonFileSource::parse("null").unwrap().records.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("nope.json"));
        assert!(matches!(source.fetch(&request()), Err(LoadError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_json_error() {
        assert!(matches!(
            JsonFileSource::parse("[{\"a\": 1"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn error_object_is_rejected() {
        assert!(matches!(
            JsonFileSource::parse(r#"{"result": "ERROR"}"#),
            Err(LoadError::Rejected { .. })
        ));
    }
}
