//! Error types for list loading and option files.

use std::io;
use std::path::PathBuf;

use pagewise_query::QueryError;

/// Errors that can occur while loading a list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The options name no inline data, no JSON file and no transport.
    #[error("no data source configured")]
    NoDataSource,

    /// A data file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data file or response body is not valid JSON.
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    /// The source answered with an error, or the transport failed.
    #[error("load rejected: {reason}")]
    Rejected { reason: String },

    /// A newer load was started before this one completed.
    #[error("load superseded by a newer request")]
    Superseded,

    /// The page size or page window is zero.
    #[error("invalid paging options: {0}")]
    Paging(#[from] QueryError),
}

impl LoadError {
    /// Create a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether a failed load of this kind resets the loaded records.
    ///
    /// Configuration errors and stale completions leave the list untouched.
    pub fn resets_records(&self) -> bool {
        !matches!(
            self,
            LoadError::NoDataSource | LoadError::Superseded | LoadError::Paging(_)
        )
    }
}

/// Errors that can occur while reading list options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// The options file could not be read.
    #[error("failed to read options file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The options are not valid JSON.
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),

    /// The options are not valid YAML.
    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The options file extension is neither JSON nor YAML.
    #[error("unsupported options format '{}': expected .json, .yaml or .yml", .0.display())]
    UnsupportedFormat(PathBuf),
}
