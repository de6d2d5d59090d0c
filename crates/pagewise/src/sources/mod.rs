//! Built-in data sources.
//!
//! - [`InlineSource`] - Serve records held in memory
//! - [`JsonFileSource`] - Read an array of records from a JSON file
//!
//! Both serve a whole dataset, so lists using them always page locally.
//! Server transports implement [`DataSource`](crate::DataSource) directly.

mod inline;
mod json_file;

pub use inline::InlineSource;
pub use json_file::JsonFileSource;
