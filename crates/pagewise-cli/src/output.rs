//! Output rendering for a page of records.
//!
//! Text output is an aligned table followed by a pagination footer. JSON and
//! YAML serialize the page, its pagination and any condition errors. XML
//! wraps the records in a `<page>` root. CSV writes the records only, one
//! column per field.

use clap::ValueEnum;
use pagewise::{Pagination, Record};
use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table with a pagination footer
    #[default]
    Text,
    Json,
    Yaml,
    Csv,
    Xml,
}

/// Errors that can occur while rendering output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

/// One rendered page.
#[derive(Debug, Serialize)]
#[serde(rename = "page")]
pub struct PageDocument<'a> {
    #[serde(rename = "record")]
    pub records: &'a [Record],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<&'a Pagination>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    records: &'a [Record],
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<&'a Pagination>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    errors: &'a [String],
}

/// Renders a page in the given format.
pub fn render(document: &PageDocument<'_>, format: OutputFormat) -> Result<String, OutputError> {
    let plain = JsonDocument {
        records: document.records,
        pagination: document.pagination,
        errors: &document.errors,
    };
    match format {
        OutputFormat::Text => Ok(render_text(document)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&plain)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&plain)?),
        OutputFormat::Xml => Ok(quick_xml::se::to_string(document)? + "\n"),
        OutputFormat::Csv => render_csv(document.records),
    }
}

/// Column names in first-seen order across the page.
fn columns(records: &[Record]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    columns
}

fn render_csv(records: &[Record]) -> Result<String, OutputError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let headers = columns(records);
    if !headers.is_empty() {
        wtr.write_record(&headers)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&row)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| OutputError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Csv(e.to_string()))
}

fn render_text(document: &PageDocument<'_>) -> String {
    let mut out = String::new();
    let headers = columns(document.records);

    if headers.is_empty() {
        out.push_str("(no records)\n");
    } else {
        let rows: Vec<Vec<String>> = document
            .records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(*h).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        push_row(&mut out, headers.iter().copied(), &widths);
        for row in &rows {
            push_row(&mut out, row.iter().map(String::as_str), &widths);
        }
    }

    if let Some(pagination) = document.pagination {
        out.push('\n');
        out.push_str(&footer(pagination));
        out.push('\n');
    }
    for error in &document.errors {
        out.push_str("warning: ");
        out.push_str(error);
        out.push('\n');
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// `records 11-20 of 95 | page 2/10 | [1] 2 [3] ...` style footer.
fn footer(pagination: &Pagination) -> String {
    let pages: Vec<String> = pagination
        .pages
        .iter()
        .map(|page| {
            if *page == pagination.currpage {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    format!(
        "records {}-{} of {} | page {}/{} | {}",
        pagination.firstrec,
        pagination.lastrec,
        pagination.rowcount,
        pagination.currpage,
        pagination.totalpages,
        pages.join(" ")
    )
}

/// Converts a field value to a table or CSV cell.
fn cell(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}
