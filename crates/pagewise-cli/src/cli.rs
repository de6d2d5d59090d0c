//! Command-line arguments and how they map onto [`ListOptions`].

use std::path::PathBuf;

use clap::Parser;
use pagewise::{Condition, ListOptions, OptionsPatch, OrderBy};
use tracing::level_filters::LevelFilter;

use crate::output::OutputFormat;

/// Filter, sort and page a JSON file of records.
#[derive(Debug, Parser)]
#[command(name = "pagewise", version, about)]
#[command(after_help = "Conditions are written field:op[:value[:option]], e.g.\n  \
    --where age:ge:18 --where name:like_b:smith:i --where email:is_not_null\n\n\
    Operators: eq ne gt ge lt le like_l like_r like_b regexp is_null is_not_null")]
pub struct Cli {
    /// JSON file holding the records, or a server response with a `records` array
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Options file (.json, .yaml or .yml) applied before the flags below
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep records matching a condition (repeatable, all must match)
    #[arg(short = 'w', long = "where", value_name = "CONDITION")]
    pub conditions: Vec<Condition>,

    /// Sort by a field, `field` or `field:desc`
    #[arg(short, long = "order", value_name = "FIELD[:DIR]")]
    pub order: Option<OrderBy>,

    /// Keep at most N records after sorting (0 removes the limit)
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Page to show, starting at 1
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub page: usize,

    /// Records per page
    #[arg(short = 's', long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Width of the page number window
    #[arg(long, value_name = "N")]
    pub pages: Option<usize>,

    /// Print every matching record instead of one page
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(short = 'O', long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log level forced by `-v`/`-q`, if any.
    pub fn log_level(&self) -> Option<LevelFilter> {
        match (self.quiet, self.verbose) {
            (true, _) => Some(LevelFilter::ERROR),
            (false, 0) => None,
            (false, 1) => Some(LevelFilter::DEBUG),
            (false, _) => Some(LevelFilter::TRACE),
        }
    }

    /// Layers the flags over a base set of options.
    ///
    /// `FILE` replaces any data source from the base. Conditions are appended
    /// to the base where-clause; `--order` replaces its ordering.
    pub fn apply_to(&self, mut options: ListOptions) -> ListOptions {
        if let Some(file) = &self.file {
            options.data = None;
            options.json_file = Some(file.to_string_lossy().into_owned());
        }

        let mut patch = OptionsPatch::new();
        if !self.conditions.is_empty() {
            let mut conditions = options.conditions.clone();
            conditions.extend(self.conditions.iter().cloned());
            patch = patch.conditions(conditions);
        }
        if let Some(order) = &self.order {
            patch = patch.orderby(vec![order.clone()]);
        }
        if let Some(limit) = self.limit {
            patch = patch.limit(limit);
        }
        if let Some(pagesize) = self.page_size {
            patch = patch.pagesize(pagesize);
        }
        if let Some(pages) = self.pages {
            patch = patch.pages(pages);
        }
        if self.all {
            patch = patch.pagination(false);
        }
        options.apply(patch);
        options
    }
}
