//! `pagewise`: filter, sort and page a JSON file of records.

mod cli;
mod output;

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pagewise::{ListOptions, ListView};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::output::{render, PageDocument};

const LOG_ENV: &str = "PAGEWISE_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so structured output on stdout stays parseable.
fn init_logging(cli: &Cli) {
    let filter = match cli.log_level() {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ListOptions::from_path(path)
            .with_context(|| format!("reading options from '{}'", path.display()))?,
        None => ListOptions::default(),
    };
    let options = cli.apply_to(base);
    debug!(?options, "resolved options");

    let mut list = ListView::new(options);
    let loaded = list.load().context("loading records")?;
    debug!(
        records = loaded.records,
        rowcount = loaded.rowcount,
        "loaded"
    );

    if cli.page != 1 && !list.change_page(cli.page).context("changing page")? {
        let last = list.pagination().map_or(0, |p| p.totalpages);
        warn!(page = cli.page, last, "page out of range, showing the first page");
    }

    let document = PageDocument {
        records: list.records(),
        pagination: list.pagination(),
        errors: list
            .condition_errors()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    let rendered = render(&document, cli.output).context("rendering output")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("writing output")?;
    Ok(())
}
