use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::aggregate::{aggregate, aggregate_grouped, AggregateResult};
use crate::config::RunConfig;
use crate::data::filter::filter;
use crate::data::loader::{load_path, load_reader, Loaded};
use crate::error::DomainError;
use crate::format::{format, format_grouped, to_json};

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Rendered output of one invocation plus what went wrong along the way.
#[derive(Debug)]
pub struct RunOutcome {
    pub text: String,
    /// Values that could not be computed; the rest of `text` is valid.
    pub failures: Vec<DomainError>,
    /// Malformed input lines dropped in skip mode.
    pub skipped_lines: usize,
}

// ---------------------------------------------------------------------------
// Pipeline: load → filter → aggregate → format
// ---------------------------------------------------------------------------

/// Run the whole pipeline on `input` (stdin when `None` or `-`).
pub fn run(config: &RunConfig, input: Option<&Path>) -> Result<RunOutcome> {
    let opts = config.load_options()?;
    let spec = config.aggregation_spec()?;
    let template = config.template()?;

    let Loaded { dataset, skipped } = match input.filter(|p| *p != Path::new("-")) {
        Some(path) => load_path(path, &opts)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("reading standard input")?;
            load_reader(buf.as_slice(), "-", &opts)?
        }
    };

    let selection = config.filter();
    let filtered = filter(&dataset, &selection);
    info!(
        "{}: {} of {} records pass [{}]",
        dataset.source,
        filtered.len(),
        dataset.len(),
        selection
    );

    let (text, failures) = match config.group_by {
        Some(key) => {
            let groups = aggregate_grouped(&filtered, key, &spec)?;
            info!("{} groups by column {key}", groups.len());
            let failures: Vec<DomainError> =
                groups.iter().flat_map(|(_, r)| collect_failures(r)).collect();
            let text = if config.json {
                to_json(&groups)?
            } else {
                format_grouped(&groups, &template)?
            };
            (text, failures)
        }
        None => {
            let result = aggregate(&filtered, &spec)?;
            let failures = collect_failures(&result);
            let text = if config.json {
                to_json(&result)?
            } else {
                format(&result, &template)?
            };
            (text, failures)
        }
    };

    if !failures.is_empty() {
        debug!("{}: {} domain failures", dataset.source, failures.len());
    }

    Ok(RunOutcome {
        text,
        failures,
        skipped_lines: skipped.len(),
    })
}

fn collect_failures(result: &AggregateResult) -> Vec<DomainError> {
    result.failures().into_iter().cloned().collect()
}
