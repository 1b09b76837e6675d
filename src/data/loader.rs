use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};

use super::model::{Dataset, Record};
use crate::error::{Result, SimtabError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How input lines are split and which lines are ignored.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Single-byte field delimiter; `None` splits on runs of whitespace.
    pub delimiter: Option<u8>,
    /// Lines whose first non-blank text starts with this prefix are ignored.
    pub comment: Option<String>,
    /// Drop malformed lines (and report them) instead of failing the load.
    pub skip_malformed: bool,
}

/// A loaded dataset plus the lines that were skipped as malformed.
#[derive(Debug)]
pub struct Loaded {
    pub dataset: Dataset,
    pub skipped: Vec<SimtabError>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file. The handle is dropped on every return path.
pub fn load_path(path: &Path, opts: &LoadOptions) -> Result<Loaded> {
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| SimtabError::Io {
        source_name: source_name.clone(),
        source,
    })?;
    load_reader(BufReader::new(file), &source_name, opts)
}

/// Load a dataset from any reader (stdin, in-memory buffers, ...).
pub fn load_reader<R: Read>(reader: R, source_name: &str, opts: &LoadOptions) -> Result<Loaded> {
    let loaded = match opts.delimiter {
        None => load_whitespace(BufReader::new(reader), source_name, opts)?,
        Some(delim) => load_delimited(reader, delim, source_name, opts)?,
    };
    info!(
        "loaded {} records from {} ({} malformed lines skipped)",
        loaded.dataset.len(),
        source_name,
        loaded.skipped.len()
    );
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Whitespace-split loader
// ---------------------------------------------------------------------------

fn load_whitespace<R: BufRead>(mut reader: R, source_name: &str, opts: &LoadOptions) -> Result<Loaded> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| SimtabError::Io {
                source_name: source_name.to_string(),
                source,
            })?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let text = match std::str::from_utf8(&buf) {
            Ok(t) => t,
            Err(e) => {
                let err = SimtabError::Parse {
                    source_name: source_name.to_string(),
                    line: line_no,
                    reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
                };
                reject(err, opts, &mut skipped)?;
                continue;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() || is_comment(trimmed, opts) {
            continue;
        }
        let fields = trimmed.split_whitespace().map(str::to_string).collect();
        records.push(Record::new(line_no, fields));
    }

    debug!("{source_name}: {line_no} lines scanned");
    Ok(Loaded {
        dataset: Dataset::new(source_name, records),
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Delimiter-split loader
// ---------------------------------------------------------------------------

/// Single-byte delimiters go through the `csv` reader: no header row, ragged
/// rows allowed, fields trimmed.
fn load_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
    opts: &LoadOptions,
) -> Result<Loaded> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut raw = csv::ByteRecord::new();

    loop {
        match rdr.read_byte_record(&mut raw) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                match e.into_kind() {
                    csv::ErrorKind::Io(source) => {
                        return Err(SimtabError::Io {
                            source_name: source_name.to_string(),
                            source,
                        })
                    }
                    kind => {
                        let err = SimtabError::Parse {
                            source_name: source_name.to_string(),
                            line,
                            reason: format!("{kind:?}"),
                        };
                        reject(err, opts, &mut skipped)?;
                        continue;
                    }
                }
            }
        }

        let line = raw.position().map(|p| p.line() as usize).unwrap_or(0);
        let fields: std::result::Result<Vec<String>, _> = raw
            .iter()
            .map(|f| std::str::from_utf8(f).map(str::to_string))
            .collect();
        let fields = match fields {
            Ok(f) => f,
            Err(e) => {
                let err = SimtabError::Parse {
                    source_name: source_name.to_string(),
                    line,
                    reason: format!("invalid UTF-8: {e}"),
                };
                reject(err, opts, &mut skipped)?;
                continue;
            }
        };

        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if fields.first().is_some_and(|f| is_comment(f, opts)) {
            continue;
        }
        records.push(Record::new(line, fields));
    }

    Ok(Loaded {
        dataset: Dataset::new(source_name, records),
        skipped,
    })
}

// -- helpers --

fn is_comment(text: &str, opts: &LoadOptions) -> bool {
    opts.comment
        .as_deref()
        .is_some_and(|prefix| !prefix.is_empty() && text.starts_with(prefix))
}

/// Record a malformed line in skip mode, otherwise fail the load with it.
fn reject(err: SimtabError, opts: &LoadOptions, skipped: &mut Vec<SimtabError>) -> Result<()> {
    if opts.skip_malformed {
        warn!("skipping {err}");
        skipped.push(err);
        Ok(())
    } else {
        Err(err)
    }
}
