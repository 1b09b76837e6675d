use std::fmt;

use crate::error::{Result, SimtabError};

// ---------------------------------------------------------------------------
// Numeric parsing
// ---------------------------------------------------------------------------

/// Parse a field as a finite `f64`, accepting Fortran-style `D` exponents
/// (`1.234D+03`) as printed by many quantum-chemistry codes. Tokens such as
/// `nan`, `inf` or `1e999` are not numbers here.
pub fn parse_number(s: &str) -> Option<f64> {
    let v = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) if s.contains(['D', 'd']) => s.replace(['D', 'd'], "E").parse::<f64>().ok()?,
        Err(_) => return None,
    };
    v.is_finite().then_some(v)
}

// ---------------------------------------------------------------------------
// Record – one line of input
// ---------------------------------------------------------------------------

/// One non-empty input line split into fields.
///
/// Fields stay as text; numeric interpretation happens on demand so label
/// columns (atom names, section keywords) can sit next to numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line number in the source.
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// Number of fields on the line.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at a 1-based column index.
    pub fn field(&self, column: usize) -> Option<&str> {
        column
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(" "))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the records of one source
// ---------------------------------------------------------------------------

/// All records read from one source, plus the trail of filters applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Source identifier used in diagnostics (`-` for stdin).
    pub source: String,
    pub records: Vec<Record>,
    /// Human-readable description of every filter applied so far.
    pub filters: Vec<String>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
            filters: Vec::new(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filter trail joined for error messages; `none` when unfiltered.
    pub fn filter_description(&self) -> String {
        if self.filters.is_empty() {
            "none".to_string()
        } else {
            self.filters.join(" && ")
        }
    }

    /// Numeric value of a 1-based column in one record, with enough context
    /// in the error to locate the row.
    pub fn numeric(&self, record: &Record, column: usize) -> Result<f64> {
        let raw = record.field(column).ok_or_else(|| SimtabError::MissingColumn {
            source_name: self.source.clone(),
            line: record.line,
            column,
            fields: record.len(),
        })?;
        parse_number(raw).ok_or_else(|| SimtabError::NonNumeric {
            source_name: self.source.clone(),
            line: record.line,
            column,
            value: raw.to_string(),
        })
    }

    /// Every numeric value of one column, in record order.
    pub fn column_values(&self, column: usize) -> Result<Vec<f64>> {
        self.records
            .iter()
            .map(|r| self.numeric(r, column))
            .collect()
    }
}
