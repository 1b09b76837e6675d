use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateResult, Entry, Statistic};
use crate::error::{DomainError, Result, SimtabError};

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Text layout of an aggregate result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Decimal places of every value.
    pub precision: usize,
    /// Minimum field width (right aligned); `None` for no padding.
    pub width: Option<usize>,
    /// Field separator byte.
    pub delimiter: u8,
    /// Emit `#`-prefixed column headers.
    pub header: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            precision: 6,
            width: None,
            delimiter: b' ',
            header: false,
        }
    }
}

impl Template {
    fn number(&self, v: f64) -> String {
        let prec = self.precision;
        match self.width {
            Some(width) => format!("{v:>width$.prec$}"),
            None => format!("{v:.prec$}"),
        }
    }

    fn value(&self, v: &std::result::Result<f64, DomainError>) -> String {
        match v {
            Ok(v) => self.number(*v),
            Err(_) => self.pad("nan".to_string()),
        }
    }

    fn pad(&self, s: String) -> String {
        match self.width {
            Some(width) => format!("{s:>width$}"),
            None => s,
        }
    }

    /// `#`-prefixed header row. With a fixed width the marker joins the
    /// first label so every label sits over its column.
    fn header_row(&self, mut labels: Vec<String>) -> Vec<String> {
        if self.width.is_none() {
            labels.insert(0, "#".to_string());
            return labels;
        }
        if let Some(first) = labels.first_mut() {
            first.insert(0, '#');
        }
        labels.into_iter().map(|l| self.pad(l)).collect()
    }
}

// ---------------------------------------------------------------------------
// Line assembly
// ---------------------------------------------------------------------------

/// Rows of text fields, before joining with the delimiter.
type Lines = Vec<Vec<String>>;

fn scalar_lines(result: &AggregateResult, template: &Template, key: Option<&str>, lines: &mut Lines) {
    let prefix = |mut fields: Vec<String>| {
        if let Some(k) = key {
            fields.insert(0, template.pad(k.to_string()));
        }
        fields
    };

    let mut columns: Vec<usize> = Vec::new();
    for e in &result.scalars {
        if !columns.contains(&e.column) {
            columns.push(e.column);
        }
    }

    let mut last_stats: Option<Vec<Statistic>> = None;
    for column in columns {
        let entries: Vec<&Entry> = result.scalars.iter().filter(|e| e.column == column).collect();
        let stats: Vec<Statistic> = entries.iter().map(|e| e.statistic).collect();

        if template.header && last_stats.as_ref() != Some(&stats) {
            let mut head = Vec::with_capacity(stats.len() + 2);
            if key.is_some() {
                head.push("key".to_string());
            }
            head.push("column".to_string());
            head.extend(stats.iter().map(ToString::to_string));
            lines.push(template.header_row(head));
        }
        last_stats = Some(stats);

        let mut fields = vec![template.pad(column.to_string())];
        fields.extend(entries.iter().map(|e| template.value(&e.value)));
        lines.push(prefix(fields));
    }
}

fn grid_lines(result: &AggregateResult, template: &Template, key: Option<&str>, lines: &mut Lines) {
    let Some(first) = result.grid.first() else {
        return;
    };
    if template.header {
        let mut head = Vec::with_capacity(first.entries.len() + 2);
        if key.is_some() {
            head.push("key".to_string());
        }
        head.push("T".to_string());
        head.extend(first.entries.iter().map(|e| format!("{}[{}]", e.statistic, e.column)));
        lines.push(template.header_row(head));
    }
    for row in &result.grid {
        let mut fields = Vec::with_capacity(row.entries.len() + 2);
        if let Some(k) = key {
            fields.push(template.pad(k.to_string()));
        }
        fields.push(template.number(row.temperature));
        fields.extend(row.entries.iter().map(|e| template.value(&e.value)));
        lines.push(fields);
    }
}

fn render(lines: &Lines, template: &Template) -> Result<String> {
    let out_err = |source: std::io::Error| SimtabError::Io {
        source_name: "<output>".to_string(),
        source,
    };
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(template.delimiter)
        .quote_style(csv::QuoteStyle::Never)
        .flexible(true)
        .from_writer(Vec::new());
    for line in lines {
        wtr.write_record(line).map_err(|e| out_err(e.into()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| out_err(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| out_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Render a result as delimited text: one line per target column
/// (`column v1 v2 ...`) followed by one line per grid point (`T v1 v2 ...`).
/// Values that failed with a domain error print as `nan`.
pub fn format(result: &AggregateResult, template: &Template) -> Result<String> {
    let mut lines = Lines::new();
    scalar_lines(result, template, None, &mut lines);
    grid_lines(result, template, None, &mut lines);
    render(&lines, template)
}

/// Like [`format`], every line prefixed with its group key.
pub fn format_grouped(groups: &[(String, AggregateResult)], template: &Template) -> Result<String> {
    let mut scalars = Lines::new();
    let mut grid = Lines::new();
    for (i, (key, result)) in groups.iter().enumerate() {
        // header only once per section
        let t = Template {
            header: template.header && i == 0,
            ..*template
        };
        scalar_lines(result, &t, Some(key), &mut scalars);
        grid_lines(result, &t, Some(key), &mut grid);
    }
    scalars.extend(grid);
    render(&scalars, template)
}

/// Pretty JSON of a result, domain errors included.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| SimtabError::Io {
        source_name: "<output>".to_string(),
        source: e.into(),
    })
}
