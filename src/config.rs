use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::thermo::TemperatureGrid;
use crate::aggregate::{AggregationSpec, ColumnTarget, Statistic};
use crate::constants::{FrequencyUnit, PhysicalConstants};
use crate::data::filter::{Filter, FilterPredicate};
use crate::data::loader::LoadOptions;
use crate::format::Template;

// ---------------------------------------------------------------------------
// RunConfig – everything one invocation needs
// ---------------------------------------------------------------------------

/// Settings of a run. Loaded from an optional JSON file, then overridden
/// field by field from the command line. Every field has a default.
///
/// ```json
/// {
///   "comment": "#",
///   "fields": 6,
///   "filters": ["1==Li"],
///   "targets": [{ "column": 2, "statistics": ["mean", "stdev"] }],
///   "grid": { "start": 100, "stop": 1000, "step": 100 },
///   "precision": 8
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Single-character delimiter; unset means runs of whitespace.
    pub delimiter: Option<String>,
    pub comment: Option<String>,
    pub skip_malformed: bool,
    /// Required field count.
    pub fields: Option<usize>,
    pub filters: Vec<FilterPredicate>,
    pub targets: Vec<ColumnTarget>,
    pub group_by: Option<usize>,
    pub constants: PhysicalConstants,
    pub grid: Option<TemperatureGrid>,
    pub frequency_unit: FrequencyUnit,
    pub precision: usize,
    pub width: Option<usize>,
    pub header: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            comment: None,
            skip_malformed: false,
            fields: None,
            filters: Vec::new(),
            targets: Vec::new(),
            group_by: None,
            constants: PhysicalConstants::default(),
            grid: None,
            frequency_unit: FrequencyUnit::default(),
            precision: Template::default().precision,
            width: None,
            header: false,
            output: None,
            json: false,
        }
    }
}

impl RunConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parsed delimiter byte, `None` for whitespace splitting.
    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        let Some(d) = self.delimiter.as_deref() else {
            return Ok(None);
        };
        match d {
            "tab" | "\\t" => Ok(Some(b'\t')),
            "space" | "whitespace" => Ok(None),
            _ if d.len() == 1 && d.is_ascii() => Ok(Some(d.as_bytes()[0])),
            _ => bail!("delimiter must be a single ASCII character, got '{d}'"),
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            delimiter: self.delimiter_byte()?,
            comment: self.comment.clone(),
            skip_malformed: self.skip_malformed,
        })
    }

    /// Field-count requirement first, then value filters, ANDed.
    pub fn filter(&self) -> Filter {
        let mut predicates = Vec::with_capacity(self.filters.len() + 1);
        if let Some(n) = self.fields {
            predicates.push(FilterPredicate::FieldCount(n));
        }
        predicates.extend(self.filters.iter().cloned());
        Filter::new(predicates)
    }

    pub fn aggregation_spec(&self) -> Result<AggregationSpec> {
        if self.targets.is_empty() {
            bail!("no target columns given (use --column or \"targets\" in the config)");
        }
        let spec = AggregationSpec {
            targets: self.targets.clone(),
            constants: self.constants,
            grid: self.grid,
            frequency_unit: self.frequency_unit,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn template(&self) -> Result<Template> {
        Ok(Template {
            precision: self.precision,
            width: self.width,
            delimiter: self.delimiter_byte()?.unwrap_or(b' '),
            header: self.header,
        })
    }

    /// Replace the targets with `statistics` applied to each of `columns`.
    /// Empty `statistics` default to the mean.
    pub fn set_targets(&mut self, columns: &[usize], statistics: &[Statistic]) {
        let statistics = if statistics.is_empty() {
            vec![Statistic::Mean]
        } else {
            statistics.to_vec()
        };
        self.targets = columns
            .iter()
            .map(|&column| ColumnTarget {
                column,
                statistics: statistics.clone(),
            })
            .collect();
    }
}
