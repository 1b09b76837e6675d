/// Column aggregation: statistics and derived thermodynamic quantities.
///
/// Aggregation runs in two explicit phases:
/// ```text
///   Dataset ──reduce──▶ ColumnReduction (one per target column, one pass)
///                              │
///                 ┌────────────┴────────────┐
///                 ▼                         ▼
///          scalar statistics        temperature grid map
///      (sum, mean, stdev, zpe)   (helmholtz, helmholtz-classical)
/// ```
pub mod accumulator;
pub mod thermo;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{Conversion, FrequencyUnit, PhysicalConstants};
use crate::data::model::{Dataset, Record};
use crate::error::{DomainError, Result, SimtabError};
use accumulator::{rms_about, ColumnAccumulator};
use thermo::TemperatureGrid;

// ---------------------------------------------------------------------------
// Statistic – what to compute for a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Statistic {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    /// Population standard deviation (÷ n).
    StdevPop,
    /// Sample standard deviation (÷ (n − 1)).
    StdevSample,
    /// RMS deviation about a known mean.
    StdevAbout(f64),
    ScaledSum(Conversion),
    ScaledMean(Conversion),
    /// Zero-point energy, J/mol.
    Zpe,
    /// Quantum harmonic vibrational free energy over the grid, J/mol.
    Helmholtz,
    /// High-temperature limit of `Helmholtz`, J/mol.
    HelmholtzClassical,
}

impl Statistic {
    /// Whether the statistic is evaluated per temperature grid point.
    pub fn is_grid(&self) -> bool {
        matches!(self, Statistic::Helmholtz | Statistic::HelmholtzClassical)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Count => write!(f, "count"),
            Statistic::Sum => write!(f, "sum"),
            Statistic::Mean => write!(f, "mean"),
            Statistic::Min => write!(f, "min"),
            Statistic::Max => write!(f, "max"),
            Statistic::StdevPop => write!(f, "stdev"),
            Statistic::StdevSample => write!(f, "stdev-sample"),
            Statistic::StdevAbout(mu) => write!(f, "stdev-about:{mu}"),
            Statistic::ScaledSum(c) => write!(f, "sum:{c}"),
            Statistic::ScaledMean(c) => write!(f, "mean:{c}"),
            Statistic::Zpe => write!(f, "zpe"),
            Statistic::Helmholtz => write!(f, "helmholtz"),
            Statistic::HelmholtzClassical => write!(f, "helmholtz-classical"),
        }
    }
}

impl FromStr for Statistic {
    type Err = SimtabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, arg) = match lower.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (lower.as_str(), None),
        };
        let stat = match (name, arg) {
            ("count", None) => Statistic::Count,
            ("sum", None) => Statistic::Sum,
            ("mean" | "avg", None) => Statistic::Mean,
            ("min", None) => Statistic::Min,
            ("max", None) => Statistic::Max,
            ("stdev" | "stdev-pop", None) => Statistic::StdevPop,
            ("stdev-sample", None) => Statistic::StdevSample,
            ("stdev-about", Some(mu)) => Statistic::StdevAbout(
                mu.parse()
                    .map_err(|_| SimtabError::Config(format!("bad reference mean in '{s}'")))?,
            ),
            ("sum", Some(conv)) => Statistic::ScaledSum(conv.parse()?),
            ("mean", Some(conv)) => Statistic::ScaledMean(conv.parse()?),
            ("zpe", None) => Statistic::Zpe,
            ("helmholtz", None) => Statistic::Helmholtz,
            ("helmholtz-classical", None) => Statistic::HelmholtzClassical,
            _ => return Err(SimtabError::Config(format!("unknown statistic '{s}'"))),
        };
        Ok(stat)
    }
}

impl TryFrom<String> for Statistic {
    type Error = SimtabError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Statistic> for String {
    fn from(s: Statistic) -> Self {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// AggregationSpec
// ---------------------------------------------------------------------------

/// Statistics requested for one 1-based column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTarget {
    pub column: usize,
    pub statistics: Vec<Statistic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub targets: Vec<ColumnTarget>,
    #[serde(default)]
    pub constants: PhysicalConstants,
    #[serde(default)]
    pub grid: Option<TemperatureGrid>,
    #[serde(default)]
    pub frequency_unit: FrequencyUnit,
}

impl AggregationSpec {
    /// The same statistics for every listed column.
    pub fn new(columns: &[usize], statistics: &[Statistic]) -> Self {
        Self {
            targets: columns
                .iter()
                .map(|&column| ColumnTarget {
                    column,
                    statistics: statistics.to_vec(),
                })
                .collect(),
            constants: PhysicalConstants::default(),
            grid: None,
            frequency_unit: FrequencyUnit::default(),
        }
    }

    pub fn with_grid(mut self, grid: TemperatureGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_frequency_unit(mut self, unit: FrequencyUnit) -> Self {
        self.frequency_unit = unit;
        self
    }

    fn needs_grid(&self) -> bool {
        self.targets
            .iter()
            .any(|t| t.statistics.iter().any(Statistic::is_grid))
    }

    /// Reject specs that cannot be evaluated regardless of the data.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(SimtabError::Config("no target columns".into()));
        }
        for t in &self.targets {
            if t.column == 0 {
                return Err(SimtabError::Config("columns are 1-based; got column 0".into()));
            }
            if t.statistics.is_empty() {
                return Err(SimtabError::Config(format!("no statistics for column {}", t.column)));
            }
        }
        self.constants.validate()?;
        match (&self.grid, self.needs_grid()) {
            (None, true) => Err(SimtabError::Config(
                "temperature-dependent statistics need a temperature grid".into(),
            )),
            (Some(grid), _) => grid.points().map(|_| ()),
            (None, false) => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateResult
// ---------------------------------------------------------------------------

/// One computed value. Domain failures are kept per value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub column: usize,
    pub statistic: Statistic,
    pub value: std::result::Result<f64, DomainError>,
}

/// All grid-dependent values at one temperature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub temperature: f64,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub source: String,
    /// Records that went into the aggregation.
    pub rows: usize,
    /// Scalar values in target order, statistics in request order.
    pub scalars: Vec<Entry>,
    /// One row per grid temperature, ascending.
    pub grid: Vec<GridRow>,
}

impl AggregateResult {
    /// Scalar value for `(column, statistic)`, if requested and computed.
    pub fn value(&self, column: usize, statistic: Statistic) -> Option<f64> {
        self.scalars
            .iter()
            .find(|e| e.column == column && e.statistic == statistic)
            .and_then(|e| e.value.as_ref().ok().copied())
    }

    /// Every domain failure, scalar and grid.
    pub fn failures(&self) -> Vec<&DomainError> {
        self.scalars
            .iter()
            .chain(self.grid.iter().flat_map(|g| g.entries.iter()))
            .filter_map(|e| e.value.as_ref().err())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Phase 1: reduce each target column once
// ---------------------------------------------------------------------------

/// Everything later phases need from one column.
#[derive(Debug, Clone)]
struct ColumnReduction {
    column: usize,
    acc: ColumnAccumulator,
    values: Vec<f64>,
}

fn reduce_column(dataset: &Dataset, column: usize) -> Result<ColumnReduction> {
    let init = ColumnReduction {
        column,
        acc: ColumnAccumulator::new(),
        values: Vec::with_capacity(dataset.len()),
    };
    dataset.records.iter().try_fold(init, |mut red, record| {
        let x = dataset.numeric(record, column)?;
        red.acc.push(x);
        red.values.push(x);
        Ok(red)
    })
}

// ---------------------------------------------------------------------------
// Phase 2: scalar statistics and the temperature grid
// ---------------------------------------------------------------------------

fn check_finite(stat: Statistic, column: usize, v: f64) -> std::result::Result<f64, DomainError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DomainError::new(stat.to_string(), column, "result is not finite"))
    }
}

fn scalar(
    red: &ColumnReduction,
    stat: Statistic,
    spec: &AggregationSpec,
) -> std::result::Result<f64, DomainError> {
    let acc = &red.acc;
    let empty = || DomainError::new(stat.to_string(), red.column, "no values");
    let value = match stat {
        Statistic::Count => acc.count() as f64,
        Statistic::Sum => acc.sum(),
        Statistic::Mean => acc.mean().ok_or_else(empty)?,
        Statistic::Min => acc.min().ok_or_else(empty)?,
        Statistic::Max => acc.max().ok_or_else(empty)?,
        Statistic::StdevPop => acc.variance_population().ok_or_else(empty)?.sqrt(),
        Statistic::StdevSample => acc
            .variance_sample()
            .ok_or_else(|| {
                DomainError::new(stat.to_string(), red.column, "sample standard deviation needs at least two values")
            })?
            .sqrt(),
        Statistic::StdevAbout(mu) => rms_about(&red.values, mu).ok_or_else(empty)?,
        Statistic::ScaledSum(c) => acc.sum() * c.factor(&spec.constants),
        Statistic::ScaledMean(c) => acc.mean().ok_or_else(empty)? * c.factor(&spec.constants),
        Statistic::Zpe => zpe(red, spec),
        Statistic::Helmholtz | Statistic::HelmholtzClassical => {
            unreachable!("grid statistics are evaluated per temperature")
        }
    };
    check_finite(stat, red.column, value)
}

fn zpe(red: &ColumnReduction, spec: &AggregationSpec) -> f64 {
    let to_hz = spec.frequency_unit.to_hz(&spec.constants);
    thermo::zero_point_energy(red.acc.sum() * to_hz, &spec.constants)
}

fn grid_value(
    red: &ColumnReduction,
    stat: Statistic,
    temperature: f64,
    spec: &AggregationSpec,
) -> std::result::Result<f64, DomainError> {
    let c = &spec.constants;
    let to_hz = spec.frequency_unit.to_hz(c);
    match stat {
        Statistic::Helmholtz => {
            let freqs: Vec<f64> = red.values.iter().map(|v| v * to_hz).collect();
            thermo::helmholtz(&freqs, zpe(red, spec), temperature, c, red.column)
        }
        Statistic::HelmholtzClassical => {
            let n = red.acc.count();
            let sum_ln_hz = red.acc.sum_ln() + n as f64 * to_hz.ln();
            let min_hz = red.acc.min().unwrap_or(0.0) * to_hz;
            thermo::helmholtz_classical(n, sum_ln_hz, min_hz, temperature, c, red.column)
        }
        _ => unreachable!("scalar statistics are not evaluated on the grid"),
    }
}

/// Aggregate every target column of `dataset` according to `spec`.
///
/// Errors: `EmptyDataset` for zero records (naming the filter trail),
/// `NonNumeric` / `MissingColumn` for unusable target fields. Domain
/// failures of individual values are returned inside the result.
pub fn aggregate(dataset: &Dataset, spec: &AggregationSpec) -> Result<AggregateResult> {
    spec.validate()?;
    if dataset.is_empty() {
        return Err(SimtabError::EmptyDataset {
            source_name: dataset.source.clone(),
            filter: dataset.filter_description(),
        });
    }

    let mut reductions: HashMap<usize, ColumnReduction> = HashMap::new();
    for target in &spec.targets {
        if !reductions.contains_key(&target.column) {
            reductions.insert(target.column, reduce_column(dataset, target.column)?);
        }
    }

    let mut scalars = Vec::new();
    for target in &spec.targets {
        let red = &reductions[&target.column];
        for &stat in target.statistics.iter().filter(|s| !s.is_grid()) {
            scalars.push(Entry {
                column: target.column,
                statistic: stat,
                value: scalar(red, stat, spec),
            });
        }
    }

    let mut grid = Vec::new();
    if let Some(g) = spec.grid.filter(|_| spec.needs_grid()) {
        for temperature in g.points()? {
            let mut entries = Vec::new();
            for target in &spec.targets {
                let red = &reductions[&target.column];
                for &stat in target.statistics.iter().filter(|s| s.is_grid()) {
                    entries.push(Entry {
                        column: target.column,
                        statistic: stat,
                        value: grid_value(red, stat, temperature, spec),
                    });
                }
            }
            grid.push(GridRow { temperature, entries });
        }
    }

    debug!(
        "aggregated {} records of {}: {} scalar values, {} grid points",
        dataset.len(),
        dataset.source,
        scalars.len(),
        grid.len()
    );

    Ok(AggregateResult {
        source: dataset.source.clone(),
        rows: dataset.len(),
        scalars,
        grid,
    })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Split `dataset` by the text of a key column, groups in order of first
/// appearance. Records too short to carry the key are left out.
pub fn group_by(dataset: &Dataset, key_column: usize) -> Vec<(String, Dataset)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();

    for record in &dataset.records {
        let Some(key) = record.field(key_column) else {
            debug!("{}:{}: no key column {key_column}, not grouped", dataset.source, record.line);
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.clone());
    }

    groups
        .into_iter()
        .map(|(key, records)| {
            let mut filters = dataset.filters.clone();
            filters.push(format!("${key_column}=={key}"));
            let ds = Dataset {
                source: dataset.source.clone(),
                records,
                filters,
            };
            (key, ds)
        })
        .collect()
}

/// [`aggregate`] applied to each group of [`group_by`].
pub fn aggregate_grouped(
    dataset: &Dataset,
    key_column: usize,
    spec: &AggregationSpec,
) -> Result<Vec<(String, AggregateResult)>> {
    if key_column == 0 {
        return Err(SimtabError::Config("group key column is 1-based; got 0".into()));
    }
    let groups = group_by(dataset, key_column);
    if groups.is_empty() {
        return Err(SimtabError::EmptyDataset {
            source_name: dataset.source.clone(),
            filter: dataset.filter_description(),
        });
    }
    groups
        .iter()
        .map(|(key, ds)| Ok((key.clone(), aggregate(ds, spec)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::data::filter::{filter, Filter, FilterPredicate};

    fn ds(rows: &[&str]) -> Dataset {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Record::new(i + 1, r.split_whitespace().map(str::to_string).collect()))
            .collect();
        Dataset::new("test", records)
    }

    #[test]
    fn statistic_names_parse_back() {
        for text in [
            "count",
            "sum",
            "mean",
            "min",
            "max",
            "stdev",
            "stdev-sample",
            "stdev-about:2.5",
            "sum:kcal-to-kj",
            "mean:ev-to-kjmol",
            "zpe",
            "helmholtz",
            "helmholtz-classical",
        ] {
            let stat: Statistic = text.parse().unwrap();
            assert_eq!(stat.to_string(), text);
        }
        assert_eq!("AVG".parse::<Statistic>().unwrap(), Statistic::Mean);
        assert!("median".parse::<Statistic>().is_err());
        assert!("sum:parsecs".parse::<Statistic>().is_err());
    }

    #[test]
    fn mean_of_second_column() {
        let data = ds(&["1 2 3", "4 5 6", "7 8 9"]);
        let spec = AggregationSpec::new(&[2], &[Statistic::Mean, Statistic::Sum, Statistic::Count]);
        let res = aggregate(&data, &spec).unwrap();
        assert_eq!(res.rows, 3);
        assert_eq!(res.value(2, Statistic::Mean), Some(5.0));
        assert_eq!(res.value(2, Statistic::Sum), Some(15.0));
        assert_eq!(res.value(2, Statistic::Count), Some(3.0));
    }

    #[test]
    fn stdev_variants() {
        let data = ds(&["2", "4", "4", "4", "5", "5", "7", "9"]);
        let spec = AggregationSpec::new(
            &[1],
            &[Statistic::StdevPop, Statistic::StdevSample, Statistic::StdevAbout(5.0)],
        );
        let res = aggregate(&data, &spec).unwrap();
        assert_relative_eq!(res.value(1, Statistic::StdevPop).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            res.value(1, Statistic::StdevSample).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(res.value(1, Statistic::StdevAbout(5.0)).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn sample_stdev_of_one_value_is_domain_error() {
        let data = ds(&["3.0 1.0"]);
        let spec = AggregationSpec::new(&[1], &[Statistic::StdevSample, Statistic::Mean]);
        let res = aggregate(&data, &spec).unwrap();
        assert!(res.scalars[0].value.is_err());
        assert_eq!(res.value(1, Statistic::Mean), Some(3.0));
        assert_eq!(res.failures().len(), 1);
    }

    #[test]
    fn empty_dataset_names_the_filter() {
        let data = ds(&["1 2 3", "4 5 6"]);
        let empty = filter(&data, &Filter::new(vec![FilterPredicate::FieldCount(7)]));
        let err = aggregate(&empty, &AggregationSpec::new(&[1], &[Statistic::Mean])).unwrap_err();
        match err {
            SimtabError::EmptyDataset { filter, .. } => assert_eq!(filter, "NF==7"),
            other => panic!("expected EmptyDataset, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_target_reports_line() {
        let data = ds(&["Li 1.0", "Na 2.0"]);
        let err = aggregate(&data, &AggregationSpec::new(&[1], &[Statistic::Sum])).unwrap_err();
        assert!(matches!(err, SimtabError::NonNumeric { line: 1, column: 1, .. }));
    }

    #[test]
    fn unit_scaled_sum_and_mean() {
        let data = ds(&["1.0", "3.0"]);
        let spec = AggregationSpec::new(
            &[1],
            &[
                Statistic::ScaledSum(Conversion::KcalToKj),
                Statistic::ScaledMean(Conversion::KcalToKj),
            ],
        );
        let res = aggregate(&data, &spec).unwrap();
        assert_relative_eq!(res.value(1, Statistic::ScaledSum(Conversion::KcalToKj)).unwrap(), 16.736);
        assert_relative_eq!(res.value(1, Statistic::ScaledMean(Conversion::KcalToKj)).unwrap(), 8.368);
    }

    #[test]
    fn zpe_matches_literal_formula_per_column() {
        let rows = [
            "1.0e13 2.0e13 3.0e13 4.0e13 5.0e13",
            "1.5e13 2.5e13 3.5e13 4.5e13 5.5e13",
            "0.5e13 1.2e13 2.2e13 3.2e13 4.2e13",
        ];
        let data = ds(&rows);
        let spec = AggregationSpec::new(&[1, 2, 3, 4, 5], &[Statistic::Zpe]);
        let res = aggregate(&data, &spec).unwrap();
        let c = PhysicalConstants::default();
        for col in 1..=5 {
            let sum: f64 = data.column_values(col).unwrap().iter().sum();
            let expected = sum * c.avogadro * c.planck * 0.5;
            assert_relative_eq!(res.value(col, Statistic::Zpe).unwrap(), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn zpe_from_wavenumbers() {
        let data = ds(&["1000.0"]);
        let spec = AggregationSpec::new(&[1], &[Statistic::Zpe]).with_frequency_unit(FrequencyUnit::Cm1);
        let res = aggregate(&data, &spec).unwrap();
        // ½ h c ν̃ N_A for 1000 cm⁻¹ ≈ 5.98 kJ/mol
        assert_relative_eq!(res.value(1, Statistic::Zpe).unwrap(), 5981.33, max_relative = 1e-5);
    }

    #[test]
    fn grid_statistics_need_a_grid() {
        let data = ds(&["1.0e13"]);
        let spec = AggregationSpec::new(&[1], &[Statistic::Helmholtz]);
        assert!(matches!(aggregate(&data, &spec), Err(SimtabError::Config(_))));
    }

    #[test]
    fn non_positive_constants_are_rejected() {
        let data = ds(&["1.0e13"]);
        let grid = TemperatureGrid::new(300.0, 300.0, 1.0);
        for constants in [
            PhysicalConstants { boltzmann: 0.0, ..Default::default() },
            PhysicalConstants { planck: -6.6e-34, ..Default::default() },
            PhysicalConstants { avogadro: f64::NAN, ..Default::default() },
        ] {
            let spec = AggregationSpec::new(&[1], &[Statistic::Helmholtz])
                .with_grid(grid)
                .with_constants(constants);
            let err = aggregate(&data, &spec).unwrap_err();
            assert!(matches!(err, SimtabError::Config(ref m) if m.contains("must be finite and positive")));
        }
    }

    #[test]
    fn zero_temperature_fails_only_that_grid_point() {
        let data = ds(&["1.0e13 2.0e13", "3.0e13 -1.0e12"]);
        let spec = AggregationSpec::new(&[1, 2], &[Statistic::Helmholtz, Statistic::Zpe])
            .with_grid(TemperatureGrid::new(0.0, 200.0, 100.0));
        let res = aggregate(&data, &spec).unwrap();

        assert_eq!(res.scalars.len(), 2);
        assert_eq!(res.grid.len(), 3);
        assert_eq!(res.grid[0].temperature, 0.0);
        assert!(res.grid[0].entries.iter().all(|e| e.value.is_err()));
        // column 1 is fine above 0 K, column 2 carries an imaginary mode
        assert!(res.grid[1].entries[0].value.is_ok());
        assert!(res.grid[1].entries[1].value.is_err());
        assert!(res.grid[2].entries[0].value.is_ok());

        let failures = res.failures();
        assert_eq!(failures.len(), 4);
        assert!(failures.iter().any(|f| f.column == 2 && f.temperature == Some(200.0)));
    }

    #[test]
    fn free_energy_decreases_with_temperature() {
        let data = ds(&["1.0e13", "2.0e13", "4.0e13"]);
        let spec = AggregationSpec::new(&[1], &[Statistic::Helmholtz])
            .with_grid(TemperatureGrid::new(100.0, 1000.0, 100.0));
        let res = aggregate(&data, &spec).unwrap();
        let values: Vec<f64> = res
            .grid
            .iter()
            .map(|g| *g.entries[0].value.as_ref().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn grouped_in_first_appearance_order() {
        let data = ds(&["O 1.0", "H 2.0", "O 3.0", "H 4.0", "C 5.0"]);
        let spec = AggregationSpec::new(&[2], &[Statistic::Mean]);
        let groups = aggregate_grouped(&data, 1, &spec).unwrap();
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["O", "H", "C"]);
        assert_eq!(groups[0].1.value(2, Statistic::Mean), Some(2.0));
        assert_eq!(groups[1].1.value(2, Statistic::Mean), Some(3.0));
        assert_eq!(groups[2].1.rows, 1);
    }

    #[test]
    fn group_by_skips_records_without_key() {
        let data = ds(&["O 1.0", "", "H 2.0"]);
        let groups = group_by(&data, 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.filter_description(), "$2==1.0");
    }
}
