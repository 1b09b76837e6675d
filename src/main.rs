use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use simtab::aggregate::thermo::TemperatureGrid;
use simtab::config::RunConfig;
use simtab::constants::FrequencyUnit;
use simtab::run::run;
use simtab::{FilterPredicate, Statistic};

/// Filter and aggregate whitespace-delimited simulation output.
///
/// Columns are 1-based. Example: mean and standard deviation of column 5 over
/// the 6-field thermo lines of a LAMMPS log:
///
///     simtab log.lammps --fields 6 --column 5 --stat mean,stdev
#[derive(Parser)]
#[command(name = "simtab")]
#[command(version)]
struct Cli {
    /// Input file. Reads standard input when omitted or `-`.
    input: Option<PathBuf>,

    /// JSON config file; command-line options override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Single-character field delimiter (`,`, `tab`, ...). Default: runs of whitespace.
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Ignore lines starting with this prefix (e.g. `#`).
    #[arg(long)]
    comment: Option<String>,

    /// Skip and report malformed lines instead of aborting.
    #[arg(long)]
    skip_malformed: bool,

    /// Keep only lines with exactly this many fields.
    #[arg(short = 'n', long)]
    fields: Option<usize>,

    /// Field filter, e.g. `3==Li`, `2!=0`, `$5>1e3`. Repeatable, ANDed.
    #[arg(short = 'w', long = "where", value_name = "PREDICATE")]
    filters: Vec<FilterPredicate>,

    /// Column(s) to aggregate. Repeatable or comma separated.
    #[arg(short = 'k', long = "column", value_delimiter = ',')]
    columns: Vec<usize>,

    /// Statistic(s): count, sum, mean, min, max, stdev, stdev-sample,
    /// stdev-about:<mean>, sum:<conversion>, mean:<conversion>, zpe,
    /// helmholtz, helmholtz-classical. Default: mean.
    #[arg(short, long = "stat", value_delimiter = ',')]
    stats: Vec<Statistic>,

    /// Aggregate separately per distinct value of this column.
    #[arg(short, long)]
    group_by: Option<usize>,

    /// Temperature grid in K, `start:stop:step` (inclusive).
    #[arg(long)]
    grid: Option<TemperatureGrid>,

    /// Unit of frequency columns: hz, thz, cm1.
    #[arg(long)]
    frequency_unit: Option<FrequencyUnit>,

    /// Planck constant override, J s.
    #[arg(long)]
    planck: Option<f64>,

    /// Boltzmann constant override, J/K.
    #[arg(long)]
    boltzmann: Option<f64>,

    /// Avogadro constant override, 1/mol.
    #[arg(long)]
    avogadro: Option<f64>,

    /// Speed of light override, cm/s.
    #[arg(long)]
    speed_of_light: Option<f64>,

    /// Decimal places of output values.
    #[arg(short, long)]
    precision: Option<usize>,

    /// Minimum output field width.
    #[arg(long)]
    width: Option<usize>,

    /// Print `#` header lines.
    #[arg(long)]
    header: bool,

    /// Write JSON instead of delimited text.
    #[arg(long)]
    json: bool,

    /// Output file. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve(&self) -> Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if self.delimiter.is_some() {
            cfg.delimiter = self.delimiter.clone();
        }
        if self.comment.is_some() {
            cfg.comment = self.comment.clone();
        }
        cfg.skip_malformed |= self.skip_malformed;
        if self.fields.is_some() {
            cfg.fields = self.fields;
        }
        cfg.filters.extend(self.filters.iter().cloned());
        if !self.columns.is_empty() {
            cfg.set_targets(&self.columns, &self.stats);
        } else if !self.stats.is_empty() {
            // statistics without columns re-target the config's columns
            let columns: Vec<usize> = cfg.targets.iter().map(|t| t.column).collect();
            cfg.set_targets(&columns, &self.stats);
        }
        if self.group_by.is_some() {
            cfg.group_by = self.group_by;
        }
        if self.grid.is_some() {
            cfg.grid = self.grid;
        }
        if let Some(unit) = self.frequency_unit {
            cfg.frequency_unit = unit;
        }
        if let Some(v) = self.planck {
            cfg.constants.planck = v;
        }
        if let Some(v) = self.boltzmann {
            cfg.constants.boltzmann = v;
        }
        if let Some(v) = self.avogadro {
            cfg.constants.avogadro = v;
        }
        if let Some(v) = self.speed_of_light {
            cfg.constants.speed_of_light_cm = v;
        }
        if let Some(p) = self.precision {
            cfg.precision = p;
        }
        if self.width.is_some() {
            cfg.width = self.width;
        }
        cfg.header |= self.header;
        cfg.json |= self.json;
        if self.output.is_some() {
            cfg.output = self.output.clone();
        }
        Ok(cfg)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn real_main(cli: &Cli) -> Result<ExitCode> {
    let cfg = cli.resolve()?;
    let outcome = run(&cfg, cli.input.as_deref())?;

    match &cfg.output {
        Some(path) => std::fs::write(path, &outcome.text)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", outcome.text),
    }

    if outcome.skipped_lines > 0 {
        eprintln!("warning: skipped {} malformed lines", outcome.skipped_lines);
    }
    if outcome.failures.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    for f in &outcome.failures {
        eprintln!("error: {f}");
    }
    eprintln!("{} values could not be computed", outcome.failures.len());
    Ok(ExitCode::from(2))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match real_main(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
