use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can stop a load / filter / aggregate run.
///
/// Variants carry the source identifier and line number where one exists so
/// the user can find the offending row by hand.
#[derive(Debug, Error)]
pub enum SimtabError {
    #[error("cannot read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: malformed line: {reason}")]
    Parse {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("no records to aggregate in {source_name} (filter: {filter})")]
    EmptyDataset { source_name: String, filter: String },

    #[error("{source_name}:{line}: column {column} value '{value}' is not numeric")]
    NonNumeric {
        source_name: String,
        line: usize,
        column: usize,
        value: String,
    },

    #[error("{source_name}:{line}: column {column} requested but record has {fields} fields")]
    MissingColumn {
        source_name: String,
        line: usize,
        column: usize,
        fields: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type Result<T> = std::result::Result<T, SimtabError>;

// ---------------------------------------------------------------------------
// DomainError – a single derived value that cannot be computed
// ---------------------------------------------------------------------------

/// A value outside the domain of a formula (zero temperature, log of a
/// non-positive frequency, ...). Stored per value in an aggregate result so
/// the remaining columns and grid points are still produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainError {
    /// Name of the quantity being computed, e.g. `helmholtz`.
    pub quantity: String,
    /// 1-based input column.
    pub column: usize,
    /// Grid temperature, when the quantity is temperature dependent.
    pub temperature: Option<f64>,
    pub reason: String,
}

impl DomainError {
    pub fn new(quantity: impl Into<String>, column: usize, reason: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            column,
            temperature: None,
            reason: reason.into(),
        }
    }

    pub fn at_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of column {}", self.quantity, self.column)?;
        if let Some(t) = self.temperature {
            write!(f, " at T = {t} K")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_names_column_and_temperature() {
        let err = DomainError::new("helmholtz", 3, "temperature must be positive").at_temperature(0.0);
        assert_eq!(
            err.to_string(),
            "helmholtz of column 3 at T = 0 K: temperature must be positive"
        );
    }

    #[test]
    fn parse_error_carries_location() {
        let err = SimtabError::Parse {
            source_name: "log.lammps".into(),
            line: 42,
            reason: "invalid UTF-8".into(),
        };
        assert_eq!(err.to_string(), "log.lammps:42: malformed line: invalid UTF-8");
    }
}
