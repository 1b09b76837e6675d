use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{parse_number, Dataset, Record};
use crate::error::SimtabError;

// ---------------------------------------------------------------------------
// Comparison operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A single keep/drop test on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterPredicate {
    /// Keep records with exactly this many fields.
    FieldCount(usize),
    /// Compare the field at a 1-based column against a literal.
    Field {
        column: usize,
        op: CompareOp,
        literal: String,
    },
}

impl FilterPredicate {
    /// Whether `record` passes.
    ///
    /// * Records too short to have `column` fail (shape mismatch drops rows).
    /// * `==` / `!=` compare numerically when both sides are numbers, else as text.
    /// * Ordering operators need both sides numeric; anything else fails.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FilterPredicate::FieldCount(n) => record.len() == *n,
            FilterPredicate::Field { column, op, literal } => {
                let Some(value) = record.field(*column) else {
                    return false;
                };
                let numeric = parse_number(value).zip(parse_number(literal));
                match (op, numeric) {
                    (CompareOp::Eq, Some((a, b))) => a == b,
                    (CompareOp::Ne, Some((a, b))) => a != b,
                    (CompareOp::Eq, None) => value == literal,
                    (CompareOp::Ne, None) => value != literal,
                    (CompareOp::Lt, Some((a, b))) => a < b,
                    (CompareOp::Le, Some((a, b))) => a <= b,
                    (CompareOp::Gt, Some((a, b))) => a > b,
                    (CompareOp::Ge, Some((a, b))) => a >= b,
                    (_, None) => false,
                }
            }
        }
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPredicate::FieldCount(n) => write!(f, "NF=={n}"),
            FilterPredicate::Field { column, op, literal } => {
                write!(f, "${column}{}{literal}", op.symbol())
            }
        }
    }
}

/// Parses `NF==6` / `nf=6` (field count) and `3==Li`, `$5>0.0`, `2!=H`
/// (field comparisons).
impl FromStr for FilterPredicate {
    type Err = SimtabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = |why: &str| SimtabError::Config(format!("bad filter '{s}': {why}"));

        // Two-character operators first so `<=` is not read as `<`.
        const OPS: [(&str, CompareOp); 7] = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<=", CompareOp::Le),
            (">=", CompareOp::Ge),
            ("<", CompareOp::Lt),
            (">", CompareOp::Gt),
            ("=", CompareOp::Eq),
        ];
        let (pos, sym, op) = OPS
            .iter()
            .filter_map(|(sym, op)| s.find(sym).map(|pos| (pos, *sym, *op)))
            .min_by_key(|(pos, sym, _)| (*pos, std::cmp::Reverse(sym.len())))
            .ok_or_else(|| bad("expected an operator (==, !=, <, <=, >, >=)"))?;

        let lhs = s[..pos].trim();
        let rhs = s[pos + sym.len()..].trim();
        if rhs.is_empty() {
            return Err(bad("missing literal"));
        }

        if lhs.eq_ignore_ascii_case("nf") {
            if op != CompareOp::Eq {
                return Err(bad("field count only supports =="));
            }
            let n = rhs.parse::<usize>().map_err(|_| bad("field count must be an integer"))?;
            return Ok(FilterPredicate::FieldCount(n));
        }

        let column = lhs
            .trim_start_matches('$')
            .parse::<usize>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| bad("column must be a positive 1-based index"))?;
        Ok(FilterPredicate::Field {
            column,
            op,
            literal: rhs.to_string(),
        })
    }
}

impl TryFrom<String> for FilterPredicate {
    type Error = SimtabError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FilterPredicate> for String {
    fn from(p: FilterPredicate) -> Self {
        p.to_string()
    }
}

// ---------------------------------------------------------------------------
// Filter – logical AND of predicates
// ---------------------------------------------------------------------------

/// Conjunction of predicates. An empty filter keeps every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub predicates: Vec<FilterPredicate>,
}

impl Filter {
    pub fn new(predicates: Vec<FilterPredicate>) -> Self {
        Self { predicates }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return write!(f, "true");
        }
        let parts: Vec<String> = self.predicates.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" && "))
    }
}

/// Records of `dataset` passing `filter`, in their original order.
///
/// The input is left untouched; the returned dataset remembers the filter
/// so an empty result can be traced back to it.
pub fn filter(dataset: &Dataset, filter: &Filter) -> Dataset {
    let records: Vec<Record> = dataset
        .records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    debug!(
        "filter [{filter}] kept {} of {} records from {}",
        records.len(),
        dataset.len(),
        dataset.source
    );

    let mut filters = dataset.filters.clone();
    if !filter.predicates.is_empty() {
        let desc = filter.to_string();
        if !filters.contains(&desc) {
            filters.push(desc);
        }
    }
    Dataset {
        source: dataset.source.clone(),
        records,
        filters,
    }
}
