//! One-pass column accumulators.
//!
//! Simulation energies and cell volumes sit anywhere between 1e3 and 1e23,
//! where `Σx² − (Σx)²/n` loses every significant digit. Variance therefore
//! comes from Welford's update (on values shifted by the first sample) and
//! sums use Neumaier compensation.

/// Neumaier (improved Kahan–Babuška) compensated sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl FromIterator<f64> for NeumaierSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = NeumaierSum::new();
        for x in iter {
            acc.add(x);
        }
        acc
    }
}

/// Running statistics for a single column.
///
/// `mean` / `m2` follow Welford over `x − shift`: after `n` samples
/// `m2 = Σ(x − mean)²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnAccumulator {
    count: usize,
    shift: f64,
    sum: NeumaierSum,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    /// Σ ln x over the strictly positive values seen.
    sum_ln: NeumaierSum,
}

impl Default for ColumnAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            shift: 0.0,
            sum: NeumaierSum::new(),
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum_ln: NeumaierSum::new(),
        }
    }
}

impl ColumnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one value.
    pub fn push(&mut self, x: f64) {
        if self.count == 0 {
            self.shift = x;
        }
        self.count += 1;
        self.sum.add(x);

        let y = x - self.shift;
        let n = self.count as f64;
        let delta = y - self.mean;
        self.mean += delta / n;
        let delta2 = y - self.mean;
        self.m2 += delta * delta2;

        self.min = self.min.min(x);
        self.max = self.max.max(x);
        if x > 0.0 {
            self.sum_ln.add(x.ln());
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum.value()
    }

    /// `None` before the first value.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.shift + self.mean)
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Σ ln x; only meaningful when `min() > 0`.
    pub fn sum_ln(&self) -> f64 {
        self.sum_ln.value()
    }

    /// Population variance (÷ n).
    pub fn variance_population(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }

    /// Sample variance (÷ (n − 1)); needs at least two values.
    pub fn variance_sample(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }
}

/// RMS deviation about a known reference value, `sqrt(Σ(x − μ)² / n)`.
pub fn rms_about(values: &[f64], reference: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let ss: NeumaierSum = values.iter().map(|x| (x - reference).powi(2)).collect();
    Some((ss.value() / values.len() as f64).sqrt())
}
