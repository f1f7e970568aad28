//! Ordinary least squares for a straight line
//!
//! Coefficients and predictions are rounded to a fixed number of decimals
//! (two by default) so that scores stay stable across platforms.

use crate::Predictor;
use serde::{Deserialize, Serialize};

/// Number of decimals kept by [`LinearFit::fit`].
pub const DEFAULT_PRECISION: u32 = 2;

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    slope: f64,
    intercept: f64,
    r_squared: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    precision: Option<u32>,
}

impl LinearFit {
    /// Fit a line with [`DEFAULT_PRECISION`] decimals.
    ///
    /// Returns `None` when there is no finite point to fit.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        Self::fit_with_precision(points, Some(DEFAULT_PRECISION))
    }

    /// Fit a line, rounding to `precision` decimals (`None` keeps full precision).
    ///
    /// Points with a non-finite coordinate are skipped. When every x is the
    /// same the slope is 0 and the line passes through the mean y.
    pub fn fit_with_precision(points: &[(f64, f64)], precision: Option<u32>) -> Option<Self> {
        let finite: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        if finite.is_empty() {
            return None;
        }

        let n = finite.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xx, mut sum_xy) = (0.0, 0.0, 0.0, 0.0);
        for (x, y) in &finite {
            sum_x += x;
            sum_y += y;
            sum_xx += x * x;
            sum_xy += x * y;
        }

        let run = n * sum_xx - sum_x * sum_x;
        let rise = n * sum_xy - sum_x * sum_y;
        let constant_x = finite.iter().all(|(x, _)| *x == finite[0].0);

        // The intercept is taken from the rounded slope so the line keeps
        // passing through the centroid.
        let slope = if constant_x || run == 0.0 {
            0.0
        } else {
            round_to(rise / run, precision)
        };
        let intercept = round_to(sum_y / n - slope * sum_x / n, precision);

        let mut fit = Self {
            slope,
            intercept,
            r_squared: 1.0,
            precision,
        };

        // Determination is measured against the rounded predictions
        let mean_y = sum_y / n;
        let (mut ss_res, mut ss_tot) = (0.0, 0.0);
        for (x, y) in &finite {
            let residual = y - fit.predict(*x).1;
            ss_res += residual * residual;
            ss_tot += (y - mean_y) * (y - mean_y);
        }
        if ss_tot > 0.0 {
            fit.r_squared = round_to(1.0 - ss_res / ss_tot, precision);
        }

        Some(fit)
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination over the fitted points
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }
}

impl Predictor for LinearFit {
    fn predict(&self, x: f64) -> (f64, f64) {
        (
            round_to(x, self.precision),
            round_to(self.slope * x + self.intercept, self.precision),
        )
    }
}

fn round_to(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(decimals) => {
            // Halves round towards positive infinity
            let factor = 10f64.powi(decimals as i32);
            let scaled = value * factor;
            let floor = scaled.floor();
            let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
            rounded / factor
        }
        None => value,
    }
}
