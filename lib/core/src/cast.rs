//! Per-field statistical model
//!
//! A [`Cast`] accumulates the observed values of one field and answers how
//! typical a new value is: by exact frequency lookup, by spread-weighted
//! interpolation over nearby numeric values, or by following the regression
//! line in the direction its [`Propagation`] allows.

use crate::{Error, FieldValue, Propagation, Result};
use ahash::AHashMap;
use castmatch_regression::{LinearFit, Predictor, DEFAULT_PRECISION};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::OnceLock;
use tracing::trace;

/// How a score was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMethod {
    /// Raw observed count of the value
    Exact,
    /// Spread-weighted sum over nearby observed values
    Interpolated,
    /// Read off the regression line
    Extrapolated,
}

/// A score together with the method that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    pub method: ScoreMethod,
}

/// A distinct observed value with its spread-merged weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: FieldValue,
    /// Raw number of observations of `key`
    pub count: u64,
    /// `count` plus the linearly decaying contribution of every other
    /// numeric key within spread distance
    pub weight: f64,
}

/// Frequency model for a single field
#[derive(Debug, Clone)]
pub struct Cast {
    spread: f64,
    propagation: Propagation,
    precision: Option<u32>,
    numeric: BTreeMap<OrderedFloat<f64>, u64>,
    categorical: AHashMap<String, u64>,
    min_x: Option<f64>,
    max_x: Option<f64>,
    min_y: Option<u64>,
    observations: u64,
    // Reset on every shape
    fit: OnceLock<Option<LinearFit>>,
}

impl Default for Cast {
    fn default() -> Self {
        Self::new(0.0, Propagation::None)
    }
}

impl Cast {
    /// Create an empty cast.
    ///
    /// `spread` is the fraction of the largest observed numeric value used as
    /// the merge radius; 0 disables interpolation.
    pub fn new(spread: f64, propagation: Propagation) -> Self {
        Self {
            spread,
            propagation,
            precision: Some(DEFAULT_PRECISION),
            numeric: BTreeMap::new(),
            categorical: AHashMap::new(),
            min_x: None,
            max_x: None,
            min_y: None,
            observations: 0,
            fit: OnceLock::new(),
        }
    }

    /// Create an empty cast, rejecting a negative or non-finite spread
    pub fn try_new(spread: f64, propagation: Propagation) -> Result<Self> {
        if !spread.is_finite() || spread < 0.0 {
            return Err(Error::InvalidSpread(spread));
        }
        Ok(Self::new(spread, propagation))
    }

    /// Set the number of decimals kept by the regression line (`None` = unrounded)
    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self.fit = OnceLock::new();
        self
    }

    /// Record one observation
    pub fn shape(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        let value = match value.into() {
            FieldValue::Numeric(x) if !x.is_finite() => FieldValue::Categorical(x.to_string()),
            value => value,
        };
        trace!(value = %value, "shape");

        let count = match value {
            FieldValue::Numeric(x) => {
                let count = self.numeric.entry(OrderedFloat(x)).or_insert(0);
                *count += 1;
                let count = *count;
                self.min_x = Some(self.min_x.map_or(x, |min| min.min(x)));
                self.max_x = Some(self.max_x.map_or(x, |max| max.max(x)));
                count
            }
            FieldValue::Categorical(text) => {
                let count = self.categorical.entry(text).or_insert(0);
                *count += 1;
                *count
            }
        };

        self.min_y = Some(self.min_y.map_or(1, |min| min.min(count)));
        self.observations += 1;
        self.fit = OnceLock::new();
        self
    }

    /// How typical `value` is relative to everything shaped so far
    pub fn compare(&self, value: impl Into<FieldValue>) -> f64 {
        self.evaluate(&value.into()).score
    }

    /// Score `value` and report which method produced the score.
    ///
    /// Categorical values get their raw count. Numeric values follow the
    /// regression line where the propagation allows it and are interpolated
    /// over observed values everywhere else.
    pub fn evaluate(&self, value: &FieldValue) -> Evaluation {
        let evaluation = match value {
            FieldValue::Categorical(text) => Evaluation {
                score: self.categorical.get(text).copied().unwrap_or(0) as f64,
                method: ScoreMethod::Exact,
            },
            FieldValue::Numeric(x) => self.evaluate_numeric(*x),
        };
        trace!(
            value = %value,
            score = evaluation.score,
            method = ?evaluation.method,
            "evaluate"
        );
        evaluation
    }

    fn evaluate_numeric(&self, x: f64) -> Evaluation {
        if self.propagation.allows(x, self.min_x(), self.max_x()) {
            if let Some(fit) = self.regression() {
                let (_, y) = fit.predict(x);
                return Evaluation {
                    score: y.max(0.0),
                    method: ScoreMethod::Extrapolated,
                };
            }
        }
        self.interpolate(x)
    }

    /// Spread-weighted frequency of `x`.
    ///
    /// Every observed numeric key closer than the spread distance contributes
    /// its count scaled by `1 - distance / spread_distance`. With a zero spread
    /// distance this is the exact count of `x`.
    pub fn approx(&self, x: f64) -> f64 {
        self.interpolate(x).score
    }

    fn interpolate(&self, x: f64) -> Evaluation {
        let spread_distance = self.spread_distance();
        let method = if spread_distance > 0.0 {
            ScoreMethod::Interpolated
        } else {
            ScoreMethod::Exact
        };
        Evaluation {
            score: self.weight_around(x, spread_distance),
            method,
        }
    }

    fn weight_around(&self, x: f64, spread_distance: f64) -> f64 {
        if spread_distance <= 0.0 {
            return self.numeric.get(&OrderedFloat(x)).copied().unwrap_or(0) as f64;
        }

        let range = (
            Bound::Included(OrderedFloat(x - spread_distance)),
            Bound::Included(OrderedFloat(x + spread_distance)),
        );
        self.numeric
            .range(range)
            .filter_map(|(key, count)| {
                let distance = (x - key.0).abs();
                (distance < spread_distance)
                    .then(|| *count as f64 * (1.0 - distance / spread_distance))
            })
            .sum()
    }

    /// Linear fit over the numeric `(value, count)` pairs, `None` without numeric data
    pub fn regression(&self) -> Option<LinearFit> {
        *self.fit.get_or_init(|| {
            let points: Vec<(f64, f64)> = self
                .numeric
                .iter()
                .map(|(key, count)| (key.0, *count as f64))
                .collect();
            LinearFit::fit_with_precision(&points, self.precision)
        })
    }

    /// Merge radius in the units of the field: `|max_x * spread|`
    pub fn spread_distance(&self) -> f64 {
        let distance = (self.max_x() * self.spread).abs();
        if distance.is_finite() {
            distance
        } else {
            0.0
        }
    }

    /// Every distinct observed value with its merged weight.
    ///
    /// Numeric groups come first in ascending order, then categorical groups
    /// sorted by text.
    pub fn groups(&self) -> Vec<Group> {
        let spread_distance = self.spread_distance();
        let numeric = self.numeric.iter().map(|(key, count)| Group {
            key: FieldValue::Numeric(key.0),
            count: *count,
            weight: self.weight_around(key.0, spread_distance),
        });

        let mut categorical: Vec<Group> = self
            .categorical
            .iter()
            .map(|(key, count)| Group {
                key: FieldValue::Categorical(key.clone()),
                count: *count,
                weight: *count as f64,
            })
            .collect();
        categorical.sort_by(|a, b| a.key.as_str().cmp(&b.key.as_str()));

        numeric.chain(categorical).collect()
    }

    /// Largest group weight, the best score this field can normally give
    pub fn max_y(&self) -> f64 {
        let spread_distance = self.spread_distance();
        let grouped = self
            .numeric
            .keys()
            .map(|key| self.weight_around(key.0, spread_distance))
            .fold(0.0, f64::max);
        let raw = self
            .numeric
            .values()
            .chain(self.categorical.values())
            .copied()
            .max()
            .unwrap_or(0) as f64;
        grouped.max(raw)
    }

    /// Number of times `value` was shaped
    pub fn count(&self, value: &FieldValue) -> u64 {
        let count = match value {
            FieldValue::Numeric(x) => self.numeric.get(&OrderedFloat(*x)),
            FieldValue::Categorical(text) => self.categorical.get(text),
        };
        count.copied().unwrap_or(0)
    }

    pub fn min_x(&self) -> f64 {
        self.min_x.unwrap_or(0.0)
    }

    pub fn max_x(&self) -> f64 {
        self.max_x.unwrap_or(0.0)
    }

    pub fn min_y(&self) -> u64 {
        self.min_y.unwrap_or(0)
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    /// Total number of observations
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Number of distinct observed values
    pub fn distinct(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(spread: f64, propagation: Propagation, values: &[f64]) -> Cast {
        let mut cast = Cast::new(spread, propagation);
        for value in values {
            cast.shape(*value);
        }
        cast
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "Expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_cast() {
        let cast = Cast::default();
        assert!(cast.is_empty());
        assert_eq!(cast.min_x(), 0.0);
        assert_eq!(cast.max_x(), 0.0);
        assert_eq!(cast.min_y(), 0);
        assert_eq!(cast.max_y(), 0.0);
        assert_eq!(cast.spread_distance(), 0.0);
        assert_eq!(cast.compare(5.0), 0.0);
        assert_eq!(cast.compare("ok"), 0.0);
        assert_eq!(cast.approx(5.0), 0.0);
        assert!(cast.regression().is_none());
    }

    #[test]
    fn test_empty_cast_with_propagation() {
        for propagation in [Propagation::Up, Propagation::Down, Propagation::Between] {
            let cast = Cast::new(0.5, propagation);
            assert_eq!(cast.compare(-3.0), 0.0);
            assert_eq!(cast.compare(3.0), 0.0);
        }
    }

    #[test]
    fn test_shape_is_chainable() {
        let mut cast = Cast::default();
        cast.shape(1.0).shape("1").shape("a");
        assert_eq!(cast.count(&FieldValue::Numeric(1.0)), 2);
        assert_eq!(cast.count(&FieldValue::from("a")), 1);
        assert_eq!(cast.observations(), 3);
        assert_eq!(cast.distinct(), 2);
    }

    #[test]
    fn test_single_observation_scores_one() {
        for value in ["7", "-2.5", "ok", ""] {
            let mut cast = Cast::default();
            cast.shape(value);
            assert_eq!(cast.compare(value), 1.0, "value {:?}", value);
        }
    }

    #[test]
    fn test_bounds() {
        let mut cast = trained(0.0, Propagation::None, &[5.0, -3.0, 12.0]);
        cast.shape("text");
        assert_eq!(cast.min_x(), -3.0);
        assert_eq!(cast.max_x(), 12.0);
        assert!(cast.min_x() <= cast.max_x());
    }

    #[test]
    fn test_min_y_tracking() {
        let mut cast = Cast::default();
        cast.shape(1.0);
        assert_eq!(cast.min_y(), 1);
        cast.shape(1.0);
        assert_eq!(cast.min_y(), 1);
        cast.shape(2.0);
        assert_eq!(cast.min_y(), 1);
    }

    #[test]
    fn test_zero_spread_approx_is_exact_lookup() {
        let cast = trained(0.0, Propagation::None, &[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(cast.spread_distance(), 0.0);
        for x in [1.0, 2.0, 3.0, 4.0, 2.5] {
            assert_eq!(cast.approx(x), cast.count(&FieldValue::Numeric(x)) as f64);
        }
    }

    #[test]
    fn test_spread_interpolation() {
        let cast = trained(0.1, Propagation::None, &[20.0, 21.0, 22.0, 40.0]);
        assert_eq!(cast.min_x(), 20.0);
        assert_eq!(cast.max_x(), 40.0);
        assert_close(cast.spread_distance(), 4.0);
        assert_close(cast.approx(21.0), 2.5);
        // Boundary is exclusive
        assert_close(cast.approx(44.0), 0.0);
        assert_close(cast.approx(42.0), 0.5);
    }

    #[test]
    fn test_spread_distance_negative_values() {
        let cast = trained(0.5, Propagation::None, &[-10.0, -4.0]);
        assert_close(cast.spread_distance(), 2.0);
        assert_close(cast.approx(-5.0), 0.5);
    }

    #[test]
    fn test_groups_symmetric() {
        let cast = trained(0.1, Propagation::None, &[20.0, 21.0, 21.0, 40.0]);
        let groups = cast.groups();
        let weight_of = |x: f64| {
            groups
                .iter()
                .find(|g| g.key == FieldValue::Numeric(x))
                .map(|g| g.weight)
                .unwrap()
        };

        // 20 gains 2 * 0.75 from 21, 21 gains 1 * 0.75 from 20
        assert_close(weight_of(20.0), 1.0 + 1.5);
        assert_close(weight_of(21.0), 2.0 + 0.75);
        assert_close(weight_of(40.0), 1.0);
        assert!(cast.max_y() >= 2.0);
        assert_close(cast.max_y(), 2.75);
    }

    #[test]
    fn test_groups_include_categorical() {
        let mut cast = trained(0.0, Propagation::None, &[3.0]);
        cast.shape("b").shape("a").shape("b");
        let groups = cast.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, FieldValue::Numeric(3.0));
        assert_eq!(groups[1].key, FieldValue::from("a"));
        assert_eq!(groups[2].key, FieldValue::from("b"));
        assert_eq!(groups[2].weight, 2.0);
        assert_eq!(cast.max_y(), 2.0);
    }

    #[test]
    fn test_max_y_zero_spread_is_max_count() {
        let cast = trained(0.0, Propagation::None, &[1.0, 1.0, 1.0, 2.0]);
        assert_eq!(cast.max_y(), 3.0);
    }

    #[test]
    fn test_categorical_ignores_propagation() {
        let mut cast = Cast::new(0.5, Propagation::Up);
        cast.shape(10.0).shape(20.0).shape("ok").shape("ok");
        let evaluation = cast.evaluate(&FieldValue::from("ok"));
        assert_eq!(evaluation.score, 2.0);
        assert_eq!(evaluation.method, ScoreMethod::Exact);
        assert_eq!(cast.compare("missing"), 0.0);
    }

    #[test]
    fn test_between_uses_regression_inside_range() {
        let cast = trained(0.0, Propagation::Between, &[10.0, 20.0, 30.0]);
        let evaluation = cast.evaluate(&FieldValue::Numeric(15.0));
        assert_eq!(evaluation.method, ScoreMethod::Extrapolated);
        assert_close(evaluation.score, 1.0);
        assert_eq!(cast.approx(15.0), 0.0);

        // Endpoints are outside the open range
        assert_eq!(cast.evaluate(&FieldValue::Numeric(10.0)).method, ScoreMethod::Exact);
        assert_eq!(cast.compare(30.0), 1.0);
    }

    #[test]
    fn test_between_follows_trend() {
        let cast = trained(
            0.0,
            Propagation::Between,
            &[10.0, 20.0, 20.0, 30.0, 30.0, 30.0],
        );
        assert_close(cast.compare(15.0), 1.5);
        assert_close(cast.compare(25.0), 2.5);
        assert_eq!(cast.compare(35.0), 0.0);
    }

    #[test]
    fn test_between_far_from_origin() {
        let cast = trained(0.0, Propagation::Between, &[1000.0, 1003.0, 1003.0]);
        assert_close(cast.compare(1001.5), 1.5);
        assert!(cast.compare(1002.0) > cast.compare(1001.0));
    }

    #[test]
    fn test_up_never_extrapolates_below_min() {
        let cast = trained(0.0, Propagation::Up, &[10.0, 20.0, 20.0, 30.0, 30.0, 30.0]);
        assert_eq!(cast.compare(5.0), cast.approx(5.0));
        assert_eq!(cast.compare(5.0), 0.0);
        assert_eq!(cast.compare(10.0), 1.0);
        assert_close(cast.compare(40.0), 4.0);
        assert_eq!(
            cast.evaluate(&FieldValue::Numeric(40.0)).method,
            ScoreMethod::Extrapolated
        );
    }

    #[test]
    fn test_down_never_extrapolates_above_max() {
        let cast = trained(0.0, Propagation::Down, &[10.0, 10.0, 10.0, 20.0, 20.0, 30.0]);
        assert_eq!(cast.compare(40.0), 0.0);
        assert_eq!(cast.compare(30.0), 1.0);
        assert_close(cast.compare(0.0), 4.0);
    }

    #[test]
    fn test_negative_prediction_clamped() {
        // Decreasing counts: the line goes below zero far to the right
        let cast = trained(0.0, Propagation::Up, &[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(cast.compare(100.0), 0.0);
    }

    #[test]
    fn test_none_propagation_interpolates() {
        let cast = trained(0.1, Propagation::None, &[20.0, 21.0, 22.0, 40.0]);
        assert_close(cast.compare(21.0), 2.5);
        assert_eq!(
            cast.evaluate(&FieldValue::Numeric(21.0)).method,
            ScoreMethod::Interpolated
        );
    }

    #[test]
    fn test_regression_cache_invalidated_by_shape() {
        let mut cast = trained(0.0, Propagation::Between, &[10.0, 20.0, 30.0]);
        assert_close(cast.compare(15.0), 1.0);
        cast.shape(20.0).shape(30.0).shape(30.0);
        assert_close(cast.compare(15.0), 1.5);
    }

    #[test]
    fn test_training_is_monotonic() {
        let mut cast = trained(0.2, Propagation::None, &[5.0, 6.0, 9.0]);
        let before: Vec<f64> = [5.0, 6.0, 7.0, 9.0].iter().map(|x| cast.approx(*x)).collect();
        let max_before = cast.max_y();
        cast.shape(5.0).shape(6.0).shape(9.0);
        for (x, old) in [5.0, 6.0, 7.0, 9.0].iter().zip(before) {
            assert!(cast.approx(*x) >= old);
        }
        assert!(cast.max_y() >= max_before);
    }

    #[test]
    fn test_precision() {
        let cast = trained(0.0, Propagation::Up, &[0.0, 3.0])
            .with_precision(None);
        assert_eq!(cast.precision(), None);
        assert!(cast.regression().is_some());

        let cast = Cast::new(0.0, Propagation::Up);
        assert_eq!(cast.precision(), Some(DEFAULT_PRECISION));
    }

    #[test]
    fn test_try_new_rejects_invalid_spread() {
        assert!(Cast::try_new(0.25, Propagation::Up).is_ok());
        assert!(matches!(
            Cast::try_new(-0.1, Propagation::None),
            Err(Error::InvalidSpread(_))
        ));
        assert!(Cast::try_new(f64::NAN, Propagation::None).is_err());
    }

    #[test]
    fn test_cast_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cast>();
    }
}
