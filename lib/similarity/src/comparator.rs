//! Record comparator
//!
//! Trains one [`Cast`] per field from observed records and scores candidate
//! records against them. The score of a candidate is the sum of its field
//! scores divided by the sum of the best score every trained field can give.

use crate::config::ComparatorConfig;
use crate::explain::{FieldScore, RankedCandidate, ScoreBreakdown};
use crate::flatten::flatten;
use ahash::AHashMap;
use castmatch_core::{Cast, FieldValue};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Per-field frequency models over a population of records
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    config: ComparatorConfig,
    casts: AHashMap<String, Cast>,
}

impl Comparator {
    /// Create an untrained comparator
    pub fn new(config: ComparatorConfig) -> Self {
        Self {
            config,
            casts: AHashMap::new(),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Train on one record or an array of records.
    ///
    /// Each record is a flat JSON object. A field's cast is created the first
    /// time the field is seen, from its configuration entry. Array values
    /// stand for their first element; empty arrays are skipped.
    pub fn train(&mut self, value: &Value) {
        let trained = match value {
            Value::Array(records) => records
                .iter()
                .filter(|record| self.train_record(record))
                .count(),
            record => usize::from(self.train_record(record)),
        };
        debug!(records = trained, fields = self.casts.len(), "trained comparator");
    }

    fn train_record(&mut self, record: &Value) -> bool {
        let Some(fields) = record.as_object() else {
            warn!(record = %record, "ignoring non-object record");
            return false;
        };

        for (name, value) in fields {
            let Some(value) = FieldValue::from_json(value) else {
                continue;
            };
            match self.casts.get_mut(name) {
                Some(cast) => {
                    cast.shape(value);
                }
                None => {
                    let mut cast = self.config.field(name).build_cast();
                    cast.shape(value);
                    self.casts.insert(name.clone(), cast);
                }
            }
        }
        true
    }

    /// Flatten nested records, then train on them
    pub fn train_nested(&mut self, value: &Value) {
        match value {
            Value::Array(records) => {
                let flattened: Vec<Value> = records
                    .iter()
                    .map(|record| Value::Object(flatten(record)))
                    .collect();
                self.train(&Value::Array(flattened));
            }
            record => self.train(&Value::Object(flatten(record))),
        }
    }

    /// Similarity of `candidate` to the trained population.
    ///
    /// Normally in `[0, 1]`; extrapolated fields can push it above 1.
    /// Returns 0 when nothing has been trained.
    pub fn test(&self, candidate: &Value) -> f64 {
        self.explain(candidate).score
    }

    /// Flatten a nested candidate, then test it
    pub fn test_nested(&self, candidate: &Value) -> f64 {
        self.test(&Value::Object(flatten(candidate)))
    }

    /// Score `candidate` and keep the per-field breakdown
    pub fn explain(&self, candidate: &Value) -> ScoreBreakdown {
        // Summed in name order
        let max_ys: BTreeMap<&str, f64> = self
            .casts
            .iter()
            .map(|(name, cast)| (name.as_str(), cast.max_y()))
            .collect();
        let max_output: f64 = max_ys.values().sum();

        let mut fields = BTreeMap::new();
        match candidate.as_object() {
            Some(entries) => {
                for (name, value) in entries {
                    let field_score = match self.casts.get(name) {
                        Some(cast) => {
                            let max_y = max_ys.get(name.as_str()).copied().unwrap_or(0.0);
                            match FieldValue::from_json(value) {
                                Some(value) => {
                                    let evaluation = cast.evaluate(&value);
                                    FieldScore {
                                        score: evaluation.score,
                                        max_y,
                                        method: Some(evaluation.method),
                                    }
                                }
                                None => FieldScore {
                                    score: 0.0,
                                    max_y,
                                    method: None,
                                },
                            }
                        }
                        None => FieldScore::untrained(),
                    };
                    fields.insert(name.clone(), field_score);
                }
            }
            None => warn!(candidate = %candidate, "scoring non-object candidate as 0"),
        }

        let total: f64 = fields.values().map(|field| field.score).sum();
        let score = if max_output > 0.0 {
            total / max_output
        } else {
            0.0
        };
        debug!(score, total, max_output, fields = fields.len(), "tested candidate");

        ScoreBreakdown {
            score,
            total,
            max_output,
            fields,
        }
    }

    /// Score every candidate and sort by descending similarity.
    ///
    /// Ties keep their input order.
    pub fn rank(&self, candidates: &[Value]) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| RankedCandidate {
                index,
                score: self.test(candidate),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Cast trained for `name`, if the field has been seen
    pub fn cast(&self, name: &str) -> Option<&Cast> {
        self.casts.get(name)
    }

    /// Trained field names in a deterministic order (sorted)
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.casts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sum of `max_y` over every trained field, the denominator of `test`
    pub fn max_output(&self) -> f64 {
        self.fields()
            .into_iter()
            .filter_map(|name| self.casts.get(name))
            .map(Cast::max_y)
            .sum()
    }

    /// Number of trained fields
    pub fn len(&self) -> usize {
        self.casts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }
}
