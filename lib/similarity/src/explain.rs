//! Explainability for comparator scores
//!
//! Output structures showing how a similarity score was assembled from
//! per-field contributions.

use castmatch_core::ScoreMethod;
use serde::Serialize;
use std::collections::BTreeMap;

/// Contribution of one candidate field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScore {
    /// Raw (unnormalized) score of the field value
    pub score: f64,
    /// Best score this field can normally give, 0 for untrained fields
    pub max_y: f64,
    /// How the score was produced, `None` when the field was never trained
    /// or the value was empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ScoreMethod>,
}

impl FieldScore {
    /// Contribution of a field the comparator has never seen
    pub fn untrained() -> Self {
        Self {
            score: 0.0,
            max_y: 0.0,
            method: None,
        }
    }
}

/// A similarity score with its per-field breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// `total / max_output`, or 0 when `max_output` is 0
    pub score: f64,
    /// Sum of the candidate's field scores
    pub total: f64,
    /// Sum of `max_y` over every trained field
    pub max_output: f64,
    /// Candidate fields ordered by name
    pub fields: BTreeMap<String, FieldScore>,
}

impl ScoreBreakdown {
    /// Candidate field with the largest raw score
    pub fn top_contributing_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.score > 0.0)
            .max_by(|a, b| {
                a.1.score
                    .partial_cmp(&b.1.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(name, _)| name.as_str())
    }

    /// Candidate fields the comparator has never been trained on
    pub fn untrained_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.method.is_none() && field.max_y == 0.0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// A scored candidate from [`Comparator::rank`](crate::Comparator::rank)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// Position of the candidate in the input
    pub index: usize,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown() -> ScoreBreakdown {
        let mut fields = BTreeMap::new();
        fields.insert(
            "age".to_string(),
            FieldScore {
                score: 1.5,
                max_y: 2.5,
                method: Some(ScoreMethod::Interpolated),
            },
        );
        fields.insert(
            "status".to_string(),
            FieldScore {
                score: 2.0,
                max_y: 2.0,
                method: Some(ScoreMethod::Exact),
            },
        );
        fields.insert("unknown".to_string(), FieldScore::untrained());
        ScoreBreakdown {
            score: 3.5 / 4.5,
            total: 3.5,
            max_output: 4.5,
            fields,
        }
    }

    #[test]
    fn test_top_contributing_field() {
        assert_eq!(breakdown().top_contributing_field(), Some("status"));

        let empty = ScoreBreakdown {
            score: 0.0,
            total: 0.0,
            max_output: 0.0,
            fields: BTreeMap::new(),
        };
        assert_eq!(empty.top_contributing_field(), None);
    }

    #[test]
    fn test_untrained_fields() {
        assert_eq!(breakdown().untrained_fields(), vec!["unknown"]);
    }

    #[test]
    fn test_serialize_skips_missing_method() {
        let json = serde_json::to_value(FieldScore::untrained()).unwrap();
        assert!(json.get("method").is_none());

        let json = serde_json::to_value(breakdown()).unwrap();
        assert_eq!(json["fields"]["age"]["method"], "interpolated");
    }
}
