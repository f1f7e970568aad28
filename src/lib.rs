//! # castmatch
//!
//! Fuzzy scoring of structured records against the records seen so far.
//!
//! castmatch keeps one frequency model per field. Numeric values close to each
//! other (within a configurable spread) reinforce each other, and numeric
//! fields may follow a regression line beyond the observed range in the
//! direction their propagation allows. A candidate record's score is the sum
//! of its field scores normalized by the best achievable sum.
//!
//! ## Quick Start
//!
//! ```rust
//! use castmatch::prelude::*;
//! use serde_json::json;
//!
//! let config = ComparatorConfig::from_json_str(r#"{"age": [0.1, "between"]}"#).unwrap();
//! let mut comparator = Comparator::new(config);
//!
//! comparator.train(&json!([
//!     {"status": "ok", "age": 20},
//!     {"status": "ok", "age": 30},
//!     {"status": "fail", "age": 40}
//! ]));
//!
//! let score = comparator.test(&json!({"status": "ok", "age": 25}));
//! assert!(score > 0.0);
//! ```
//!
//! ## Crate Structure
//!
//! castmatch is composed of several crates:
//!
//! - `castmatch-regression` - Least squares line fitting
//! - `castmatch-core` - Per-field model ([`Cast`]), [`FieldValue`], [`Propagation`]
//! - `castmatch-similarity` - [`Comparator`], configuration, explain, [`flatten`]
//!
//! ## Features
//!
//! - **Spread grouping**: nearby numeric values merge with linear falloff
//! - **Directional extrapolation**: regression trusted only up, down or between bounds
//! - **Explainability**: per-field score breakdown and candidate ranking
//! - **Nested records**: `_`-joined flattening of nested JSON

// Re-export core types
pub use castmatch_core::{
    Cast, Error, Evaluation, FieldValue, Group, Propagation, Result, ScoreMethod,
};

// Re-export regression
pub use castmatch_regression::{LinearFit, Predictor, DEFAULT_PRECISION};

// Re-export similarity
pub use castmatch_similarity::{
    flatten, Comparator, ComparatorConfig, ConfigError, FieldConfig, FieldScore,
    RankedCandidate, ScoreBreakdown, KEY_SEPARATOR,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        flatten, Cast, Comparator, ComparatorConfig, ConfigError, FieldConfig, FieldValue,
        Propagation, ScoreBreakdown,
    };
}
