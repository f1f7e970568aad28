//! # castmatch Similarity
//!
//! Scores how well a record matches a previously observed population of
//! records, field by field.
//!
//! ## Features
//!
//! - **Configuration**: Per-field spread and propagation, loadable from JSON
//! - **Training**: One frequency model ([`Cast`](castmatch_core::Cast)) per field, created lazily
//! - **Scoring**: Sum of field scores normalized by the best achievable sum
//! - **Explainability**: Per-field contribution breakdown and candidate ranking
//! - **Flattening**: Nested records become `_`-joined flat fields
//!
//! ## Example
//!
//! ```rust
//! use castmatch_similarity::{Comparator, ComparatorConfig, FieldConfig};
//! use castmatch_core::Propagation;
//! use serde_json::json;
//!
//! let config = ComparatorConfig::new()
//!     .with_field("age", FieldConfig::new(0.1, Propagation::None));
//!
//! let mut comparator = Comparator::new(config);
//! comparator.train(&json!([
//!     {"status": "ok", "age": 20},
//!     {"status": "ok", "age": 21},
//!     {"status": "fail", "age": 40}
//! ]));
//!
//! let typical = comparator.test(&json!({"status": "ok", "age": 21}));
//! let unusual = comparator.test(&json!({"status": "fail", "age": 90}));
//! assert!(typical > unusual);
//! assert_eq!(comparator.test(&json!({})), 0.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Config    │────>│ Comparator  │────>│ Cast/field  │
//! │  (fields)   │     │   (train)   │     │ (histogram) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                     ┌─────────────┐            │
//!                     │    test     │<───────────┘
//!                     │ (candidate) │
//!                     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │   Explain   │
//!                     │  (fields)   │
//!                     └─────────────┘
//! ```

pub mod comparator;
pub mod config;
pub mod explain;
pub mod flatten;

// Re-export main types for convenience
pub use comparator::Comparator;
pub use config::{ComparatorConfig, ConfigError, FieldConfig};
pub use explain::{FieldScore, RankedCandidate, ScoreBreakdown};
pub use flatten::{flatten, KEY_SEPARATOR};
