//! # castmatch Core
//!
//! Core library for castmatch.
//!
//! This crate provides the per-field statistical model:
//!
//! - [`FieldValue`] - A value classified once as numeric or categorical
//! - [`Propagation`] - Direction in which regression extrapolation is trusted
//! - [`Cast`] - Frequency histogram with spread grouping and value scoring
//!
//! ## Example
//!
//! ```rust
//! use castmatch_core::{Cast, Propagation};
//!
//! // Ages seen so far, merged within 10% of the largest value
//! let mut age = Cast::new(0.1, Propagation::None);
//! for value in [20.0, 21.0, 22.0, 40.0] {
//!     age.shape(value);
//! }
//!
//! assert_eq!(age.spread_distance(), 4.0);
//! assert_eq!(age.approx(21.0), 2.5);
//! assert_eq!(age.compare("unknown"), 0.0);
//! ```

pub mod cast;
pub mod error;
pub mod propagation;
pub mod value;

pub use cast::{Cast, Evaluation, Group, ScoreMethod};
pub use error::{Error, Result};
pub use propagation::Propagation;
pub use value::FieldValue;

// Re-export the regression types surfaced by `Cast::regression`
pub use castmatch_regression::{LinearFit, Predictor, DEFAULT_PRECISION};
