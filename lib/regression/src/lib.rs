//! # castmatch Regression
//!
//! Curve fitting used by castmatch to extrapolate a field's frequency
//! beyond the values it has actually observed.
//!
//! Only the straight line is provided. A fit is built from `(x, y)` pairs
//! and answers `predict(x) -> (x, y)`:
//!
//! ```rust
//! use castmatch_regression::{LinearFit, Predictor};
//!
//! let fit = LinearFit::fit(&[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0)]).unwrap();
//! assert_eq!(fit.predict(15.0), (15.0, 1.5));
//! ```

pub mod linear;

pub use linear::{LinearFit, DEFAULT_PRECISION};

/// Anything that maps an `x` coordinate to a predicted `(x, y)` point.
pub trait Predictor {
    fn predict(&self, x: f64) -> (f64, f64);
}
