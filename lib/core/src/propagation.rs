//! Propagation policy
//!
//! Declares in which direction a field's frequencies may be extrapolated
//! beyond the observed numeric range with the regression line.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    /// Never extrapolate, always interpolate over observed values
    #[default]
    None,
    /// Trust the line above the smallest observed value
    Up,
    /// Trust the line below the largest observed value
    Down,
    /// Trust the line strictly inside the observed range
    Between,
}

impl Propagation {
    /// Whether the regression line may be used at `x` given the observed bounds
    pub fn allows(self, x: f64, min_x: f64, max_x: f64) -> bool {
        match self {
            Propagation::None => false,
            Propagation::Up => x > min_x,
            Propagation::Down => x < max_x,
            Propagation::Between => x > min_x && x < max_x,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Propagation::None => "none",
            Propagation::Up => "up",
            Propagation::Down => "down",
            Propagation::Between => "between",
        }
    }
}

impl FromStr for Propagation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Propagation::None),
            "up" => Ok(Propagation::Up),
            "down" => Ok(Propagation::Down),
            "between" => Ok(Propagation::Between),
            _ => Err(Error::UnknownPropagation(s.to_string())),
        }
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
