//! Comparator configuration
//!
//! Maps field names to the spread and propagation their [`Cast`] is created
//! with. Fields without an entry fall back to [`FieldConfig::default`]
//! (no spread, no propagation).
//!
//! Entries accept the compact pair form as well as an explicit struct:
//!
//! ```json
//! {
//!     "age": [0.1, "up"],
//!     "score": [0.05],
//!     "visits": { "spread": 0.2, "propagation": "between", "precision": 3 }
//! }
//! ```

use castmatch_core::{Cast, Propagation, DEFAULT_PRECISION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Configuration for a single field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldConfigRepr")]
pub struct FieldConfig {
    /// Fraction of the largest observed value used as merge radius
    pub spread: f64,

    /// Direction in which regression extrapolation is trusted
    pub propagation: Propagation,

    /// Decimals kept by the regression line (`None` = unrounded)
    pub precision: Option<u32>,
}

fn default_precision() -> Option<u32> {
    Some(DEFAULT_PRECISION)
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            spread: 0.0,
            propagation: Propagation::None,
            precision: default_precision(),
        }
    }
}

impl FieldConfig {
    pub fn new(spread: f64, propagation: Propagation) -> Self {
        Self {
            spread,
            propagation,
            ..Self::default()
        }
    }

    /// Spread only, no propagation
    pub fn spread(spread: f64) -> Self {
        Self::new(spread, Propagation::None)
    }

    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }

    /// Create an empty cast configured by this entry
    pub fn build_cast(&self) -> Cast {
        Cast::new(self.spread, self.propagation).with_precision(self.precision)
    }
}

/// Accepted spellings of a field entry
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldConfigRepr {
    Pair(f64, Option<Propagation>),
    Single((f64,)),
    Spread(f64),
    Full {
        #[serde(default)]
        spread: f64,
        #[serde(default)]
        propagation: Option<Propagation>,
        #[serde(default = "default_precision")]
        precision: Option<u32>,
    },
}

impl From<FieldConfigRepr> for FieldConfig {
    fn from(repr: FieldConfigRepr) -> Self {
        match repr {
            FieldConfigRepr::Pair(spread, propagation) => {
                FieldConfig::new(spread, propagation.unwrap_or_default())
            }
            FieldConfigRepr::Single((spread,)) | FieldConfigRepr::Spread(spread) => {
                FieldConfig::spread(spread)
            }
            FieldConfigRepr::Full {
                spread,
                propagation,
                precision,
            } => FieldConfig::new(spread, propagation.unwrap_or_default()).with_precision(precision),
        }
    }
}

/// Per-field configuration keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparatorConfig {
    fields: HashMap<String, FieldConfig>,
}

impl ComparatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.fields.insert(name.into(), config);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, config: FieldConfig) -> Option<FieldConfig> {
        self.fields.insert(name.into(), config)
    }

    /// Configured entry for `name`, if any
    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    /// Entry for `name`, or the default when the field is not configured
    pub fn field(&self, name: &str) -> FieldConfig {
        self.fields.get(name).copied().unwrap_or_default()
    }

    /// Field names in a deterministic order (sorted)
    pub fn sorted_field_names(&self) -> Vec<&String> {
        let mut names: Vec<_> = self.fields.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that every spread is finite and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.sorted_field_names() {
            let spread = self.fields[name].spread;
            if !spread.is_finite() {
                return Err(ConfigError::NonFiniteSpread(name.clone()));
            }
            if spread < 0.0 {
                return Err(ConfigError::NegativeSpread(name.clone()));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl<S: Into<String>> FromIterator<(S, FieldConfig)> for ComparatorConfig {
    fn from_iter<I: IntoIterator<Item = (S, FieldConfig)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(name, config)| (name.into(), config)).collect(),
        }
    }
}

/// Errors that can occur while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Field '{0}' has negative spread")]
    NegativeSpread(String),

    #[error("Field '{0}' has a non-finite spread")]
    NonFiniteSpread(String),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
