use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid spread: {0} (must be finite and non-negative)")]
    InvalidSpread(f64),

    #[error("Unknown propagation: '{0}' (expected up, down, between or none)")]
    UnknownPropagation(String),
}
