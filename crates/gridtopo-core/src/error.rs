//! Unified error type for grid topology operations
//!
//! [`GridError`] separates the two failure classes topology derivation knows
//! about: a grid whose structure contradicts the modelling conventions
//! (ambiguous voltage levels, branching switch chains, missing upstream
//! nodes) and a grid whose topology is incomplete (dangling node references,
//! connectors the graph representation rejects).
//!
//! # Example
//!
//! ```ignore
//! use gridtopo_core::{GridError, GridResult};
//!
//! fn resolve(raw: &RawGridElements) -> GridResult<VoltageLevel> {
//!     let level = predominant_voltage_level(raw, 5)?;
//!     Ok(level)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all grid topology operations.
#[derive(Error, Debug)]
pub enum GridError {
    /// The grid contradicts a structural modelling convention
    #[error("Structural inconsistency: {0}")]
    StructuralInconsistency(String),

    /// A referenced node is missing or a connector cannot be represented
    #[error("Incomplete topology: {0}")]
    IncompleteTopology(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    pub fn structural(message: impl Into<String>) -> Self {
        GridError::StructuralInconsistency(message.into())
    }

    pub fn incomplete(message: impl Into<String>) -> Self {
        GridError::IncompleteTopology(message.into())
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for GridError {
    fn from(err: anyhow::Error) -> Self {
        GridError::Other(err.to_string())
    }
}
