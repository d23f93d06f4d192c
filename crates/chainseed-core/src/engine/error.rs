use thiserror::Error;

use crate::core::models::cell::InvalidParameter;

/// Failures of the coordinate generators.
///
/// Every variant is terminal for the call that produced it, and no partially
/// built configuration is ever returned alongside it. The attempt counts tell
/// the caller how much of the budget was consumed before giving up.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),

    #[error(
        "Could not place point {slot} without overlap after {attempts} attempts (lower rmin, enlarge the box or raise max_attempts)"
    )]
    PlacementExhausted { slot: usize, attempts: usize },

    #[error(
        "Failed to grow a self-avoiding chain after {restarts} restarts (last attempt stalled at monomer {stalled_at})"
    )]
    ChainGenerationFailure { restarts: usize, stalled_at: usize },
}

/// Failure of a complete seeding run, tagged with where it happened.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Failed to place molecule {molecule} of species '{species}': {source}")]
    Species {
        species: String,
        molecule: usize,
        #[source]
        source: GenerationError,
    },
}
