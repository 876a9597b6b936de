//! Errors in the library.
use thiserror::Error;

/// Errors raised by simulators, adapters and the sequencing wrapper.
///
/// Functions in this workspace return [`anyhow::Result`]. Use
/// `err.downcast_ref::<FlowEnvError>()` to match on a specific kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowEnvError {
    /// The simulator could not be constructed, e.g., unknown identifier or
    /// unavailable backend.
    #[error("Construction error: {0}")]
    ConstructionError(String),

    /// The action is outside of the domain accepted by the simulator.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// `step()` was called with a state token other than the one most
    /// recently issued by the same wrapper.
    #[error("Out of order step: expected {expected}, got {found}")]
    OutOfOrderStep {
        /// Description of the token that was expected.
        expected: String,
        /// Description of the token that was given.
        found: String,
    },

    /// `step()` was called on an adapter before `initial()`.
    #[error("Simulator adapter is not initialized, call initial() first")]
    NotInitialized,
}
