//! Simulator.
use super::SimStep;
use anyhow::Result;
use std::fmt::Debug;

/// Represents a raw simulator, typically a game emulator or a physics model.
///
/// A simulator does not reset itself when an episode ends. Automatic reset is
/// the job of [`SimulatorAdapter`](crate::SimulatorAdapter).
pub trait Simulator {
    /// Observation of the simulator.
    type Obs: Clone + Debug;

    /// Action of the simulator.
    type Act: Debug;

    /// Resets the simulator to the start of a fresh episode and returns the
    /// first observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Applies an action.
    ///
    /// Actions outside of the domain of the simulator must fail with
    /// [`FlowEnvError::InvalidAction`](crate::error::FlowEnvError::InvalidAction).
    fn step(&mut self, act: &Self::Act) -> Result<SimStep<Self::Obs>>;

    /// Seeds the random number generator of the simulator.
    fn seed(&mut self, seed: u64);

    /// Releases resources held by the simulator. Does nothing by default.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A simulator with a finite set of actions indexed by `0..n_actions()`.
pub trait DiscreteActionSpace {
    /// Returns the number of actions.
    fn n_actions(&self) -> usize;
}
