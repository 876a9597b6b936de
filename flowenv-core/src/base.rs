//! Core traits.
mod simulator;
mod step;
pub use simulator::{DiscreteActionSpace, Simulator};
pub use step::SimStep;
