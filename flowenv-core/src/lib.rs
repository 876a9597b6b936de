#![warn(missing_docs)]
//! Sequenced environment stepping.
//!
//! * [`Simulator`] is the raw interface of a game emulator or physics model.
//! * [`SimulatorAdapter`] owns one simulator, seeds it at construction and
//!   resets it automatically when an episode ends.
//! * [`FlowEnv`] wraps an adapter into an explicit state-passing protocol:
//!   every transition returns an [`EnvState`] which must be handed to the next
//!   transition, and running totals of the current episode are carried in it.
pub mod dummy;
pub mod error;
pub mod monitor;
pub mod registry;

mod adapter;
mod base;
mod flow;
pub use adapter::{AdapterConfig, SimulatorAdapter};
pub use base::{DiscreteActionSpace, SimStep, Simulator};
pub use flow::{EnvState, EpisodeInfo, FlowEnv, StepOutput};
