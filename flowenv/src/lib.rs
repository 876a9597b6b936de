//! Random-policy rollouts of the simulators in this workspace.
//!
//! The workspace consists of the following crates:
//!
//! * `flowenv-core` provides the [`Simulator`](flowenv_core::Simulator) trait,
//!   the simulator adapter and the sequencing wrapper
//!   [`FlowEnv`](flowenv_core::FlowEnv).
//! * `flowenv-atari-env` applies the DeepMind preprocessing to Atari
//!   emulators.
//! * `flowenv-gym-env` has classic control simulators.
//! * `flowenv` (this crate) drives any of them with a random policy and
//!   ships the `flowenv-rollout` command.
mod config;
mod rollout;
pub use config::RolloutConfig;
pub use rollout::{known_ids, run, run_rollout, write_summaries_csv, EpisodeSummary};
