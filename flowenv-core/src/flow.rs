//! Sequencing wrapper.
//!
//! [`FlowEnv`] turns the call interface of [`SimulatorAdapter`] into an
//! explicit state-passing protocol. Every transition returns a new
//! [`EnvState`], which must be passed to the next transition. A token other
//! than the most recently issued one is rejected with
//! [`FlowEnvError::OutOfOrderStep`] before the simulator is touched.
//!
//! ```
//! use flowenv_core::{dummy::ScriptedSimulator, FlowEnv, SimulatorAdapter};
//! # fn main() -> anyhow::Result<()> {
//! let sim = ScriptedSimulator::new(vec![1.0, 2.0, 3.0]);
//! let mut env = FlowEnv::new(SimulatorAdapter::new(sim, "scripted"));
//!
//! let (output, mut state) = env.initial()?;
//! assert!(output.done);
//!
//! for _ in 0..3 {
//!     let (output, next_state) = env.step(&0, &state)?;
//!     state = next_state;
//!     if output.done {
//!         assert_eq!(output.info.episode_return, 6.0);
//!     }
//! }
//! assert_eq!(state.sequence_counter(), 3);
//! # Ok(())
//! # }
//! ```
use crate::{error::FlowEnvError, SimStep, Simulator, SimulatorAdapter};
use anyhow::Result;
use log::{debug, trace};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

/// Running totals of the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EpisodeInfo {
    /// Sum of raw rewards in the episode.
    pub episode_return: f32,

    /// The number of transitions in the episode.
    pub episode_step: u64,
}

impl EpisodeInfo {
    /// Totals of an episode which has not started yet.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Result of one environment transition.
///
/// `reward` and `done` are those of the transition which led to
/// `observation`. When `done` is true, `info` holds the totals of the episode
/// that just ended, including `reward`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput<O> {
    /// Reward of the transition.
    pub reward: f32,

    /// Totals of the current or just completed episode.
    pub info: EpisodeInfo,

    /// Flag denoting if the transition ended an episode.
    pub done: bool,

    /// Observation after the transition.
    pub observation: O,
}

/// Ordering token threaded between consecutive transitions.
///
/// It can only be obtained from [`FlowEnv::initial`] or [`FlowEnv::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnvState {
    instance: u64,
    generation: u64,
    flow: u64,
    info: EpisodeInfo,
}

impl EnvState {
    /// The number of transitions applied since the last `initial()`.
    pub fn sequence_counter(&self) -> u64 {
        self.flow
    }

    /// Totals carried into the next transition.
    pub fn info(&self) -> &EpisodeInfo {
        &self.info
    }
}

impl fmt::Display for EnvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flow {} of generation {} on environment {}",
            self.flow, self.generation, self.instance
        )
    }
}

/// An environment that returns a new state for every modifying method.
///
/// A transition can only be applied with the state returned by the previous
/// transition, which forces transitions to happen in the order they were
/// issued.
pub struct FlowEnv<S: Simulator> {
    adapter: SimulatorAdapter<S>,

    // Unique among all instances in the process.
    instance: u64,

    // Incremented by every call of initial().
    generation: u64,

    // Sequence counter of the latest issued token, None before initial().
    flow: Option<u64>,
}

impl<S: Simulator> FlowEnv<S> {
    /// Wraps an adapter.
    pub fn new(adapter: SimulatorAdapter<S>) -> Self {
        Self {
            adapter,
            instance: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            flow: None,
        }
    }

    /// Returns the initial output and the initial state.
    ///
    /// The output is marked `done` with zero reward and zero totals, meaning
    /// that no prior episode contributed to the observation. Tokens issued
    /// before this call become stale.
    pub fn initial(&mut self) -> Result<(StepOutput<S::Obs>, EnvState)> {
        trace!("FlowEnv::initial()");
        let observation = self.adapter.initial()?;

        if self.flow.is_some() {
            self.generation += 1;
        }
        self.flow = Some(0);

        let output = StepOutput {
            reward: 0.0,
            info: EpisodeInfo::zero(),
            done: true,
            observation,
        };
        let state = EnvState {
            instance: self.instance,
            generation: self.generation,
            flow: 0,
            info: EpisodeInfo::zero(),
        };

        Ok((output, state))
    }

    /// Takes a step in the environment.
    ///
    /// `state` must be the state returned by the latest call of
    /// [`FlowEnv::initial`] or [`FlowEnv::step`] on this instance. On episode
    /// end, the reward is counted in the totals of the ending episode and
    /// the returned state carries zero totals into the next one.
    ///
    /// If the simulator fails, `state` remains the current token. A failed
    /// reset after episode end leaves the adapter uninitialized, so retrying
    /// with `state` fails with [`FlowEnvError::NotInitialized`] until
    /// [`FlowEnv::initial`] is called.
    pub fn step(&mut self, act: &S::Act, state: &EnvState) -> Result<(StepOutput<S::Obs>, EnvState)> {
        trace!("FlowEnv::step()");
        self.check(state)?;

        let SimStep { obs, reward, done } = self.adapter.step(act)?;

        let info = EpisodeInfo {
            episode_return: state.info.episode_return + reward,
            episode_step: state.info.episode_step + 1,
        };
        let carry = if done {
            debug!(
                "Episode ended: return = {}, steps = {}",
                info.episode_return, info.episode_step
            );
            EpisodeInfo::zero()
        } else {
            info
        };

        let flow = state.flow + 1;
        self.flow = Some(flow);

        let output = StepOutput {
            reward,
            info,
            done,
            observation: obs,
        };
        let state = EnvState {
            instance: self.instance,
            generation: self.generation,
            flow,
            info: carry,
        };

        Ok((output, state))
    }

    /// Returns a reference to the wrapped adapter.
    pub fn adapter(&self) -> &SimulatorAdapter<S> {
        &self.adapter
    }

    /// Unwraps the adapter, e.g., to close it.
    pub fn into_adapter(self) -> SimulatorAdapter<S> {
        self.adapter
    }

    fn check(&self, state: &EnvState) -> Result<()> {
        let current = match self.flow {
            Some(flow)
                if state.instance == self.instance
                    && state.generation == self.generation
                    && state.flow == flow =>
            {
                return Ok(())
            }
            Some(flow) => format!(
                "flow {} of generation {} on environment {}",
                flow, self.generation, self.instance
            ),
            None => format!("no state issued yet on environment {}", self.instance),
        };

        Err(FlowEnvError::OutOfOrderStep {
            expected: current,
            found: state.to_string(),
        }
        .into())
    }
}
