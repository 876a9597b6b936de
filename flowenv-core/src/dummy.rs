//! This module is used for tests.
use crate::{error::FlowEnvError, DiscreteActionSpace, SimStep, Simulator};
use anyhow::{anyhow, Result};

/// Observation of [`ScriptedSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedObs {
    /// Index of the episode, counted from 0.
    pub episode: usize,

    /// Step in the episode.
    pub t: usize,
}

/// A deterministic simulator replaying a fixed reward sequence.
///
/// Every episode lasts `rewards.len()` steps and emits `rewards` in order.
pub struct ScriptedSimulator {
    rewards: Vec<f32>,
    n_actions: usize,
    episode: Option<usize>,
    t: usize,
    n_steps: usize,
    n_resets: usize,
    seed: Option<u64>,
    closed: bool,
    max_resets: Option<usize>,
    failing_close: bool,
}

impl ScriptedSimulator {
    /// Constructs a simulator with 4 actions.
    pub fn new(rewards: Vec<f32>) -> Self {
        assert!(!rewards.is_empty());
        Self {
            rewards,
            n_actions: 4,
            episode: None,
            t: 0,
            n_steps: 0,
            n_resets: 0,
            seed: None,
            closed: false,
            max_resets: None,
            failing_close: false,
        }
    }

    /// Sets the number of actions.
    pub fn with_n_actions(mut self, n_actions: usize) -> Self {
        self.n_actions = n_actions;
        self
    }

    /// Makes `reset()` fail once it has been called `n` times.
    pub fn with_max_resets(mut self, n: usize) -> Self {
        self.max_resets = Some(n);
        self
    }

    /// Makes `close()` fail.
    pub fn with_failing_close(mut self) -> Self {
        self.failing_close = true;
        self
    }

    /// The number of applied actions.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// The number of resets.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// The seed given to the simulator.
    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }

    /// True if `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Simulator for ScriptedSimulator {
    type Obs = ScriptedObs;
    type Act = usize;

    fn reset(&mut self) -> Result<ScriptedObs> {
        if self.max_resets.map_or(false, |n| self.n_resets >= n) {
            return Err(anyhow!("reset limit of {} reached", self.n_resets));
        }
        let episode = self.episode.map_or(0, |e| e + 1);
        self.episode = Some(episode);
        self.t = 0;
        self.n_resets += 1;
        Ok(ScriptedObs { episode, t: 0 })
    }

    fn step(&mut self, act: &usize) -> Result<SimStep<ScriptedObs>> {
        if *act >= self.n_actions {
            return Err(FlowEnvError::InvalidAction(format!(
                "{} is not in 0..{}",
                act, self.n_actions
            ))
            .into());
        }

        let reward = self.rewards[self.t % self.rewards.len()];
        self.t += 1;
        self.n_steps += 1;
        let done = self.t >= self.rewards.len();
        let obs = ScriptedObs {
            episode: self.episode.unwrap_or(0),
            t: self.t,
        };

        Ok(SimStep::new(obs, reward, done))
    }

    fn seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        if self.failing_close {
            return Err(anyhow!("failed to close"));
        }
        Ok(())
    }
}

impl DiscreteActionSpace for ScriptedSimulator {
    fn n_actions(&self) -> usize {
        self.n_actions
    }
}
