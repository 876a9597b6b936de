//! Configuration of a rollout.
use anyhow::Result;
use flowenv_atari_env::AtariConfig;
use flowenv_core::AdapterConfig;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`run`](crate::run).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RolloutConfig {
    /// Simulator to build.
    pub env: AdapterConfig,

    /// Preprocessing of Atari games, ignored for other simulators.
    pub atari: AtariConfig,

    /// The number of steps after the initial output.
    pub n_steps: usize,

    /// Seed of the random policy.
    pub policy_seed: u64,

    /// Where to write the episode summaries, if any.
    pub csv: Option<PathBuf>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            env: AdapterConfig::default().name("CartPole-v1"),
            atari: AtariConfig::default(),
            n_steps: 1000,
            policy_seed: 0,
            csv: None,
        }
    }
}

impl RolloutConfig {
    /// Sets the simulator configuration.
    pub fn env(mut self, env: AdapterConfig) -> Self {
        self.env = env;
        self
    }

    /// Sets the Atari preprocessing.
    pub fn atari(mut self, atari: AtariConfig) -> Self {
        self.atari = atari;
        self
    }

    /// Sets the number of steps.
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Sets the seed of the random policy.
    pub fn policy_seed(mut self, policy_seed: u64) -> Self {
        self.policy_seed = policy_seed;
        self
    }

    /// Sets the output CSV file.
    pub fn csv(mut self, csv: Option<PathBuf>) -> Self {
        self.csv = csv;
        self
    }

    /// Constructs [`RolloutConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RolloutConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
