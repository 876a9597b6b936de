//! Configuration of [`SimulatorAdapter`](super::SimulatorAdapter).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Inputs consumed to construct a simulator.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AdapterConfig {
    /// Identifier of the simulator, e.g., `PongNoFrameskip-v4`.
    pub name: String,

    /// Seed of the simulator, applied right after construction.
    pub seed: u64,

    /// Seed of the preprocessing pipeline, if any.
    pub env_seed: Option<u64>,

    /// Directory for episode statistics side files.
    pub logdir: PathBuf,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: "".to_string(),
            seed: 0,
            env_seed: None,
            logdir: PathBuf::from("/tmp/"),
        }
    }
}

impl AdapterConfig {
    /// Sets the identifier of the simulator.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seed of the simulator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the seed of the preprocessing pipeline.
    pub fn env_seed(mut self, env_seed: Option<u64>) -> Self {
        self.env_seed = env_seed;
        self
    }

    /// Sets the directory for episode statistics.
    pub fn logdir(mut self, logdir: impl Into<PathBuf>) -> Self {
        self.logdir = logdir.into();
        self
    }

    /// Constructs [`AdapterConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AdapterConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
