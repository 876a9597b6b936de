//! Configuration of [`AtariEnv`](super::AtariEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Preprocessing parameters of [`AtariEnv`](super::AtariEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AtariConfig {
    /// Maximum number of no-op frames applied after a real reset.
    /// No no-ops are applied when 0.
    pub noop_max: usize,

    /// The number of frames an action is repeated.
    pub frame_skip: usize,

    /// The number of stacked frames in an observation.
    pub frame_stack: usize,

    /// Report `done` on life loss.
    pub episodic_life: bool,

    /// Press FIRE after reset in games requiring it.
    pub fire_reset: bool,

    /// Clip rewards to their sign.
    pub clip_rewards: bool,

    /// Write episode statistics into the log directory.
    pub monitor: bool,
}

impl Default for AtariConfig {
    fn default() -> Self {
        Self {
            noop_max: 30,
            frame_skip: 4,
            frame_stack: 4,
            episodic_life: true,
            fire_reset: true,
            clip_rewards: false,
            monitor: true,
        }
    }
}

impl AtariConfig {
    /// Sets the maximum number of no-op frames after reset.
    pub fn noop_max(mut self, v: usize) -> Self {
        self.noop_max = v;
        self
    }

    /// Sets the number of frames an action is repeated.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_stack(mut self, v: usize) -> Self {
        self.frame_stack = v;
        self
    }

    /// Sets episodic life.
    pub fn episodic_life(mut self, v: bool) -> Self {
        self.episodic_life = v;
        self
    }

    /// Sets fire reset.
    pub fn fire_reset(mut self, v: bool) -> Self {
        self.fire_reset = v;
        self
    }

    /// Sets reward clipping.
    pub fn clip_rewards(mut self, v: bool) -> Self {
        self.clip_rewards = v;
        self
    }

    /// Sets the monitor flag.
    pub fn monitor(mut self, v: bool) -> Self {
        self.monitor = v;
        self
    }

    /// Evaluation setting: no episodic life, no reward clipping.
    pub fn eval(mut self) -> Self {
        self.episodic_life = false;
        self.clip_rewards = false;
        self
    }

    /// Constructs [`AtariConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AtariConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
