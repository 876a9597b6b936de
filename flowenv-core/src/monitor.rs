//! Episode statistics side files.
//!
//! An [`EpisodeLogger`] writes one row per finished episode into
//! `<logdir>/<env_id>.<seed>.monitor.csv`:
//!
//! ```text
//! #{"env_id":"CartPole-v1","t_start":1700000000.123}
//! r,l,t
//! 21.0,21,0.004512
//! ```
//!
//! where `r` is the episode return, `l` the episode length and `t` the
//! elapsed time in seconds since the logger was created.
use crate::{SimStep, Simulator};
use anyhow::{Context, Result};
use chrono::Utc;
use csv::{Writer, WriterBuilder};
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    fs::{create_dir_all, File},
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Debug, Serialize)]
struct MonitorRow {
    r: f32,
    l: u64,
    t: f64,
}

/// Writes episode statistics to a CSV file.
pub struct EpisodeLogger {
    writer: Writer<File>,
    path: PathBuf,
    t_start: Instant,
}

impl EpisodeLogger {
    /// Creates the log file in `logdir`, creating the directory if needed.
    pub fn new(logdir: impl AsRef<Path>, env_id: &str, seed: u64) -> Result<Self> {
        let logdir = logdir.as_ref();
        create_dir_all(logdir)
            .with_context(|| format!("Failed to create log directory {:?}", logdir))?;
        let path = logdir.join(format!("{}.{}.monitor.csv", env_id, seed));
        let mut file =
            File::create(&path).with_context(|| format!("Failed to create file {:?}", path))?;

        let t_start = Utc::now().timestamp_millis() as f64 / 1000.0;
        let header = serde_json::json!({ "t_start": t_start, "env_id": env_id });
        writeln!(file, "#{}", header)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&["r", "l", "t"])?;
        writer.flush()?;
        info!("Episode statistics are written to {:?}", path);

        Ok(Self {
            writer,
            path,
            t_start: Instant::now(),
        })
    }

    /// Appends a finished episode.
    pub fn write(&mut self, episode_return: f32, episode_len: u64) -> Result<()> {
        let row = MonitorRow {
            r: episode_return,
            l: episode_len,
            t: self.t_start.elapsed().as_secs_f64(),
        };
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Appends a finished episode, logging a warning if the file cannot be
    /// written. The episode has already ended when this is called.
    pub fn record(&mut self, episode_return: f32, episode_len: u64) {
        if let Err(e) = self.write(episode_return, episode_len) {
            warn!("Failed to write episode statistics to {:?}: {}", self.path, e);
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The number of recent episodes kept in memory by [`Monitor`] by default.
pub const DEFAULT_HISTORY: usize = 100;

/// A [`Simulator`] recording the return and length of finished episodes.
///
/// Every episode goes to the logger, if any. Only the last `history`
/// episodes are kept in memory.
pub struct Monitor<S> {
    sim: S,
    logger: Option<EpisodeLogger>,
    history: usize,
    rewards: f32,
    len: u64,
    episode_returns: Vec<f32>,
    episode_lengths: Vec<u64>,
}

impl<S: Simulator> Monitor<S> {
    /// Wraps a simulator. Statistics are also written to `logger`, if given.
    pub fn new(sim: S, logger: Option<EpisodeLogger>) -> Self {
        Self {
            sim,
            logger,
            history: DEFAULT_HISTORY,
            rewards: 0.0,
            len: 0,
            episode_returns: vec![],
            episode_lengths: vec![],
        }
    }

    /// Sets the number of recent episodes kept in memory.
    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history;
        self
    }

    /// Returns of recent finished episodes, oldest first.
    pub fn episode_returns(&self) -> &[f32] {
        &self.episode_returns
    }

    /// Lengths of recent finished episodes, oldest first.
    pub fn episode_lengths(&self) -> &[u64] {
        &self.episode_lengths
    }

    /// Returns a reference to the wrapped simulator.
    pub fn inner(&self) -> &S {
        &self.sim
    }
}

impl<S: Simulator> Simulator for Monitor<S> {
    type Obs = S::Obs;
    type Act = S::Act;

    fn reset(&mut self) -> Result<S::Obs> {
        self.rewards = 0.0;
        self.len = 0;
        self.sim.reset()
    }

    fn step(&mut self, act: &S::Act) -> Result<SimStep<S::Obs>> {
        let step = self.sim.step(act)?;
        self.rewards += step.reward;
        self.len += 1;

        if step.done {
            debug!("Monitor: r = {}, l = {}", self.rewards, self.len);
            self.episode_returns.push(self.rewards);
            self.episode_lengths.push(self.len);
            if self.episode_returns.len() > self.history {
                self.episode_returns.remove(0);
                self.episode_lengths.remove(0);
            }
            if let Some(logger) = self.logger.as_mut() {
                logger.record(self.rewards, self.len);
            }
        }

        Ok(step)
    }

    fn seed(&mut self, seed: u64) {
        self.sim.seed(seed);
    }

    fn close(&mut self) -> Result<()> {
        self.sim.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::ScriptedSimulator;
    use std::fs::read_to_string;
    use tempdir::TempDir;

    #[test]
    fn test_monitor_writes_episodes() -> Result<()> {
        let dir = TempDir::new("monitor")?;
        let logger = EpisodeLogger::new(dir.path().join("logs"), "Scripted-v0", 42)?;
        let path = logger.path().to_path_buf();
        let mut sim = Monitor::new(ScriptedSimulator::new(vec![1.0, 0.5]), Some(logger));

        sim.reset()?;
        for _ in 0..2 {
            sim.step(&0)?;
        }
        sim.reset()?;
        for _ in 0..2 {
            sim.step(&0)?;
        }

        assert_eq!(sim.episode_returns(), &[1.5, 1.5]);
        assert_eq!(sim.episode_lengths(), &[2, 2]);

        let content = read_to_string(&path)?;
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#{"));
        assert!(lines[0].contains("\"env_id\":\"Scripted-v0\""));
        assert_eq!(lines[1], "r,l,t");
        assert!(lines[2].starts_with("1.5,2,"));
        assert_eq!(path.file_name().unwrap(), "Scripted-v0.42.monitor.csv");
        Ok(())
    }

    #[test]
    fn test_monitor_keeps_recent_episodes() -> Result<()> {
        let sim = ScriptedSimulator::new(vec![1.0]);
        let mut sim = Monitor::new(sim, None).with_history(2);
        for i in 1..=3 {
            sim.reset()?;
            sim.step(&0)?;
            assert_eq!(sim.episode_returns().len(), i.min(2));
        }
        assert_eq!(sim.episode_lengths(), &[1, 1]);
        Ok(())
    }

    #[test]
    fn test_write_failure_does_not_fail_step() -> Result<()> {
        let dir = TempDir::new("monitor_readonly")?;
        let path = dir.path().join("readonly.monitor.csv");
        File::create(&path)?;

        // A read-only handle makes every flush fail.
        let logger = EpisodeLogger {
            writer: WriterBuilder::new()
                .has_headers(false)
                .from_writer(File::open(&path)?),
            path: path.clone(),
            t_start: Instant::now(),
        };
        let mut sim = Monitor::new(ScriptedSimulator::new(vec![2.0]), Some(logger));

        sim.reset()?;
        let step = sim.step(&0)?;
        assert!(step.done);
        assert_eq!(sim.episode_returns(), &[2.0]);
        assert_eq!(read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn test_monitor_discards_partial_episode() -> Result<()> {
        let mut sim = Monitor::new(ScriptedSimulator::new(vec![1.0, 1.0, 1.0]), None);
        sim.reset()?;
        sim.step(&0)?;
        sim.reset()?;
        for _ in 0..3 {
            sim.step(&0)?;
        }
        assert_eq!(sim.episode_returns(), &[3.0]);
        assert_eq!(sim.inner().n_resets(), 2);
        Ok(())
    }
}
