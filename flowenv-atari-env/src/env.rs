mod config;
use crate::{AtariAct, AtariAction, AtariBackend, AtariObs, FRAME_HEIGHT, FRAME_WIDTH};
use anyhow::{Context, Result};
pub use config::AtariConfig;
use flowenv_core::{
    error::FlowEnvError, monitor::EpisodeLogger, AdapterConfig, DiscreteActionSpace, SimStep,
    Simulator,
};
use image::{
    imageops::{grayscale, resize, FilterType::Triangle},
    ImageBuffer, Rgb,
};
use log::{debug, info, trace};
use std::collections::VecDeque;

/// A wrapper of an Atari emulator applying the DeepMind preprocessing.
///
/// * After a real reset, a random number (`1..=noop_max`) of no-op frames
///   is emulated.
/// * In games which require it, FIRE is pressed after every reset,
///   including the one following a lost life.
/// * An action is repeated `frame_skip` times; rewards are summed and the
///   observed frame is the pixel-wise maximum of the last two screens.
/// * With `episodic_life`, losing a life ends the episode; the following
///   reset only takes a no-op step instead of resetting the game.
/// * Frames are converted to grayscale, resized to 84×84 and the last
///   `frame_stack` frames are stacked along the channel axis.
/// * With `clip_rewards`, rewards are replaced by their sign.
///
/// Real game overs are written to the episode monitor, with unclipped returns.
pub struct AtariEnv<B: AtariBackend> {
    backend: B,
    config: AtariConfig,
    actions: Vec<AtariAction>,

    // Random numbers for no-op resets
    rng: fastrand::Rng,

    // True if the no-op rng was given its own seed
    env_seeded: bool,

    // Lives in the game
    lives: usize,

    // If the game was really over, not only a life lost
    was_real_done: bool,

    // The last two screens for max pooling
    obs_buffer: [Vec<u8>; 2],

    // Stack of preprocessed frames, oldest first
    frames: VecDeque<Vec<u8>>,

    logger: Option<EpisodeLogger>,
    real_return: f32,
    real_len: u64,
}

impl<B: AtariBackend> AtariEnv<B> {
    /// Wraps an emulator.
    ///
    /// An episode monitor is opened in `adapter_config.logdir` if
    /// `config.monitor` is set. No-op resets are seeded with
    /// `adapter_config.env_seed`; without it they follow [`Simulator::seed`].
    pub fn build(backend: B, config: &AtariConfig, adapter_config: &AdapterConfig) -> Result<Self> {
        if config.frame_skip == 0 || config.frame_stack == 0 {
            return Err(FlowEnvError::ConstructionError(
                "frame_skip and frame_stack must be positive".to_string(),
            )
            .into());
        }

        let logger = if config.monitor {
            Some(
                EpisodeLogger::new(&adapter_config.logdir, &adapter_config.name, adapter_config.seed)
                    .context("Failed to open episode monitor")?,
            )
        } else {
            None
        };

        let (rng, env_seeded) = match adapter_config.env_seed {
            Some(seed) => (fastrand::Rng::with_seed(seed), true),
            None => (fastrand::Rng::with_seed(adapter_config.seed), false),
        };

        let n = backend.width() * backend.height() * 3;
        let actions = backend.minimal_actions();
        info!(
            "AtariEnv: {}x{} screen, {} actions, {:?}",
            backend.width(),
            backend.height(),
            actions.len(),
            config
        );

        Ok(Self {
            actions,
            rng,
            env_seeded,
            lives: 0,
            was_real_done: true,
            obs_buffer: [vec![0; n], vec![0; n]],
            frames: VecDeque::with_capacity(config.frame_stack),
            logger,
            real_return: 0.0,
            real_len: 0,
            config: config.clone(),
            backend,
        })
    }

    /// Returns a reference to the emulator.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the minimal action set of the game.
    pub fn actions(&self) -> &[AtariAction] {
        &self.actions
    }

    // Renders the current screen into the newest slot of the pooling buffer.
    fn render(&mut self) {
        self.obs_buffer.swap(0, 1);
        self.backend.render_rgb24(&mut self.obs_buffer[1]);
    }

    // Repeats an action and returns the total reward and the game-over flag.
    fn skip_and_max(&mut self, action: AtariAction) -> (f32, bool) {
        let mut total_reward = 0f32;
        let mut game_over = false;

        for _ in 0..self.config.frame_skip {
            total_reward += self.backend.act(action) as f32;
            self.render();
            game_over = self.backend.is_game_over();
            if game_over {
                break;
            }
        }

        (total_reward, game_over)
    }

    fn max_pooled(&self) -> Vec<u8> {
        self.obs_buffer[0]
            .iter()
            .zip(self.obs_buffer[1].iter())
            .map(|(&a, &b)| a.max(b))
            .collect()
    }

    fn warp_and_grayscale(&self, obs: Vec<u8>) -> Result<Vec<u8>> {
        let (w, h) = (self.backend.width() as u32, self.backend.height() as u32);
        let img = ImageBuffer::<Rgb<u8>, _>::from_vec(w, h, obs)
            .context("Screen buffer does not match the screen size")?;
        let img = grayscale(&img);
        let img = resize(&img, FRAME_WIDTH as u32, FRAME_HEIGHT as u32, Triangle);
        Ok(img.into_raw())
    }

    fn stacked_obs(&self) -> AtariObs {
        AtariObs::from_frames(self.frames.iter())
    }

    fn noop_reset(&mut self) {
        self.backend.reset();
        if self.config.noop_max > 0 {
            let n = self.rng.usize(1..=self.config.noop_max);
            trace!("{} no-op frames", n);
            for _ in 0..n {
                self.backend.act(AtariAction::Noop);
                if self.backend.is_game_over() {
                    self.backend.reset();
                }
            }
        }
    }

    fn needs_fire(&self) -> bool {
        self.config.fire_reset
            && self.actions.len() >= 3
            && self.actions[1] == AtariAction::Fire
    }

    // Presses the first two actions after NOOP in the minimal action set,
    // FIRE and one more, to start play.
    fn fire_reset(&mut self) {
        for k in [1, 2] {
            let (_, game_over) = self.monitored_step(self.actions[k]);
            if game_over {
                self.real_return = 0.0;
                self.real_len = 0;
                self.noop_reset();
            }
        }
    }

    // A repeated action counted in the statistics of the real episode.
    fn monitored_step(&mut self, action: AtariAction) -> (f32, bool) {
        let (reward, game_over) = self.skip_and_max(action);
        self.real_return += reward;
        self.real_len += 1;
        self.was_real_done = game_over;

        if game_over {
            debug!(
                "AtariEnv: game over, return = {}, length = {}",
                self.real_return, self.real_len
            );
            if let Some(logger) = self.logger.as_mut() {
                logger.record(self.real_return, self.real_len);
            }
        }

        (reward, game_over)
    }
}

impl<B: AtariBackend> Simulator for AtariEnv<B> {
    type Obs = AtariObs;
    type Act = AtariAct;

    fn reset(&mut self) -> Result<AtariObs> {
        if !self.config.episodic_life || self.was_real_done {
            debug!("AtariEnv: real reset");
            self.real_return = 0.0;
            self.real_len = 0;
            self.noop_reset();
        } else {
            // No-op step to advance from the lost life state
            let (_, game_over) = self.monitored_step(AtariAction::Noop);
            if game_over {
                self.real_return = 0.0;
                self.real_len = 0;
                self.noop_reset();
            }
        }
        if self.needs_fire() {
            self.fire_reset();
        }
        self.was_real_done = false;
        self.lives = self.backend.lives();

        self.render();
        let screen = self.obs_buffer[1].clone();
        self.obs_buffer[0].copy_from_slice(&screen);
        let frame = self.warp_and_grayscale(screen)?;

        self.frames.clear();
        for _ in 0..self.config.frame_stack {
            self.frames.push_back(frame.clone());
        }

        Ok(self.stacked_obs())
    }

    fn step(&mut self, act: &AtariAct) -> Result<SimStep<AtariObs>> {
        let action = *self.actions.get(act.act).ok_or_else(|| {
            FlowEnvError::InvalidAction(format!(
                "{} is not in 0..{}",
                act.act,
                self.actions.len()
            ))
        })?;

        let (reward, game_over) = self.monitored_step(action);

        let mut done = game_over;
        if self.config.episodic_life {
            let lives = self.backend.lives();
            if lives < self.lives && lives > 0 {
                trace!("AtariEnv: life lost, {} left", lives);
                done = true;
            }
            self.lives = lives;
        }

        let frame = self.warp_and_grayscale(self.max_pooled())?;
        self.frames.pop_front();
        self.frames.push_back(frame);

        let reward = if self.config.clip_rewards && reward != 0.0 {
            reward.signum()
        } else {
            reward
        };

        Ok(SimStep::new(self.stacked_obs(), reward, done))
    }

    fn seed(&mut self, seed: u64) {
        self.backend.seed(seed);
        if !self.env_seeded {
            self.rng = fastrand::Rng::with_seed(seed);
        }
    }
}

impl<B: AtariBackend> DiscreteActionSpace for AtariEnv<B> {
    fn n_actions(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::FakeBackend;
    use std::fs::read_to_string;
    use tempdir::TempDir;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn adapter_config() -> AdapterConfig {
        AdapterConfig::default().name("Fake-v0").seed(1)
    }

    fn env(config: AtariConfig, backend: FakeBackend) -> Result<AtariEnv<FakeBackend>> {
        AtariEnv::build(backend, &config.monitor(false), &adapter_config())
    }

    fn is_uniform(frame: &[u8]) -> bool {
        frame.iter().all(|&v| v == frame[0])
    }

    #[test]
    fn test_observation_shape() -> Result<()> {
        init();
        let mut env = env(AtariConfig::default(), FakeBackend::new(3, 1000))?;
        let obs = env.reset()?;
        assert_eq!(obs.shape(), [84, 84, 4]);
        assert_eq!(obs.as_slice().len(), 84 * 84 * 4);

        // All stacked frames are the first frame after reset.
        let first = obs.frame(0);
        for k in 1..4 {
            assert_eq!(obs.frame(k), first);
        }
        Ok(())
    }

    #[test]
    fn test_frame_stack_shifts() -> Result<()> {
        init();
        let mut env = env(AtariConfig::default(), FakeBackend::new(3, 1000))?;
        let obs0 = env.reset()?;
        let obs1 = env.step(&AtariAct::new(0))?.obs;

        for k in 0..3 {
            assert_eq!(obs1.frame(k), obs0.frame(k + 1));
        }
        let newest = obs1.frame(3);
        assert!(is_uniform(&newest));
        assert_ne!(newest, obs0.frame(3));
        Ok(())
    }

    #[test]
    fn test_frame_skip_sums_rewards() -> Result<()> {
        init();
        let config = AtariConfig::default().noop_max(0).fire_reset(false);
        let mut env = env(config, FakeBackend::new(3, 1000).reward_per_frame(2))?;
        env.reset()?;
        let frames = env.backend().n_frames();

        let step = env.step(&AtariAct::new(0))?;
        assert_eq!(step.reward, 8.0);
        assert_eq!(env.backend().n_frames(), frames + 4);
        Ok(())
    }

    #[test]
    fn test_clip_rewards() -> Result<()> {
        let config = AtariConfig::default().clip_rewards(true);
        let mut negative = env(config.clone(), FakeBackend::new(3, 1000).reward_per_frame(-5))?;
        negative.reset()?;
        assert_eq!(negative.step(&AtariAct::new(0))?.reward, -1.0);

        let mut zero = env(config, FakeBackend::new(3, 1000).reward_per_frame(0))?;
        zero.reset()?;
        assert_eq!(zero.step(&AtariAct::new(0))?.reward, 0.0);
        Ok(())
    }

    #[test]
    fn test_noop_reset_is_seeded() -> Result<()> {
        let frames_after_reset = |env_seed| -> Result<usize> {
            let config = adapter_config().env_seed(Some(env_seed));
            let atari_config = AtariConfig::default().fire_reset(false).monitor(false);
            let mut env = AtariEnv::build(FakeBackend::new(3, 1000), &atari_config, &config)?;
            env.reset()?;
            Ok(env.backend().n_frames())
        };

        let n = frames_after_reset(5)?;
        assert!((1..=30).contains(&n));
        assert_eq!(n, frames_after_reset(5)?);
        Ok(())
    }

    #[test]
    fn test_noop_reset_follows_simulator_seed() -> Result<()> {
        let frames_after_reset = |seed, env_seed| -> Result<usize> {
            let config = adapter_config().env_seed(env_seed);
            let atari_config = AtariConfig::default().fire_reset(false).monitor(false);
            let mut env = AtariEnv::build(FakeBackend::new(3, 1000), &atari_config, &config)?;
            env.seed(seed);
            env.reset()?;
            assert_eq!(env.backend().seed_value(), Some(seed));
            Ok(env.backend().n_frames())
        };

        // Without env_seed, no-ops are drawn from the simulator seed.
        for seed in [7, 8, 9] {
            let expected = fastrand::Rng::with_seed(seed).usize(1..=30);
            assert_eq!(frames_after_reset(seed, None)?, expected);
        }

        // env_seed takes precedence over the simulator seed.
        let expected = fastrand::Rng::with_seed(5).usize(1..=30);
        assert_eq!(frames_after_reset(7, Some(5))?, expected);
        assert_eq!(frames_after_reset(8, Some(5))?, expected);
        Ok(())
    }

    #[test]
    fn test_fire_reset() -> Result<()> {
        let config = AtariConfig::default().noop_max(0);
        let mut with_fire = env(config.clone(), FakeBackend::new(3, 1000).with_fire())?;
        with_fire.reset()?;
        assert_eq!(with_fire.backend().n_fire(), 4);

        // FIRE, then the action at index 2 of the minimal action set.
        let mut expected = vec![AtariAction::Fire; 4];
        expected.extend([AtariAction::Right; 4]);
        assert_eq!(with_fire.backend().history(), expected.as_slice());

        let mut without_fire = env(config.fire_reset(false), FakeBackend::new(3, 1000).with_fire())?;
        without_fire.reset()?;
        assert_eq!(without_fire.backend().n_fire(), 0);
        Ok(())
    }

    #[test]
    fn test_fire_after_life_loss() -> Result<()> {
        // A life is lost every 40 frames.
        let config = AtariConfig::default().noop_max(0);
        let mut env = env(config, FakeBackend::new(3, 40).with_fire())?;
        env.reset()?;
        assert_eq!(env.backend().n_fire(), 4);

        while !env.step(&AtariAct::new(0))?.done {}
        assert_eq!(env.backend().lives(), 2);

        env.reset()?;
        assert_eq!(env.backend().n_resets(), 1);
        assert_eq!(env.backend().n_fire(), 8);

        // The no-op step of the life-loss reset, then FIRE and RIGHT.
        let history = env.backend().history();
        let tail = &history[history.len() - 12..];
        assert!(tail[..4].iter().all(|&a| a == AtariAction::Noop));
        assert!(tail[4..8].iter().all(|&a| a == AtariAction::Fire));
        assert!(tail[8..].iter().all(|&a| a == AtariAction::Right));
        Ok(())
    }

    #[test]
    fn test_episodic_life() -> Result<()> {
        init();
        // A life is lost every 8 frames, i.e., every 2 steps.
        let config = AtariConfig::default().noop_max(0).fire_reset(false);
        let mut env = env(config, FakeBackend::new(2, 8))?;
        env.reset()?;
        assert_eq!(env.backend().n_resets(), 1);

        let mut dones = vec![];
        for _ in 0..2 {
            dones.push(env.step(&AtariAct::new(0))?.done);
        }
        assert_eq!(dones, vec![false, true]);
        assert_eq!(env.backend().lives(), 1);

        // Not a real reset
        env.reset()?;
        assert_eq!(env.backend().n_resets(), 1);

        let mut step = env.step(&AtariAct::new(0))?;
        while !step.done {
            step = env.step(&AtariAct::new(0))?;
        }
        assert!(env.backend().is_game_over());

        env.reset()?;
        assert_eq!(env.backend().n_resets(), 2);
        Ok(())
    }

    #[test]
    fn test_without_episodic_life() -> Result<()> {
        let config = AtariConfig::default().noop_max(0).fire_reset(false).eval();
        let mut env = env(config, FakeBackend::new(2, 8))?;
        env.reset()?;

        let mut n = 1;
        while !env.step(&AtariAct::new(0))?.done {
            n += 1;
        }
        assert_eq!(n, 4);
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = env(AtariConfig::default(), FakeBackend::new(3, 1000))?;
        env.reset()?;
        assert_eq!(env.n_actions(), 4);
        let err = env.step(&AtariAct::new(4)).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<FlowEnvError>(),
            Some(FlowEnvError::InvalidAction(_))
        ));
        Ok(())
    }

    #[test]
    fn test_monitor_logs_real_episodes() -> Result<()> {
        let dir = TempDir::new("atari_monitor")?;
        let adapter_config = adapter_config().logdir(dir.path());
        let config = AtariConfig::default().noop_max(0).fire_reset(false);
        let backend = FakeBackend::new(2, 8).reward_per_frame(1);
        let mut env = AtariEnv::build(backend, &config, &adapter_config)?;

        env.reset()?;
        for _ in 0..2 {
            env.step(&AtariAct::new(0))?;
        }
        // The no-op step after the life loss ends the game with the next step.
        env.reset()?;
        assert!(env.step(&AtariAct::new(0))?.done);

        let content = read_to_string(dir.path().join("Fake-v0.1.monitor.csv"))?;
        let lines = content.lines().collect::<Vec<_>>();
        // Header, column names and one game spanning both lives:
        // 2 steps, the no-op step of the reset and the final step.
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("16.0,4,"));
        Ok(())
    }

    #[test]
    fn test_zero_frame_skip_is_rejected() {
        let config = AtariConfig::default().frame_skip(0);
        let err = env(config, FakeBackend::new(3, 1000)).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<FlowEnvError>(),
            Some(FlowEnvError::ConstructionError(_))
        ));
    }
}
