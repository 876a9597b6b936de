//! Utilities for test.
use crate::{AtariAction, AtariBackend};

const WIDTH: usize = 16;
const HEIGHT: usize = 12;

/// An emulator without a game.
///
/// The screen is uniformly gray with a brightness changing every frame.
/// A life is lost every `life_len` frames and the game is over when no life
/// is left.
pub struct FakeBackend {
    lives: usize,
    life_len: usize,
    reward_per_frame: i32,
    actions: Vec<AtariAction>,
    t: usize,
    n_frames: usize,
    n_fire: usize,
    history: Vec<AtariAction>,
    n_resets: usize,
    seed: Option<u64>,
}

impl FakeBackend {
    /// Constructs an emulator with actions `[Noop, Up, Right, Left]`.
    pub fn new(lives: usize, life_len: usize) -> Self {
        Self {
            lives,
            life_len,
            reward_per_frame: 0,
            actions: vec![
                AtariAction::Noop,
                AtariAction::Up,
                AtariAction::Right,
                AtariAction::Left,
            ],
            t: 0,
            n_frames: 0,
            n_fire: 0,
            history: vec![],
            n_resets: 0,
            seed: None,
        }
    }

    /// Sets the reward emitted at every frame.
    pub fn reward_per_frame(mut self, v: i32) -> Self {
        self.reward_per_frame = v;
        self
    }

    /// Replaces `Up` with `Fire` in the action set.
    pub fn with_fire(mut self) -> Self {
        self.actions[1] = AtariAction::Fire;
        self
    }

    /// The number of emulated frames since construction.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// The number of frames emulated with `Fire`.
    pub fn n_fire(&self) -> usize {
        self.n_fire
    }

    /// Actions of all emulated frames, oldest first.
    pub fn history(&self) -> &[AtariAction] {
        &self.history
    }

    /// The number of resets.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// The seed given to the emulator.
    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }
}

impl AtariBackend for FakeBackend {
    fn width(&self) -> usize {
        WIDTH
    }

    fn height(&self) -> usize {
        HEIGHT
    }

    fn minimal_actions(&self) -> Vec<AtariAction> {
        self.actions.clone()
    }

    fn act(&mut self, action: AtariAction) -> i32 {
        if action == AtariAction::Fire {
            self.n_fire += 1;
        }
        self.history.push(action);
        self.t += 1;
        self.n_frames += 1;
        self.reward_per_frame
    }

    fn lives(&self) -> usize {
        self.lives.saturating_sub(self.t / self.life_len)
    }

    fn is_game_over(&self) -> bool {
        self.lives() == 0
    }

    fn reset(&mut self) {
        self.t = 0;
        self.n_resets += 1;
    }

    fn render_rgb24(&self, buf: &mut [u8]) {
        let v = ((self.n_frames * 10) % 256) as u8;
        buf.iter_mut().for_each(|b| *b = v);
    }

    fn seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }
}
