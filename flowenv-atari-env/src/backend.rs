//! Emulator interface.
use crate::AtariAction;

/// An Atari emulator.
///
/// [`AtariEnv`](crate::AtariEnv) drives the emulator frame by frame; the
/// emulator itself must not skip frames or repeat actions.
pub trait AtariBackend {
    /// Screen width in pixels.
    fn width(&self) -> usize;

    /// Screen height in pixels.
    fn height(&self) -> usize;

    /// The minimal set of actions of the game.
    fn minimal_actions(&self) -> Vec<AtariAction>;

    /// Emulates a single frame and returns the reward.
    fn act(&mut self, action: AtariAction) -> i32;

    /// Remaining lives.
    fn lives(&self) -> usize;

    /// Returns true when the game is over.
    fn is_game_over(&self) -> bool;

    /// Resets the game.
    fn reset(&mut self);

    /// Renders the screen into `buf` as RGB, `buf.len() == width * height * 3`.
    fn render_rgb24(&self, buf: &mut [u8]);

    /// Seeds the emulator.
    fn seed(&mut self, seed: u64);
}
