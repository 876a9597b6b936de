//! Atari preprocessing for [`flowenv-core`](flowenv_core).
//!
//! [`AtariEnv`] applies the preprocessing of
//! [`atari_wrappers.py`](https://github.com/openai/baselines/blob/master/baselines/common/atari_wrappers.py)
//! to any emulator implementing [`AtariBackend`]: no-op and fire resets,
//! action repeat with max pooling, episodic life, 84×84 grayscale frames
//! stacked 4 deep and optional reward clipping. Observations have the shape
//! `[84, 84, 4]`.
//!
//! With the `ale` feature, [`ale::AleBackend`] binds the Arcade Learning
//! Environment and [`ale::atari_registry`] maps the identifiers in
//! [`ATARI_GAMES`] to preprocessed simulators.
//!
//! ```
//! use flowenv_atari_env::{util::test::FakeBackend, AtariAct, AtariConfig, AtariEnv};
//! use flowenv_core::{AdapterConfig, FlowEnv, SimulatorAdapter};
//! # fn main() -> anyhow::Result<()> {
//! let adapter_config = AdapterConfig::default().name("Fake-v0").seed(42);
//! let config = AtariConfig::default().monitor(false);
//! let adapter = SimulatorAdapter::build(&adapter_config, |c| {
//!     AtariEnv::build(FakeBackend::new(3, 100), &config, c)
//! })?;
//!
//! let mut env = FlowEnv::new(adapter);
//! let (output, state) = env.initial()?;
//! assert_eq!(output.observation.shape(), [84, 84, 4]);
//! let (output, _) = env.step(&AtariAct::new(0), &state)?;
//! assert!(!output.done);
//! # Ok(())
//! # }
//! ```
mod act;
#[cfg(feature = "ale")]
pub mod ale;
mod backend;
mod env;
pub mod games;
mod obs;
pub mod util;
pub use act::{AtariAct, AtariAction};
pub use backend::AtariBackend;
pub use env::{AtariConfig, AtariEnv};
pub use games::{is_atari_game, ATARI_GAMES};
pub use obs::AtariObs;

/// Width of a preprocessed frame.
pub const FRAME_WIDTH: usize = 84;

/// Height of a preprocessed frame.
pub const FRAME_HEIGHT: usize = 84;
