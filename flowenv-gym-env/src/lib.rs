//! Classic control simulators for [`flowenv-core`](flowenv_core).
//!
//! ```
//! use flowenv_core::{AdapterConfig, FlowEnv};
//! use flowenv_gym_env::classic_control_registry;
//! # fn main() -> anyhow::Result<()> {
//! let config = AdapterConfig::default().name("CartPole-v1").seed(42);
//! let adapter = classic_control_registry().build_adapter(&config)?;
//! let mut env = FlowEnv::new(adapter);
//! let (_, state) = env.initial()?;
//! let (output, _) = env.step(&1, &state)?;
//! assert_eq!(output.info.episode_step, 1);
//! # Ok(())
//! # }
//! ```
mod cartpole;
pub use cartpole::{CartPole, CartPoleObs, MAX_EPISODE_STEPS};
use flowenv_core::registry::Registry;
use log::info;

/// Returns a registry of the built-in classic control simulators.
pub fn classic_control_registry() -> Registry<CartPole> {
    let mut registry = Registry::default();
    registry.register("CartPole-v1", |config| {
        info!("Create CartPole-v1 for {:?}", config.logdir);
        Ok(CartPole::new())
    });
    registry
}
