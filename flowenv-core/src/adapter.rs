//! Simulator adapter.
mod config;
use crate::{error::FlowEnvError, SimStep, Simulator};
use anyhow::Result;
pub use config::AdapterConfig;
use log::{debug, info, trace, warn};

/// Wraps a single [`Simulator`] and resets it automatically at episode end.
///
/// The simulator is constructed by a factory function supplied to
/// [`SimulatorAdapter::build`]. The preprocessing variant of an environment
/// differs only in the factory, not in the adapter.
pub struct SimulatorAdapter<S: Simulator> {
    sim: S,

    // Name of the simulator, used in log messages.
    name: String,

    // True after the first call of initial().
    initialized: bool,
}

impl<S: Simulator> SimulatorAdapter<S> {
    /// Constructs the simulator with `factory` and seeds it with `config.seed`.
    ///
    /// Errors of the factory, typically
    /// [`FlowEnvError::ConstructionError`], are returned as is.
    pub fn build<F>(config: &AdapterConfig, factory: F) -> Result<Self>
    where
        F: FnOnce(&AdapterConfig) -> Result<S>,
    {
        let mut sim = factory(config)?;
        sim.seed(config.seed);
        info!("Built simulator {} with seed {}", config.name, config.seed);

        Ok(Self {
            sim,
            name: config.name.clone(),
            initialized: false,
        })
    }

    /// Wraps a simulator which has been constructed and seeded by the caller.
    pub fn new(sim: S, name: impl Into<String>) -> Self {
        Self {
            sim,
            name: name.into(),
            initialized: false,
        }
    }

    /// Resets the simulator and returns the first observation.
    pub fn initial(&mut self) -> Result<S::Obs> {
        trace!("SimulatorAdapter::initial()");
        let obs = self.sim.reset()?;
        self.initialized = true;
        Ok(obs)
    }

    /// Applies an action.
    ///
    /// When the episode ends, the simulator is reset immediately and the
    /// first observation of the next episode is returned in place of the
    /// terminal frame. The reward and `done == true` of the terminal
    /// transition are kept.
    ///
    /// If that reset fails, the terminal transition is lost and the adapter
    /// must be restarted with [`SimulatorAdapter::initial`]; until then,
    /// `step()` fails with [`FlowEnvError::NotInitialized`].
    pub fn step(&mut self, act: &S::Act) -> Result<SimStep<S::Obs>> {
        trace!("SimulatorAdapter::step()");
        if !self.initialized {
            return Err(FlowEnvError::NotInitialized.into());
        }

        let step = self.sim.step(act)?;
        if step.done {
            debug!("Episode of {} ended, resetting", self.name);
            let obs = self.sim.reset().map_err(|e| {
                warn!("Reset of {} failed after episode end: {}", self.name, e);
                self.initialized = false;
                e
            })?;
            Ok(SimStep::new(obs, step.reward, true))
        } else {
            Ok(step)
        }
    }

    /// Releases the simulator.
    pub fn close(mut self) -> Result<()> {
        info!("Close simulator {}", self.name);
        self.sim.close()
    }

    /// Returns the name of the simulator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the wrapped simulator.
    pub fn simulator(&self) -> &S {
        &self.sim
    }
}
