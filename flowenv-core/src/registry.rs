//! Identifier-to-constructor registry of simulators.
use crate::{error::FlowEnvError, AdapterConfig, Simulator, SimulatorAdapter};
use anyhow::Result;
use std::collections::BTreeMap;

/// Constructs a simulator from a configuration.
pub type Constructor<S> = Box<dyn Fn(&AdapterConfig) -> Result<S> + Send + Sync>;

/// A set of simulators identified by name.
pub struct Registry<S> {
    constructors: BTreeMap<String, Constructor<S>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }
}

impl<S: Simulator> Registry<S> {
    /// Registers a constructor, replacing the previous one with the same identifier.
    pub fn register<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn(&AdapterConfig) -> Result<S> + Send + Sync + 'static,
    {
        self.constructors.insert(id.into(), Box::new(constructor));
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Returns registered identifiers in lexicographic order.
    pub fn ids(&self) -> Vec<&str> {
        self.constructors.keys().map(|k| k.as_str()).collect()
    }

    /// Constructs the simulator named by `config.name`.
    ///
    /// Fails with [`FlowEnvError::ConstructionError`] if the identifier is unknown.
    pub fn make(&self, config: &AdapterConfig) -> Result<S> {
        match self.constructors.get(&config.name) {
            Some(constructor) => constructor(config),
            None => Err(FlowEnvError::ConstructionError(format!(
                "unknown environment identifier: {:?}",
                config.name
            ))
            .into()),
        }
    }

    /// Builds a [`SimulatorAdapter`] around the simulator named by `config.name`.
    pub fn build_adapter(&self, config: &AdapterConfig) -> Result<SimulatorAdapter<S>> {
        SimulatorAdapter::build(config, |config| self.make(config))
    }
}
