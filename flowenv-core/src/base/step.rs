//! Simulator step.

/// Result of applying one action to a [`Simulator`](super::Simulator).
///
/// When `done` is true, `obs` is the terminal frame of the episode.
#[derive(Debug, Clone, PartialEq)]
pub struct SimStep<O> {
    /// Observation after the action was applied.
    pub obs: O,

    /// Reward of the transition.
    pub reward: f32,

    /// Flag denoting if the episode ended.
    pub done: bool,
}

impl<O> SimStep<O> {
    /// Constructs a [`SimStep`].
    pub fn new(obs: O, reward: f32, done: bool) -> Self {
        Self { obs, reward, done }
    }
}
