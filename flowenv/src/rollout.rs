//! Random-policy rollouts through [`FlowEnv`].
use crate::RolloutConfig;
use anyhow::Result;
use flowenv_atari_env::is_atari_game;
use flowenv_core::{error::FlowEnvError, DiscreteActionSpace, FlowEnv, Simulator};
use flowenv_gym_env::classic_control_registry;
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

/// Totals of an episode finished during a rollout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Index of the episode, counted from 0.
    pub episode: usize,

    /// Sum of rewards in the episode.
    pub episode_return: f32,

    /// Length of the episode.
    pub episode_step: u64,

    /// Sequence counter of the state issued by the terminal step.
    pub sequence_counter: u64,
}

/// Drives `env` with uniformly random actions for `n_steps` steps.
///
/// Starts with [`FlowEnv::initial`] and returns the summaries of the
/// episodes finished on the way. Fails with
/// [`FlowEnvError::ConstructionError`] if the simulator has no actions.
pub fn run_rollout<S>(
    env: &mut FlowEnv<S>,
    n_steps: usize,
    rng: &mut fastrand::Rng,
) -> Result<Vec<EpisodeSummary>>
where
    S: Simulator + DiscreteActionSpace,
    S::Act: From<usize>,
{
    let n_actions = env.adapter().simulator().n_actions();
    if n_actions == 0 {
        return Err(FlowEnvError::ConstructionError(format!(
            "{} has no actions",
            env.adapter().name()
        ))
        .into());
    }
    let (_, mut state) = env.initial()?;
    let mut summaries = vec![];

    for _ in 0..n_steps {
        let act: S::Act = rng.usize(..n_actions).into();
        let (output, next_state) = env.step(&act, &state)?;
        state = next_state;

        if output.done {
            let summary = EpisodeSummary {
                episode: summaries.len(),
                episode_return: output.info.episode_return,
                episode_step: output.info.episode_step,
                sequence_counter: state.sequence_counter(),
            };
            info!(
                "Episode {}: return = {}, steps = {}",
                summary.episode, summary.episode_return, summary.episode_step
            );
            summaries.push(summary);
        }
    }

    Ok(summaries)
}

/// Writes episode summaries as CSV with a header row.
pub fn write_summaries_csv(path: impl AsRef<Path>, summaries: &[EpisodeSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

fn rollout_and_close<S>(mut env: FlowEnv<S>, config: &RolloutConfig) -> Result<Vec<EpisodeSummary>>
where
    S: Simulator + DiscreteActionSpace,
    S::Act: From<usize>,
{
    let mut rng = fastrand::Rng::with_seed(config.policy_seed);
    let summaries = run_rollout(&mut env, config.n_steps, &mut rng);
    if let Err(e) = env.into_adapter().close() {
        if summaries.is_ok() {
            return Err(e);
        }
        warn!("Failed to close the simulator after an error: {}", e);
    }
    summaries
}

#[cfg(feature = "ale")]
fn run_atari(config: &RolloutConfig) -> Result<Vec<EpisodeSummary>> {
    let registry = flowenv_atari_env::ale::atari_registry(config.atari.clone());
    let env = FlowEnv::new(registry.build_adapter(&config.env)?);
    rollout_and_close(env, config)
}

#[cfg(not(feature = "ale"))]
fn run_atari(config: &RolloutConfig) -> Result<Vec<EpisodeSummary>> {
    Err(FlowEnvError::ConstructionError(format!(
        "{}: Atari backend unavailable, build with feature `ale`",
        config.env.name
    ))
    .into())
}

/// Builds the simulator named in `config`, runs a random rollout and writes
/// the summaries to `config.csv` if set.
pub fn run(config: &RolloutConfig) -> Result<Vec<EpisodeSummary>> {
    let name = config.env.name.as_str();
    let classic_control = classic_control_registry();

    let summaries = if classic_control.contains(name) {
        let env = FlowEnv::new(classic_control.build_adapter(&config.env)?);
        rollout_and_close(env, config)?
    } else if is_atari_game(name) {
        run_atari(config)?
    } else {
        return Err(FlowEnvError::ConstructionError(format!(
            "unknown environment identifier: {:?}",
            name
        ))
        .into());
    };

    if let Some(path) = &config.csv {
        write_summaries_csv(path, &summaries)?;
        info!("Wrote {} episodes to {:?}", summaries.len(), path);
    }

    Ok(summaries)
}

/// Returns all identifiers [`run`] accepts.
pub fn known_ids() -> Vec<String> {
    let mut ids = classic_control_registry()
        .ids()
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
    ids.extend(flowenv_atari_env::ATARI_GAMES.iter().map(|s| s.to_string()));
    ids
}
