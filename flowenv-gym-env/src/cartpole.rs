//! `CartPole-v1`.
//!
//! A pole is attached by an unactuated joint to a cart moving along a
//! frictionless track. Action 0 pushes the cart to the left, action 1 to the
//! right. A reward of 1 is given for every step, including the last one. The
//! episode ends when the pole leans more than 12 degrees, the cart leaves
//! `[-2.4, 2.4]`, or 500 steps have been taken.
use anyhow::Result;
use flowenv_core::{error::FlowEnvError, DiscreteActionSpace, SimStep, Simulator};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::f32::consts::PI;

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
// Half of the pole length
const LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * PI / 360.0;
const X_THRESHOLD: f32 = 2.4;

/// The maximum number of steps in an episode.
pub const MAX_EPISODE_STEPS: usize = 500;

/// Observation of [`CartPole`]: cart position, cart velocity, pole angle and
/// pole angular velocity.
pub type CartPoleObs = [f32; 4];

/// Cart-pole balancing simulator.
pub struct CartPole {
    state: CartPoleObs,
    steps: usize,
    rng: SmallRng,
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl CartPole {
    /// Constructs a simulator. Call [`Simulator::seed`] for reproducible runs.
    pub fn new() -> Self {
        Self {
            state: [0.0; 4],
            steps: 0,
            rng: SmallRng::seed_from_u64(0),
        }
    }

    fn is_terminated(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x < -X_THRESHOLD || x > X_THRESHOLD || theta < -THETA_THRESHOLD || theta > THETA_THRESHOLD
    }
}

impl Simulator for CartPole {
    type Obs = CartPoleObs;
    type Act = usize;

    fn reset(&mut self) -> Result<CartPoleObs> {
        for v in self.state.iter_mut() {
            *v = self.rng.gen_range(-0.05..0.05);
        }
        self.steps = 0;
        Ok(self.state)
    }

    fn step(&mut self, act: &usize) -> Result<SimStep<CartPoleObs>> {
        let force = match act {
            0 => -FORCE_MAG,
            1 => FORCE_MAG,
            _ => {
                return Err(
                    FlowEnvError::InvalidAction(format!("{} is not in 0..2", act)).into(),
                )
            }
        };

        let [x, x_dot, theta, theta_dot] = self.state;
        let (sin_theta, cos_theta) = theta.sin_cos();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // Euler integration
        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.steps += 1;

        let done = self.is_terminated() || self.steps >= MAX_EPISODE_STEPS;
        Ok(SimStep::new(self.state, 1.0, done))
    }

    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

impl DiscreteActionSpace for CartPole {
    fn n_actions(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_small_perturbation() -> Result<()> {
        let mut sim = CartPole::new();
        sim.seed(1);
        let obs = sim.reset()?;
        assert!(obs.iter().all(|v| v.abs() < 0.05));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_trajectory() -> Result<()> {
        let run = |seed| -> Result<Vec<CartPoleObs>> {
            let mut sim = CartPole::new();
            sim.seed(seed);
            let mut obs = vec![sim.reset()?];
            for i in 0..10 {
                obs.push(sim.step(&(i % 2))?.obs);
            }
            Ok(obs)
        };
        assert_eq!(run(7)?, run(7)?);
        assert_ne!(run(7)?, run(8)?);
        Ok(())
    }

    #[test]
    fn test_pushing_one_way_terminates() -> Result<()> {
        let mut sim = CartPole::new();
        sim.reset()?;
        let mut n = 0;
        loop {
            let step = sim.step(&1)?;
            n += 1;
            assert_eq!(step.reward, 1.0);
            if step.done {
                break;
            }
        }
        assert!(n < MAX_EPISODE_STEPS);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let mut sim = CartPole::new();
        sim.reset()?;
        sim.state = [0.0; 4];
        sim.steps = MAX_EPISODE_STEPS - 1;
        assert!(sim.step(&0)?.done);
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut sim = CartPole::new();
        sim.reset()?;
        let err = sim.step(&2).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<FlowEnvError>(),
            Some(FlowEnvError::InvalidAction(_))
        ));
        Ok(())
    }
}
