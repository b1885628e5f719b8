//! Default implementation of the [`Evaluator`] trait.
use super::{Episodes, Evaluator};
use crate::{error::MonitorError, Env, Policy};
use anyhow::Result;
use log::trace;

/// Runs a fixed number of episodes and reports their returns and lengths.
///
/// # Examples
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<MyEnv>::new(&config, 42, 5)?;
/// let episodes = evaluator.evaluate(&mut agent)?;
/// let summary = episodes.summary().unwrap();
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    /// Runs the episodes.
    ///
    /// Each episode starts with [`Env::reset_with_index`] given the episode
    /// index and runs until the environment reports termination or truncation.
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Episodes>
    where
        P: Policy<E>,
    {
        let mut episodes = Episodes::default();

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_total = 0f32;
            let mut n_steps = 0usize;

            loop {
                let act = policy.sample(&prev_obs);
                let step = self.env.step(&act)?;
                r_total += step.reward;
                n_steps += 1;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            trace!("Episode {}, {} steps, return = {}", ix, n_steps, r_total);
            episodes.rewards.push(r_total);
            episodes.lengths.push(n_steps as f32);
        }

        Ok(episodes)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(MonitorError::NoEvaluationEpisodes.into());
        }
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};
    use crate::Agent;

    #[test]
    fn test_evaluate_returns_per_episode_results() -> Result<()> {
        let config = DummyEnvConfig::default().episode_lens(vec![2, 4]);
        let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&config, 0, 3)?;
        let mut agent = DummyAgent::new(1.5);
        agent.eval();

        let episodes = evaluator.evaluate(&mut agent)?;
        assert_eq!(episodes.lengths, vec![2.0, 4.0, 2.0]);
        assert_eq!(episodes.rewards, vec![3.0, 6.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_zero_episodes_is_rejected() {
        let config = DummyEnvConfig::default();
        assert!(DefaultEvaluator::<DummyEnv>::new(&config, 0, 0).is_err());
    }
}
