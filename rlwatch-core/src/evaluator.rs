//! Evaluate [`Policy`].
use crate::{util::Summary, Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Per-episode results of an evaluation run.
///
/// `rewards[i]` and `lengths[i]` belong to the same episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Episodes {
    /// Cumulative reward of each episode.
    pub rewards: Vec<f32>,

    /// Number of environment steps of each episode.
    pub lengths: Vec<f32>,
}

impl Episodes {
    /// Mean and standard deviation of the rewards and lengths.
    ///
    /// Returns `None` if no episode was run.
    pub fn summary(&self) -> Option<Summary> {
        Summary::from_episodes(&self.rewards, &self.lengths)
    }
}

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Runs episodes with `policy` and returns per-episode results.
    ///
    /// The caller of this method needs to handle the internal state of `policy`,
    /// like training/evaluation mode.
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Episodes>
    where
        P: Policy<E>;
}
