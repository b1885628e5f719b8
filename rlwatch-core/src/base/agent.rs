//! Agent.
use super::{Env, Policy};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The optimizer, the rollout buffer and the network live behind this trait.
/// The monitor never looks inside; it only switches modes, asks for a training
/// step and saves parameters.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    ///
    /// In evaluation mode, [`Policy::sample`] is expected to select actions
    /// deterministically.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Trains the agent for one step and returns the cumulative number of steps.
    fn learn_step(&mut self) -> Result<usize>;

    /// Save the parameters of the agent to the given path.
    ///
    /// The format of the file is up to the implementation.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given path.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
