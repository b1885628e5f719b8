//! Environment.
use super::Step;
use crate::{error::MonitorError, video::Frame};
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an MDP.
///
/// Implementations live outside of this crate, for example as a wrapper of a
/// simulator. The monitor only builds, resets, steps and renders them.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Action of the environment.
    type Act: Clone + Debug;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way, for example as a random seed,
    /// which is useful to make evaluation episodes reproducible. By default,
    /// the index is ignored.
    #[allow(unused_variables)]
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.reset()
    }

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state of the environment as an RGB frame.
    fn render(&mut self) -> Result<Frame> {
        Err(MonitorError::RenderNotSupported.into())
    }
}
