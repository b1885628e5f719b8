//! Drive [`Agent`] with a [`Callback`].
mod config;
use crate::{Agent, Callback, Env};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use std::marker::PhantomData;

/// Runs training steps and calls a [`Callback`] after each of them.
///
/// The training algorithm itself is behind [`Agent::learn_step`]. This struct
/// only plays the role of the loop owning the agent:
///
/// 0. Call [`Callback::init`].
/// 1. Switch the agent to training mode.
/// 2. Do a training step, which reports the cumulative number of steps `n`.
/// 3. Call [`Callback::on_step`] with `n`. If it returns `false`, finish.
/// 4. If `n >= max_steps`, finish.
/// 5. Back to step 2.
pub struct Trainer<E: Env> {
    /// The maximal number of training steps.
    max_steps: usize,

    phantom: PhantomData<E>,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            phantom: PhantomData,
        }
    }

    /// Train the agent.
    ///
    /// Returns the number of training steps done.
    pub fn train<A, C>(&mut self, agent: &mut A, callback: &mut C) -> Result<usize>
    where
        A: Agent<E>,
        C: Callback<A>,
    {
        callback.init(agent)?;
        agent.train();

        let mut n_steps = 0;
        while n_steps < self.max_steps {
            n_steps = agent.learn_step()?;
            if !callback.on_step(agent, n_steps)? {
                info!("Training stopped by the callback at step {}", n_steps);
                break;
            }
        }

        Ok(n_steps)
    }
}
