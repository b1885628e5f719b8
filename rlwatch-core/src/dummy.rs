//! Environment and agent used in tests.
use crate::{video::Frame, Agent, Env, Policy, Step};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::{cell::Cell, path::Path};

/// Dummy observation, the number of steps since the last reset.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub usize);

/// Dummy action, used as the reward of the step.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub f32);

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DummyEnvConfig {
    /// Episode lengths, cycled over resets.
    pub episode_lens: Vec<usize>,

    /// Width of rendered frames.
    pub frame_width: usize,

    /// Height of rendered frames.
    pub frame_height: usize,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            episode_lens: vec![10],
            frame_width: 4,
            frame_height: 3,
        }
    }
}

impl DummyEnvConfig {
    /// Sets episode lengths.
    pub fn episode_lens(mut self, v: Vec<usize>) -> Self {
        self.episode_lens = v;
        self
    }
}

/// Dummy env.
///
/// Each step yields the action value as the reward. An episode ends after
/// the number of steps taken from [`DummyEnvConfig::episode_lens`].
pub struct DummyEnv {
    config: DummyEnvConfig,
    t: usize,
    len: usize,
    n_resets: usize,
}

impl DummyEnv {
    fn start_episode(&mut self, ix: usize) -> DummyObs {
        self.len = self.config.episode_lens[ix % self.config.episode_lens.len()];
        self.t = 0;
        DummyObs(0)
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        ensure!(!config.episode_lens.is_empty(), "No episode length is given");
        Ok(Self {
            config: config.clone(),
            t: 0,
            len: config.episode_lens[0],
            n_resets: 0,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let obs = self.start_episode(self.n_resets);
        self.n_resets += 1;
        Ok(obs)
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        Ok(self.start_episode(ix))
    }

    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>> {
        self.t += 1;
        let is_terminated = self.t >= self.len;
        Ok(Step::new(DummyObs(self.t), a.clone(), a.0, is_terminated, false))
    }

    fn render(&mut self) -> Result<Frame> {
        let (w, h) = (self.config.frame_width, self.config.frame_height);
        Frame::new(vec![self.t as u8; w * h * 3], w, h)
    }
}

/// Dummy agent.
///
/// In evaluation mode it always takes the action given at construction. In
/// training mode it takes action `0.0`.
pub struct DummyAgent {
    action: f32,
    is_train: bool,
    steps: usize,
    n_saved: Cell<usize>,
}

impl DummyAgent {
    /// Constructs an agent taking `action` in evaluation mode.
    pub fn new(action: f32) -> Self {
        Self {
            action,
            is_train: true,
            steps: 0,
            n_saved: Cell::new(0),
        }
    }

    /// Changes the action taken in evaluation mode.
    pub fn set_action(&mut self, action: f32) {
        self.action = action;
    }

    /// The number of times the parameters have been saved.
    pub fn n_saved(&self) -> usize {
        self.n_saved.get()
    }
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> DummyAct {
        if self.is_train {
            DummyAct(0.0)
        } else {
            DummyAct(self.action)
        }
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.is_train = true;
    }

    fn eval(&mut self) {
        self.is_train = false;
    }

    fn is_train(&self) -> bool {
        self.is_train
    }

    fn learn_step(&mut self) -> Result<usize> {
        self.steps += 1;
        Ok(self.steps)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.action.to_string())?;
        self.n_saved.set(self.n_saved.get() + 1);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.action = std::fs::read_to_string(path)?.trim().parse()?;
        Ok(())
    }
}
