//! Training monitor.
use crate::{logs::load_logs, video::record_video, MonitorConfig};
use anyhow::{Context, Result};
use log::{debug, info, log, warn, Level};
use rlwatch_core::{
    record::{Record, RecordValue, STEP_KEY},
    util::{short_type_name, Summary},
    video::VideoEncoder,
    Agent, Callback, DefaultEvaluator, Env, Evaluator, MonitorError, Tracker, TrackingSession,
};
use std::path::PathBuf;

/// The number of episodes run at each evaluation.
pub const N_EVAL_EPISODES: usize = 5;

/// File name of the best model in the log directory.
pub const BEST_MODEL_FILE: &str = "best_model.plk";

/// Metric names of the summary of episode logs.
pub const TRAINING_KEYS: [&str; 4] = [
    "mean reward from training",
    "std reward from training",
    "mean length from training",
    "std length from training",
];

/// Metric names of the summary of evaluation episodes.
pub const EVALUATION_KEYS: [&str; 4] = [
    "mean reward from evaluate",
    "std_reward from evaluate",
    "mean episode length from evaluate",
    "std episode length from evaluate",
];

/// Observes a training run and reports it to a tracking backend.
///
/// The monitor is called after every training step, see [`Callback`]:
///
/// 1. Every `logs_freq` steps, the episode logs in the log directory are
///    summarized and sent as [`TRAINING_KEYS`]. Nothing is sent if there is
///    no episode in the logs.
/// 2. Every `evaluate_freq` steps, the agent is evaluated on
///    [`N_EVAL_EPISODES`] episodes in evaluation mode and the results are sent
///    as [`EVALUATION_KEYS`]. If enabled, a video of the agent is recorded and
///    uploaded. If the mean evaluation reward is the best so far, the agent is
///    saved to [`BEST_MODEL_FILE`] in the log directory.
///
/// Both may happen at the same step. The monitor never stops training.
pub struct TrainingMonitor<E: Env, T: Tracker> {
    config: MonitorConfig,
    env_config: E::Config,
    tracker: T,
    session: Option<T::Session>,
    video_encoder: Option<Box<dyn VideoEncoder>>,
    best_mean_reward: f32,
}

impl<E: Env, T: Tracker> TrainingMonitor<E, T> {
    /// Constructs a monitor.
    ///
    /// `env_config` is used to build environments for evaluation and video
    /// recording. The session on `tracker` is opened in [`Callback::init`].
    pub fn new(config: MonitorConfig, env_config: E::Config, tracker: T) -> Self {
        Self {
            config,
            env_config,
            tracker,
            session: None,
            video_encoder: None,
            best_mean_reward: f32::NEG_INFINITY,
        }
    }

    /// Sets the encoder used to write videos.
    pub fn with_video_encoder(mut self, encoder: impl VideoEncoder + 'static) -> Self {
        self.video_encoder = Some(Box::new(encoder));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the tracking session, if it has been opened.
    pub fn session(&self) -> Option<&T::Session> {
        self.session.as_ref()
    }

    /// The best mean evaluation reward so far.
    pub fn best_mean_reward(&self) -> f32 {
        self.best_mean_reward
    }

    /// Where the best model is saved.
    pub fn best_model_path(&self) -> PathBuf {
        self.config.log_dir.join(BEST_MODEL_FILE)
    }

    fn session_mut(&mut self) -> Result<&mut T::Session> {
        Ok(self.session.as_mut().ok_or(MonitorError::NotInitialized)?)
    }

    fn seed(&self) -> i64 {
        self.config.random_seed.unwrap_or(0)
    }

    fn level(&self) -> Level {
        if self.config.verbose > 0 {
            Level::Info
        } else {
            Level::Debug
        }
    }

    /// Sends a summary with the given metric names.
    fn write_summary(
        &mut self,
        n_calls: usize,
        keys: &[&str; 4],
        summary: &Summary,
    ) -> Result<()> {
        log!(self.level(), "{} at step {}: {:?}", keys[0], n_calls, summary);
        let record = Record::from_slice(&[
            (STEP_KEY, RecordValue::Integer(n_calls as i64)),
            (keys[0], RecordValue::Scalar(summary.mean_reward)),
            (keys[1], RecordValue::Scalar(summary.std_reward)),
            (keys[2], RecordValue::Scalar(summary.mean_length)),
            (keys[3], RecordValue::Scalar(summary.std_length)),
        ]);
        self.session_mut()?.write(record)
    }

    fn evaluate<A: Agent<E>>(&mut self, agent: &mut A) -> Result<Summary> {
        let mut evaluator =
            DefaultEvaluator::<E>::new(&self.env_config, self.seed(), N_EVAL_EPISODES)?;
        let episodes = in_eval_mode::<E, _, _, _>(agent, |agent| evaluator.evaluate(agent))?;
        episodes
            .summary()
            .context("Evaluation finished without any episode")
    }

    fn make_video<A: Agent<E>>(&mut self, agent: &mut A, n_calls: usize) -> Result<()> {
        let env = E::build(&self.env_config, self.seed())?;
        let name_prefix = format!("{}-step-{}", self.config.experiment_name, n_calls);
        let video_length = self.config.video_length;
        let log_dir = &self.config.log_dir;
        let encoder = self
            .video_encoder
            .as_mut()
            .ok_or(MonitorError::VideoEncoderMissing)?;

        let files = in_eval_mode::<E, _, _, _>(agent, |agent| {
            record_video(
                env,
                agent,
                &mut **encoder,
                log_dir,
                &name_prefix,
                video_length,
            )
        })?;

        self.session_mut()?.log_video(&files.video)?;
        info!("Uploaded video {:?}", files.video);
        files.remove();
        Ok(())
    }

    /// Saves the agent if `mean_reward` is strictly better than any before.
    fn save_if_best<A: Agent<E>>(&mut self, agent: &A, mean_reward: f32) -> Result<bool> {
        if mean_reward > self.best_mean_reward {
            self.best_mean_reward = mean_reward;
            let path = self.best_model_path();
            agent
                .save_params(&path)
                .with_context(|| format!("Failed to save the best model in {:?}", path))?;
            info!("Saved the best model (mean reward {}) in {:?}", mean_reward, path);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl<E, T, A> Callback<A> for TrainingMonitor<E, T>
where
    E: Env,
    T: Tracker,
    A: Agent<E>,
{
    /// Opens the tracking session and logs the metadata of the run.
    ///
    /// Fails if the session cannot be opened. A failure to log the
    /// hyperparameters is only reported as a warning.
    fn init(&mut self, _agent: &A) -> Result<()> {
        if self.config.make_video && self.video_encoder.is_none() {
            return Err(MonitorError::VideoEncoderMissing.into());
        }

        let config = &self.config;
        let mut session = self
            .tracker
            .open(
                &config.account_name,
                &config.project_name,
                &config.experiment_name,
            )
            .context("Failed to open a tracking session")?;

        let mut tags = vec![short_type_name::<A>().to_string(), config.env_name.clone()];
        if let Some(seed) = config.random_seed {
            tags.push(format!("seed: {}", seed));
        }
        session.append_tags(&tags)?;

        match config.model_params_text() {
            Some(text) => {
                if let Err(e) = session.log_text("Model Params", &text) {
                    warn!("Failed to log model parameters: {:?}", e);
                }
            }
            None => debug!("No model parameters to log"),
        }
        session.log_text("Path to local files", &config.log_dir.to_string_lossy())?;
        if let Some(comment) = &config.comment {
            session.log_text("Comment", comment)?;
        }

        if !config.log_dir.exists() {
            std::fs::create_dir_all(&config.log_dir)
                .with_context(|| format!("Failed to create {:?}", config.log_dir))?;
            info!("Created log directory {:?}", config.log_dir);
        }

        info!(
            "Monitoring {}/{}/{}",
            config.account_name, config.project_name, config.experiment_name
        );
        self.session = Some(session);
        Ok(())
    }

    fn on_step(&mut self, agent: &mut A, n_calls: usize) -> Result<bool> {
        if self.session.is_none() {
            return Err(MonitorError::NotInitialized.into());
        }

        if is_due(n_calls, self.config.logs_freq) {
            match load_logs(&self.config.log_dir)? {
                Some(summary) => self.write_summary(n_calls, &TRAINING_KEYS, &summary)?,
                None => debug!("No episode in {:?} at step {}", self.config.log_dir, n_calls),
            }
        }

        if is_due(n_calls, self.config.evaluate_freq) {
            let summary = self.evaluate(agent)?;
            if self.config.make_video {
                self.make_video(agent, n_calls)?;
            }
            self.write_summary(n_calls, &EVALUATION_KEYS, &summary)?;
            self.save_if_best(agent, summary.mean_reward)?;
        }

        Ok(true)
    }
}

/// `true` if a task with interval `freq` runs at step `n_calls`. `freq == 0` disables it.
fn is_due(n_calls: usize, freq: usize) -> bool {
    freq > 0 && n_calls % freq == 0
}

/// Runs `f` with the agent in evaluation mode, then restores training mode.
fn in_eval_mode<E, A, R, F>(agent: &mut A, f: F) -> Result<R>
where
    E: Env,
    A: Agent<E>,
    F: FnOnce(&mut A) -> Result<R>,
{
    let is_train = agent.is_train();
    agent.eval();
    let result = f(agent);
    if is_train {
        agent.train();
    }
    result
}
