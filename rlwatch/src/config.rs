//! Configuration of [`TrainingMonitor`](crate::TrainingMonitor).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`TrainingMonitor`](crate::TrainingMonitor).
///
/// Fixed at construction of the monitor.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name of the environment, used as a tag of the run.
    pub env_name: String,

    /// Account on the tracking backend.
    pub account_name: String,

    /// Project of the account on the tracking backend.
    pub project_name: String,

    /// Name of the experiment (run) in the project.
    pub experiment_name: String,

    /// Directory of the episode logs, also where the best model and videos are written.
    pub log_dir: PathBuf,

    /// Random seed of the training run. Also used to build the evaluation environment.
    pub random_seed: Option<i64>,

    /// Hyperparameters, uploaded as text when the monitor is initialized.
    pub model_params: BTreeMap<String, String>,

    /// Free-text comment on the run.
    pub comment: Option<String>,

    /// Interval of log aggregation in training steps.
    pub logs_freq: usize,

    /// Interval of evaluation in training steps.
    pub evaluate_freq: usize,

    /// Verbosity level. With `0`, per-trigger summaries are logged at debug level.
    pub verbose: u8,

    /// Length of recorded videos in environment steps.
    pub video_length: usize,

    /// If `true`, a video is recorded at each evaluation.
    pub make_video: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            env_name: "".to_string(),
            account_name: "".to_string(),
            project_name: "".to_string(),
            experiment_name: "".to_string(),
            log_dir: PathBuf::from("./logs"),
            random_seed: None,
            model_params: BTreeMap::new(),
            comment: None,
            logs_freq: 100,
            evaluate_freq: 10_000,
            verbose: 0,
            video_length: 1000,
            make_video: false,
        }
    }
}

impl MonitorConfig {
    /// Sets the environment name.
    pub fn env_name(mut self, v: impl Into<String>) -> Self {
        self.env_name = v.into();
        self
    }

    /// Sets account, project and experiment on the tracking backend.
    pub fn tracking(
        mut self,
        account_name: impl Into<String>,
        project_name: impl Into<String>,
        experiment_name: impl Into<String>,
    ) -> Self {
        self.account_name = account_name.into();
        self.project_name = project_name.into();
        self.experiment_name = experiment_name.into();
        self
    }

    /// Sets the log directory.
    pub fn log_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.log_dir = v.as_ref().to_path_buf();
        self
    }

    /// Sets the random seed.
    pub fn random_seed(mut self, v: i64) -> Self {
        self.random_seed = Some(v);
        self
    }

    /// Adds a hyperparameter.
    pub fn model_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.model_params.insert(key.into(), value.to_string());
        self
    }

    /// Sets the comment.
    pub fn comment(mut self, v: impl Into<String>) -> Self {
        self.comment = Some(v.into());
        self
    }

    /// Sets the interval of log aggregation in training steps.
    pub fn logs_freq(mut self, v: usize) -> Self {
        self.logs_freq = v;
        self
    }

    /// Sets the interval of evaluation in training steps.
    pub fn evaluate_freq(mut self, v: usize) -> Self {
        self.evaluate_freq = v;
        self
    }

    /// Sets the verbosity level.
    pub fn verbose(mut self, v: u8) -> Self {
        self.verbose = v;
        self
    }

    /// Enables video recording with videos of `length` environment steps.
    pub fn make_video(mut self, length: usize) -> Self {
        self.make_video = true;
        self.video_length = length;
        self
    }

    /// Hyperparameters as `key: value` lines, in key order.
    ///
    /// Returns `None` if there is no hyperparameter.
    pub fn model_params_text(&self) -> Option<String> {
        if self.model_params.is_empty() {
            return None;
        }
        Some(
            self.model_params
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Constructs [`MonitorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MonitorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_monitor_config() -> Result<()> {
        let config = MonitorConfig::default()
            .env_name("CartPole-v1")
            .tracking("laboro", "cartpole", "dqn")
            .log_dir("/tmp/logs")
            .random_seed(42)
            .model_param("lr", 0.001)
            .comment("baseline")
            .make_video(200);

        let dir = TempDir::new("monitor_config")?;
        let path = dir.path().join("monitor_config.yaml");

        config.save(&path)?;
        let config_ = MonitorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<()> {
        let config: MonitorConfig = serde_yaml::from_str("env_name: Pendulum-v1\nlogs_freq: 10\n")?;
        assert_eq!(config.env_name, "Pendulum-v1");
        assert_eq!(config.logs_freq, 10);
        assert_eq!(config.evaluate_freq, 10_000);
        assert_eq!(config.video_length, 1000);
        assert!(!config.make_video);
        Ok(())
    }

    #[test]
    fn test_model_params_text() {
        assert_eq!(MonitorConfig::default().model_params_text(), None);

        let config = MonitorConfig::default()
            .model_param("gamma", 0.99)
            .model_param("batch_size", 64);
        assert_eq!(
            config.model_params_text().unwrap(),
            "batch_size: 64\ngamma: 0.99"
        );
    }
}
