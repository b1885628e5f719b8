//! Training monitor for reinforcement learning.
//!
//! [`TrainingMonitor`] hooks into a training loop through
//! [`Callback`](rlwatch_core::Callback). At regular intervals it summarizes
//! the episode logs written by the training process, evaluates the agent,
//! optionally records a video of it, and sends everything to a tracking
//! session. The best agent found by evaluation is kept in the log directory.
//!
//! ```no_run
//! use anyhow::Result;
//! use rlwatch::{MonitorConfig, TrainingMonitor};
//! use rlwatch_core::{
//!     dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
//!     Trainer, TrainerConfig,
//! };
//! use rlwatch_mlflow::MlflowTrackingClient;
//!
//! fn main() -> Result<()> {
//!     let config = MonitorConfig::default()
//!         .env_name("dummy")
//!         .tracking("laboro", "dummy", "run-1")
//!         .log_dir("./logs")
//!         .random_seed(42);
//!     let tracker = MlflowTrackingClient::new("http://localhost:8080");
//!     let mut monitor =
//!         TrainingMonitor::<DummyEnv, _>::new(config, DummyEnvConfig::default(), tracker);
//!
//!     let mut agent = DummyAgent::new(1.0);
//!     let mut trainer = Trainer::<DummyEnv>::build(TrainerConfig::default().max_steps(20_000));
//!     trainer.train(&mut agent, &mut monitor)?;
//!     Ok(())
//! }
//! ```
pub mod config;
pub mod logs;
pub mod monitor;
pub mod video;
pub use config::MonitorConfig;
pub use logs::load_logs;
pub use monitor::{TrainingMonitor, BEST_MODEL_FILE, N_EVAL_EPISODES};
