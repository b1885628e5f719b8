//! A tracking backend for rlwatch-core crate.
//!
//! This crate is based on [MLflow](https://mlflow.org) tracking.
//!
//! Before running the program using this crate, run a tracking server with the following command:
//!
//! ```bash
//! mlflow server --host 127.0.0.1 --port 8080
//! ```
//!
//! A session of the monitor maps to MLflow as follows:
//!
//! * the project `account/project` is an MLflow experiment, created if it does not exist,
//! * the experiment name of the monitor is the name of a new run in it,
//! * scalar metrics are logged with the `env_steps` value of the record as their step,
//! * tags and text blobs are run tags,
//! * videos are copied to the artifact directory of the run.
//!
//! ```no_run
//! use anyhow::Result;
//! use rlwatch_core::record::{Record, RecordValue, STEP_KEY};
//! use rlwatch_core::{Tracker, TrackingSession};
//! use rlwatch_mlflow::MlflowTrackingClient;
//!
//! fn main() -> Result<()> {
//!     env_logger::init();
//!
//!     let client = MlflowTrackingClient::new("http://localhost:8080");
//!     let mut session = client.open("laboro", "cartpole", "dqn-run-1")?;
//!     session.append_tags(&["Dqn".to_string(), "CartPole-v1".to_string()])?;
//!
//!     for step in 1..=10 {
//!         let mut record = Record::empty();
//!         record.insert(STEP_KEY, RecordValue::Integer(step * 100));
//!         record.insert("mean reward from training", RecordValue::Scalar(step as f32));
//!         session.write(record)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Videos
//!
//! [`MlflowTrackingSession`] relies on the `MLFLOW_DEFAULT_ARTIFACT_ROOT` environment variable
//! to locate where videos are copied when the artifact URI of the run is served by the
//! tracking server (`mlflow-artifacts:/...`). Note that this environment variable
//! should be set for the program using this crate, not for the tracking server program.
//! Currently, only saving to the local file system is supported.
mod client;
mod experiment;
mod run;
mod session;
use anyhow::{bail, Context, Result};
pub use client::MlflowTrackingClient;
pub use experiment::{Experiment, ExperimentTag};
pub use run::{Run, RunInfo};
pub use session::MlflowTrackingSession;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment variable giving the local directory behind `mlflow-artifacts:/`.
pub const ARTIFACT_ROOT_VAR: &str = "MLFLOW_DEFAULT_ARTIFACT_ROOT";

/// Code adapted from <https://stackoverflow.com/questions/26593387>.
fn system_time_as_millis() -> u128 {
    let time = SystemTime::now();
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Get the directory to which artifacts of a run will be saved.
///
/// `artifact_uri` is the one reported by the tracking server. Local paths,
/// with or without the `file://` scheme, are used as they are. Proxied
/// artifacts (`mlflow-artifacts:/`) are resolved against `root`.
pub(crate) fn get_artifact_base(artifact_uri: &str, root: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = artifact_uri.strip_prefix("mlflow-artifacts:/") {
        let root = root.with_context(|| format!("{} must be set", ARTIFACT_ROOT_VAR))?;
        Ok(root.join(path.trim_start_matches('/')))
    } else if let Some(path) = artifact_uri.strip_prefix("file://") {
        Ok(PathBuf::from(path))
    } else if artifact_uri.contains("://") {
        bail!("Unsupported artifact location: {}", artifact_uri)
    } else {
        Ok(PathBuf::from(artifact_uri))
    }
}
