use crate::{get_artifact_base, system_time_as_millis, MlflowTrackingClient, Run, ARTIFACT_ROOT_VAR};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, SecondsFormat};
use log::{info, warn};
use rlwatch_core::{
    record::{Record, RecordValue, STEP_KEY},
    TrackingSession,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct LogMetricParams<'a> {
    run_id: &'a String,
    key: &'a String,
    value: f64,
    timestamp: i64,
    step: i64,
}

#[derive(Debug, Serialize)]
struct UpdateRunParams<'a> {
    run_id: &'a String,
    status: String,
    end_time: i64,
    run_name: &'a String,
}

#[derive(Debug, Serialize)]
struct SetTagParams<'a> {
    run_id: &'a String,
    key: &'a str,
    value: &'a str,
}

/// A run on the MLflow tracking server.
///
/// [`TrackingSession::write()`] logs [`RecordValue::Scalar`] values in the record
/// as metrics. As an exception, `env_steps` is treated as the `step` field of Mlflow's metric data
/// (<https://mlflow.org/docs/latest/rest-api.html#metric>).
/// [`RecordValue::String`] values are set as tags of the run.
///
/// When dropped, this struct updates run's status to "FINISHED"
/// (<https://mlflow.org/docs/latest/rest-api.html#mlflowrunstatus>).
pub struct MlflowTrackingSession {
    client: MlflowTrackingClient,
    experiment_id: String,
    run_id: String,
    run_name: String,
    start_time: DateTime<Local>,
    artifact_uri: Option<String>,
}

impl MlflowTrackingSession {
    /// Create a new instance of `MlflowTrackingSession`.
    ///
    /// This method is used in [`MlflowTrackingClient::create_session()`].
    ///
    /// This method adds a tag "host_start_time" with the current time.
    /// This tag is useful when using mlflow-export-import: it losts the original time.
    /// See <https://github.com/mlflow/mlflow-export-import/issues/72>
    pub fn new(client: MlflowTrackingClient, run: &Run) -> Result<Self> {
        let start_time = Local::now();
        let session = Self {
            client,
            experiment_id: run.info.experiment_id.clone(),
            run_id: run.info.run_id.clone(),
            run_name: run.info.run_name.clone(),
            start_time,
            artifact_uri: run.info.artifact_uri.clone(),
        };

        // Record current time as tag "host_start_time"
        session.set_tag(
            "host_start_time",
            start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;

        Ok(session)
    }

    /// ID of the run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// ID of the experiment the run belongs to.
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Sets a tag of the run.
    pub fn set_tag(&self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        let params = SetTagParams {
            run_id: &self.run_id,
            key: key.as_ref(),
            value: value.as_ref(),
        };
        self.client
            .post(self.client.url("runs/set-tag"), &params)?
            .error_for_status()
            .with_context(|| format!("Failed to set tag '{}'", key.as_ref()))?;
        Ok(())
    }

    fn log_metric(&self, key: &String, value: f64, timestamp: i64, step: i64) -> Result<()> {
        let params = LogMetricParams {
            run_id: &self.run_id,
            key,
            value,
            timestamp,
            step,
        };
        self.client
            .post(self.client.url("runs/log-metric"), &params)?
            .error_for_status()
            .with_context(|| format!("Failed to log metric '{}'", key))?;
        Ok(())
    }

    /// Directory where artifacts of this run are stored.
    pub fn artifact_dir(&self) -> Result<PathBuf> {
        let uri = self
            .artifact_uri
            .as_ref()
            .context("The run has no artifact location")?;
        let root = std::env::var(ARTIFACT_ROOT_VAR).ok().map(PathBuf::from);
        get_artifact_base(uri, root.as_deref())
    }
}

impl TrackingSession for MlflowTrackingSession {
    fn write(&mut self, record: Record) -> Result<()> {
        let timestamp = system_time_as_millis() as i64;
        let step = metric_step(&record);

        for (key, value) in record.iter() {
            if key != STEP_KEY {
                match value {
                    RecordValue::Scalar(v) => self.log_metric(key, *v as f64, timestamp, step)?,
                    RecordValue::Integer(v) => self.log_metric(key, *v as f64, timestamp, step)?,
                    RecordValue::String(s) => self.set_tag(key, s)?,
                }
            }
        }
        Ok(())
    }

    /// Tags without value.
    fn append_tags(&mut self, tags: &[String]) -> Result<()> {
        for tag in tags.iter() {
            self.set_tag(tag, "")?;
        }
        Ok(())
    }

    fn log_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.set_tag(name, text)
    }

    /// Copies the video into `videos/` under the artifact directory of the run.
    ///
    /// MLflow server is assumed to be running on the same host as the program using this struct.
    fn log_video(&mut self, path: &Path) -> Result<()> {
        let dir = self.artifact_dir()?.join("videos");
        std::fs::create_dir_all(&dir)?;
        let file = path
            .file_name()
            .with_context(|| format!("Not a file: {:?}", path))?;
        let dest = dir.join(file);
        let bytes = std::fs::copy(path, &dest)?;
        info!("Copy {:?}, {:.2}MB", &dest, bytes as f32 / (1024. * 1024.));
        Ok(())
    }
}

impl Drop for MlflowTrackingSession {
    /// Update run's status to "FINISHED" when dropped.
    ///
    /// It also adds tags "host_end_time" and "host_duration" with the current time and duration.
    fn drop(&mut self) {
        let end_time = Local::now();
        let duration = end_time.signed_duration_since(self.start_time);
        if let Err(e) = self
            .set_tag(
                "host_end_time",
                end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .and_then(|_| self.set_tag("host_duration", format_duration(&duration)))
        {
            warn!("Failed to set end time of run {}: {:?}", self.run_id, e);
        }

        let params = UpdateRunParams {
            run_id: &self.run_id,
            status: "FINISHED".to_string(),
            end_time: end_time.timestamp_millis(),
            run_name: &self.run_name,
        };
        let resp = self
            .client
            .post(self.client.url("runs/update"), &params)
            .and_then(|resp| resp.error_for_status());
        if let Err(e) = resp {
            warn!("Failed to finish run {}: {:?}", self.run_id, e);
        }
    }
}

/// Step of the metrics in `record`, `0` if it has no step.
fn metric_step(record: &Record) -> i64 {
    match record.get(STEP_KEY) {
        Some(RecordValue::Integer(step)) => *step,
        Some(RecordValue::Scalar(step)) => *step as i64,
        _ => 0,
    }
}

fn format_duration(dt: &Duration) -> String {
    let mut seconds = dt.num_seconds();
    let mut minutes = seconds / 60;
    seconds %= 60;
    let hours = minutes / 60;
    minutes %= 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
