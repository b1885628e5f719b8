use crate::{system_time_as_millis, Experiment, MlflowTrackingSession, Run};
use anyhow::{Context, Result};
use log::info;
use reqwest::{blocking::Client, StatusCode};
use rlwatch_core::Tracker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
/// Internally used.
struct Experiment_ {
    pub(crate) experiment: Experiment,
}

#[derive(Debug, Deserialize)]
/// Internally used.
struct Run_ {
    run: Run,
}

#[derive(Debug, Serialize)]
/// Parameters adapted from <https://mlflow.org/docs/latest/rest-api.html#create-run>.
struct CreateRunParams {
    experiment_id: String,
    start_time: i64,
    run_name: String,
}

#[derive(Debug, Serialize)]
struct CreateExperimentParams {
    name: String,
}

/// Provides access to a MLflow tracking server via REST API.
///
/// Support Mlflow API version 2.0.
#[derive(Clone)]
pub struct MlflowTrackingClient {
    client: Client,

    /// Base URL.
    base_url: String,

    /// User name of the tracking server.
    user_name: String,

    /// Password.
    password: String,
}

impl MlflowTrackingClient {
    /// Constructs a client of the tracking server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            user_name: "".to_string(),
            password: "".to_string(),
        }
    }

    /// Constructs a client from the environment variables used by MLflow itself:
    /// `MLFLOW_TRACKING_URI`, `MLFLOW_TRACKING_USERNAME` and `MLFLOW_TRACKING_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("MLFLOW_TRACKING_URI").context("MLFLOW_TRACKING_URI must be set")?;
        let client = Self::new(base_url);
        match std::env::var("MLFLOW_TRACKING_USERNAME") {
            Ok(user_name) => {
                let password = std::env::var("MLFLOW_TRACKING_PASSWORD").unwrap_or_default();
                Ok(client.basic_auth(user_name, password))
            }
            Err(_) => Ok(client),
        }
    }

    /// Set user name and password for basic authentication of the tracking server.
    pub fn basic_auth(self, user_name: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        Self {
            client: self.client,
            base_url: self.base_url,
            user_name: user_name.as_ref().to_string(),
            password: password.as_ref().to_string(),
        }
    }

    /// Get [`Experiment`] by name from the tracking server.
    ///
    /// If the experiment with given name does not exist in the tracking server,
    /// it will be created.
    pub fn get_experiment(&self, name: impl AsRef<str>) -> Result<Experiment> {
        let name = name.as_ref();
        let resp = self.get(
            self.url("experiments/get-by-name"),
            &[("experiment_name", name)],
        )?;

        let resp = if resp.status() == StatusCode::NOT_FOUND {
            info!("Create experiment '{}'", name);
            self.post(
                self.url("experiments/create"),
                &CreateExperimentParams { name: name.into() },
            )?
            .error_for_status()
            .with_context(|| format!("Failed to create experiment '{}'", name))?;
            self.get(
                self.url("experiments/get-by-name"),
                &[("experiment_name", name)],
            )?
        } else {
            resp
        };

        let experiment: Experiment_ = resp
            .error_for_status()
            .with_context(|| format!("Failed to get experiment '{}'", name))?
            .json()?;
        Ok(experiment.experiment)
    }

    pub(crate) fn url(&self, api: impl AsRef<str>) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, api.as_ref())
    }

    fn get(
        &self,
        url: String,
        query: &impl Serialize,
    ) -> reqwest::Result<reqwest::blocking::Response> {
        self.client
            .get(url)
            .basic_auth(&self.user_name, Some(&self.password))
            .query(query)
            .send()
    }

    pub(crate) fn post(
        &self,
        url: String,
        params: &impl Serialize,
    ) -> reqwest::Result<reqwest::blocking::Response> {
        self.client
            .post(url)
            .basic_auth(&self.user_name, Some(&self.password))
            .json(&params) // auto serialize
            .send()
    }

    /// Create [`MlflowTrackingSession`] corresponding to a new run in the given experiment.
    ///
    /// If `run_name` is empty (`""`), a run name is generated by the tracking server.
    pub fn create_session(
        &self,
        experiment_id: impl AsRef<str>,
        run_name: impl AsRef<str>,
    ) -> Result<MlflowTrackingSession> {
        let not_given_name = run_name.as_ref().is_empty();
        let resp = self
            .post(
                self.url("runs/create"),
                &CreateRunParams {
                    experiment_id: experiment_id.as_ref().to_string(),
                    start_time: system_time_as_millis() as i64,
                    run_name: run_name.as_ref().to_string(),
                },
            )?
            .error_for_status()
            .context("Failed to create run")?;

        let run = {
            let run: Run_ = resp.json().context("Failed to deserialize Run")?;
            run.run
        };
        if not_given_name {
            info!(
                "Run name '{}' has been automatically generated",
                run.info.run_name
            );
        }
        MlflowTrackingSession::new(self.clone(), &run)
    }
}

impl Tracker for MlflowTrackingClient {
    type Session = MlflowTrackingSession;

    /// Opens a new run named `experiment` in the MLflow experiment `account/project`.
    fn open(&self, account: &str, project: &str, experiment: &str) -> Result<Self::Session> {
        let experiment_name = format!("{}/{}", account, project);
        let experiment_id = self.get_experiment(&experiment_name)?.experiment_id;
        info!(
            "For experiment '{}', id={} is used",
            experiment_name, experiment_id
        );
        self.create_session(experiment_id, experiment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let client = MlflowTrackingClient::new("http://localhost:8080/");
        assert_eq!(
            client.url("runs/log-metric"),
            "http://localhost:8080/api/2.0/mlflow/runs/log-metric"
        );
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let client = MlflowTrackingClient::new("http://127.0.0.1:9");
        assert!(client.open("acc", "proj", "exp").is_err());
    }
}
