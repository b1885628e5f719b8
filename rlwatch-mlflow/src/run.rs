use serde::Deserialize;

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub info: RunInfo,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub run_name: String,
    pub(crate) experiment_id: String,
    status: Option<String>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    pub(crate) artifact_uri: Option<String>,
    lifecycle_stage: Option<String>,
}
