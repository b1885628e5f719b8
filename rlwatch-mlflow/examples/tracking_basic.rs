use anyhow::Result;
use rlwatch_core::record::{Record, RecordValue, STEP_KEY};
use rlwatch_core::{Tracker, TrackingSession};
use rlwatch_mlflow::MlflowTrackingClient;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Two runs in the same project
    let client = MlflowTrackingClient::new("http://localhost:8080");
    let mut session_run1 = client.open("laboro", "tracking_basic", "run1")?;
    let mut session_run2 = client.open("laboro", "tracking_basic", "run2")?;
    session_run1.append_tags(&["Dqn".to_string(), "seed: 1".to_string()])?;
    session_run2.append_tags(&["Dqn".to_string(), "seed: 2".to_string()])?;
    session_run1.log_text("Comment", "faster decay")?;

    for i in 1..=100 {
        let env_steps = i * 100;
        let x = env_steps as f32;

        let mut record = Record::empty();
        record.insert(STEP_KEY, RecordValue::Integer(env_steps));
        record.insert(
            "mean reward from training",
            RecordValue::Scalar(1.0 - (-1e-3 * x).exp()),
        );
        session_run1.write(record)?;

        let mut record = Record::empty();
        record.insert(STEP_KEY, RecordValue::Integer(env_steps));
        record.insert(
            "mean reward from training",
            RecordValue::Scalar(1.0 - (-5e-4 * x).exp()),
        );
        session_run2.write(record)?;
    }

    Ok(())
}
