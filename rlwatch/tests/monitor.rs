use anyhow::Result;
use rlwatch::{
    monitor::{EVALUATION_KEYS, TRAINING_KEYS},
    MonitorConfig, TrainingMonitor, BEST_MODEL_FILE,
};
use rlwatch_core::{
    dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
    error::MonitorError,
    record::BufferedTracker,
    video::{Frame, VideoEncoder},
    Agent, Callback, Trainer, TrainerConfig,
};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};
use tempdir::TempDir;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(log_dir: &Path) -> MonitorConfig {
    MonitorConfig::default()
        .env_name("Dummy-v0")
        .tracking("laboro", "monitor", "exp")
        .log_dir(log_dir)
        .random_seed(42)
        .model_param("lr", 0.001)
}

fn monitor(config: MonitorConfig) -> TrainingMonitor<DummyEnv, BufferedTracker> {
    TrainingMonitor::new(config, DummyEnvConfig::default(), BufferedTracker::new())
}

fn write_log(dir: &Path, name: &str, rewards: &[f32]) -> Result<()> {
    let mut file = File::create(dir.join(name))?;
    writeln!(file, "r,l,t")?;
    for r in rewards {
        writeln!(file, "{},{},0.0", r, 10.0 * r)?;
    }
    Ok(())
}

/// Writes raw RGB bytes.
#[derive(Default)]
struct RawEncoder {
    file: Option<File>,
}

impl VideoEncoder for RawEncoder {
    fn open(&mut self, path: &Path) -> Result<()> {
        self.file = Some(File::create(path)?);
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(&frame.data)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }
}

#[test]
fn test_init_logs_metadata() -> Result<()> {
    init_logger();
    let tmp = TempDir::new("monitor")?;
    let log_dir = tmp.path().join("nested").join("logs");
    let mut monitor = monitor(config(&log_dir).comment("first try"));
    let agent = DummyAgent::new(1.0);

    assert!(monitor.session().is_none());
    monitor.init(&agent)?;
    assert!(log_dir.is_dir());

    let session = monitor.session().unwrap();
    assert_eq!(
        session.target(),
        &("laboro".to_string(), "monitor".to_string(), "exp".to_string())
    );
    assert_eq!(session.tags(), vec!["DummyAgent", "Dummy-v0", "seed: 42"]);
    assert_eq!(session.text("Model Params"), Some("lr: 0.001"));
    let path_text = log_dir.to_string_lossy().to_string();
    assert_eq!(session.text("Path to local files"), Some(path_text.as_str()));
    assert_eq!(session.text("Comment"), Some("first try"));
    Ok(())
}

#[test]
fn test_init_without_optional_metadata() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let config = MonitorConfig::default()
        .env_name("Dummy-v0")
        .log_dir(tmp.path());
    let mut monitor = monitor(config);
    monitor.init(&DummyAgent::new(1.0))?;

    let session = monitor.session().unwrap();
    assert_eq!(session.tags(), vec!["DummyAgent", "Dummy-v0"]);
    assert_eq!(session.text("Model Params"), None);
    assert_eq!(session.text("Comment"), None);
    Ok(())
}

#[test]
fn test_init_ignores_failed_model_params_upload() -> Result<()> {
    init_logger();
    let tmp = TempDir::new("monitor")?;
    let tracker = BufferedTracker::new().fail_text("Model Params");
    let mut monitor =
        TrainingMonitor::<DummyEnv, _>::new(config(tmp.path()), DummyEnvConfig::default(), tracker);
    monitor.init(&DummyAgent::new(1.0))?;

    let session = monitor.session().unwrap();
    assert_eq!(session.text("Model Params"), None);
    assert!(session.text("Path to local files").is_some());
    Ok(())
}

#[test]
fn test_init_fails_when_backend_is_unreachable() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let tracker = BufferedTracker::new().unreachable();
    let mut monitor =
        TrainingMonitor::<DummyEnv, _>::new(config(tmp.path()), DummyEnvConfig::default(), tracker);

    assert!(monitor.init(&DummyAgent::new(1.0)).is_err());
    assert!(monitor.session().is_none());
    Ok(())
}

#[test]
fn test_video_requires_encoder() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()).make_video(10));
    let err = monitor.init(&DummyAgent::new(1.0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MonitorError>(),
        Some(MonitorError::VideoEncoderMissing)
    ));
    Ok(())
}

#[test]
fn test_on_step_before_init() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    let err = monitor.on_step(&mut agent, 100).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MonitorError>(),
        Some(MonitorError::NotInitialized)
    ));
    Ok(())
}

#[test]
fn test_no_log_data_sends_nothing() -> Result<()> {
    init_logger();
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    // Header only: the file has no data row
    write_log(tmp.path(), "0.monitor.csv", &[])?;
    assert!(monitor.on_step(&mut agent, 100)?);
    assert!(monitor.session().unwrap().records().is_empty());

    // Not a multiple of either interval
    assert!(monitor.on_step(&mut agent, 150)?);
    assert!(monitor.session().unwrap().records().is_empty());
    Ok(())
}

#[test]
fn test_no_log_data_does_not_skip_evaluation() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    // Both triggers are due, but the log directory has no episode
    assert!(monitor.on_step(&mut agent, 10_000)?);

    let session = monitor.session().unwrap();
    assert!(session.scalars(TRAINING_KEYS[0]).is_empty());
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.scalars(EVALUATION_KEYS[0]), vec![10.0]);
    assert_eq!(session.steps(), vec![10_000]);
    assert_eq!(agent.n_saved(), 1);
    Ok(())
}

#[test]
fn test_steps_of_long_runs_are_exact() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    // Above 2^26, where f32 cannot hold every integer
    write_log(tmp.path(), "0.monitor.csv", &[0.0, 1.0])?;
    assert!(monitor.on_step(&mut agent, 67_108_900)?);

    let session = monitor.session().unwrap();
    assert_eq!(session.steps(), vec![67_108_900]);
    assert_eq!(session.scalars(TRAINING_KEYS[0]), vec![1.0]);
    Ok(())
}

#[test]
fn test_logs_trigger() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    write_log(tmp.path(), "0.monitor.csv", &[0.0, 1.0, 2.0, 3.0, 4.0])?;
    assert!(monitor.on_step(&mut agent, 200)?);

    let session = monitor.session().unwrap();
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.steps(), vec![200]);
    assert_eq!(session.scalars(TRAINING_KEYS[0]), vec![2.5]);
    assert_eq!(session.scalars(TRAINING_KEYS[2]), vec![25.0]);
    assert!(session.scalars(EVALUATION_KEYS[0]).is_empty());
    Ok(())
}

#[test]
fn test_coinciding_triggers() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    write_log(tmp.path(), "0.monitor.csv", &[0.0, 1.0, 2.0])?;
    assert!(monitor.on_step(&mut agent, 10_000)?);

    let session = monitor.session().unwrap();
    assert_eq!(session.steps(), vec![10_000, 10_000]);
    assert_eq!(session.scalars(TRAINING_KEYS[0]), vec![1.5]);
    assert_eq!(session.scalars(TRAINING_KEYS[1]), vec![0.5]);

    // Default episodes are 10 steps long with reward 1.0 per step
    assert_eq!(session.scalars(EVALUATION_KEYS[0]), vec![10.0]);
    assert_eq!(session.scalars(EVALUATION_KEYS[1]), vec![0.0]);
    assert_eq!(session.scalars(EVALUATION_KEYS[2]), vec![10.0]);
    assert_eq!(session.scalars(EVALUATION_KEYS[3]), vec![0.0]);
    Ok(())
}

#[test]
fn test_best_model_is_saved_on_strict_improvement() -> Result<()> {
    init_logger();
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()).logs_freq(0).evaluate_freq(100));
    let mut agent = DummyAgent::new(1.0);
    let path = tmp.path().join(BEST_MODEL_FILE);
    monitor.init(&agent)?;

    monitor.on_step(&mut agent, 100)?;
    assert_eq!(agent.n_saved(), 1);
    assert_eq!(monitor.best_mean_reward(), 10.0);
    assert_eq!(fs::read_to_string(&path)?, "1");

    // Equal
    monitor.on_step(&mut agent, 200)?;
    assert_eq!(agent.n_saved(), 1);

    // Lower
    agent.set_action(0.5);
    monitor.on_step(&mut agent, 300)?;
    assert_eq!(agent.n_saved(), 1);
    assert_eq!(monitor.best_mean_reward(), 10.0);

    // Higher
    agent.set_action(2.0);
    monitor.on_step(&mut agent, 400)?;
    assert_eq!(agent.n_saved(), 2);
    assert_eq!(monitor.best_mean_reward(), 20.0);
    assert_eq!(fs::read_to_string(&path)?, "2");

    assert_eq!(
        monitor.session().unwrap().scalars(EVALUATION_KEYS[0]),
        vec![10.0, 10.0, 5.0, 20.0]
    );
    Ok(())
}

#[test]
fn test_evaluation_restores_training_mode() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    let mut monitor = monitor(config(tmp.path()).evaluate_freq(100));
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    agent.train();
    monitor.on_step(&mut agent, 100)?;
    assert!(agent.is_train());

    agent.eval();
    monitor.on_step(&mut agent, 200)?;
    assert!(!agent.is_train());
    Ok(())
}

#[test]
fn test_video_is_uploaded_then_deleted() -> Result<()> {
    init_logger();
    let tmp = TempDir::new("monitor")?;
    let config = config(tmp.path()).evaluate_freq(100).make_video(5);
    let mut monitor = monitor(config).with_video_encoder(RawEncoder::default());
    let mut agent = DummyAgent::new(1.0);
    monitor.init(&agent)?;

    assert!(monitor.on_step(&mut agent, 100)?);

    let video = tmp.path().join("exp-step-100-step-0-to-step-5.mp4");
    let meta = tmp.path().join("exp-step-100-step-0-to-step-5.meta.json");
    let session = monitor.session().unwrap();
    let videos = session.videos();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].0, video.as_path());

    // A frame after the reset and one after each of the 5 steps
    assert_eq!(videos[0].1.len(), 6 * 4 * 3 * 3);
    assert!(!video.exists());
    assert!(!meta.exists());
    Ok(())
}

#[test]
fn test_monitor_in_trainer() -> Result<()> {
    let tmp = TempDir::new("monitor")?;
    write_log(tmp.path(), "0.monitor.csv", &[0.0, 1.0])?;
    let mut monitor = monitor(config(tmp.path()).logs_freq(10).evaluate_freq(50));
    let mut agent = DummyAgent::new(1.0);
    let mut trainer = Trainer::<DummyEnv>::build(TrainerConfig::default().max_steps(100));

    assert_eq!(trainer.train(&mut agent, &mut monitor)?, 100);
    assert!(agent.is_train());
    assert_eq!(agent.n_saved(), 1);

    let session = monitor.session().unwrap();
    assert_eq!(session.scalars(TRAINING_KEYS[0]).len(), 10);
    assert_eq!(session.scalars(EVALUATION_KEYS[0]), vec![10.0, 10.0]);
    Ok(())
}
