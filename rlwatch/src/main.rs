use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use rlwatch::{load_logs, MonitorConfig, TrainingMonitor};
use rlwatch_core::{
    dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
    record::NullSession,
    Trainer, TrainerConfig, Tracker,
};
use rlwatch_mlflow::MlflowTrackingClient;
use std::path::{Path, PathBuf};

/// Summarize episode logs and monitor training runs
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print statistics of the latest episodes in a log directory
    Summarize {
        /// Directory containing `*.csv` episode logs
        log_dir: PathBuf,
    },

    /// Write the default monitor configuration to a YAML file
    Config {
        /// Output path
        path: PathBuf,
    },

    /// Monitor a dummy agent, useful to check a tracking server
    Demo {
        /// Monitor configuration, defaults are used if not given
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// The number of training steps
        #[arg(long, default_value_t = 1000)]
        max_steps: usize,

        /// Log metrics with MLflow, configured by `MLFLOW_TRACKING_URI`
        #[arg(short, long, default_value_t = false)]
        mlflow: bool,
    },
}

fn summarize(log_dir: &Path) -> Result<()> {
    match load_logs(log_dir)? {
        Some(s) => {
            println!("mean reward: {}", s.mean_reward);
            println!("std reward:  {}", s.std_reward);
            println!("mean length: {}", s.mean_length);
            println!("std length:  {}", s.std_length);
        }
        None => println!("no data"),
    }
    Ok(())
}

fn demo<T: Tracker>(config: MonitorConfig, tracker: T, max_steps: usize) -> Result<()> {
    let mut monitor =
        TrainingMonitor::<DummyEnv, _>::new(config, DummyEnvConfig::default(), tracker);
    let mut agent = DummyAgent::new(1.0);
    let mut trainer = Trainer::<DummyEnv>::build(TrainerConfig::default().max_steps(max_steps));
    let n_steps = trainer.train(&mut agent, &mut monitor)?;
    info!(
        "Finished {} steps, best mean reward {}",
        n_steps,
        monitor.best_mean_reward()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Summarize { log_dir } => summarize(&log_dir)?,
        Command::Config { path } => {
            MonitorConfig::default().save(&path)?;
            info!("Wrote {:?}", path);
        }
        Command::Demo {
            config,
            max_steps,
            mlflow,
        } => {
            let config = match config {
                Some(path) => MonitorConfig::load(path)?,
                None => MonitorConfig::default()
                    .env_name("dummy")
                    .tracking("rlwatch", "demo", "dummy")
                    .logs_freq(10)
                    .evaluate_freq(100)
                    .verbose(1),
            };
            if mlflow {
                demo(config, MlflowTrackingClient::from_env()?, max_steps)?;
            } else {
                demo(config, NullSession {}, max_steps)?;
            }
        }
    }

    Ok(())
}
