#![warn(missing_docs)]
//! Core traits and records of the training monitor.
//!
//! The training algorithm, the environment and the tracking backend are
//! external to this library. They are reached through the traits in this
//! crate: [`Env`], [`Policy`], [`Agent`], [`Evaluator`], [`Tracker`] and
//! [`TrackingSession`]. A monitor hooks into a training loop by implementing
//! [`Callback`].
pub mod dummy;
pub mod error;
pub mod record;
pub mod util;
pub mod video;

mod base;
pub use base::{Agent, Callback, Env, Policy, Step};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Episodes, Evaluator};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

pub use error::MonitorError;
pub use record::{Tracker, TrackingSession};
