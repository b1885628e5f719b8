//! Types and traits for sending training metrics to a tracking backend.
//!
//! # Core Components
//!
//! * [`Record`] - A container for key-value pairs produced at a training step
//! * [`RecordValue`] - The values that can be stored in a [`Record`]
//! * [`Tracker`] - Opens a [`TrackingSession`] on a remote backend
//! * [`TrackingSession`] - Accepts records, tags, text and videos
//! * [`BufferedSession`] - Keeps everything it receives in memory
//! * [`NullSession`] - Discards everything it receives
//!
//! # Basic Usage
//!
//! ```rust
//! use rlwatch_core::record::{Record, RecordValue, STEP_KEY};
//!
//! let mut record = Record::empty();
//! record.insert(STEP_KEY, RecordValue::Integer(1000));
//! record.insert("mean reward from training", RecordValue::Scalar(-1.5));
//! assert_eq!(record.get_scalar("mean reward from training").unwrap(), -1.5);
//! ```
//!
//! The value at [`STEP_KEY`] is not a metric; sessions use it as the step of
//! the other values in the record. It is an [`RecordValue::Integer`], so steps
//! of long runs are kept exactly.
mod base;
mod buffered_session;
mod null_session;
mod session;

pub use base::{Record, RecordValue};
pub use buffered_session::{BufferedSession, BufferedTracker, SessionEvent};
pub use null_session::NullSession;
pub use session::{Tracker, TrackingSession};

/// Key of the training step in a [`Record`].
pub const STEP_KEY: &str = "env_steps";
