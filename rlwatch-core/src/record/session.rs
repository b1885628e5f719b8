use super::Record;
use anyhow::Result;
use std::path::Path;

/// A destination of metrics, text and media for a single training run.
///
/// A session is opened with [`Tracker::open`] and lives as long as the run.
pub trait TrackingSession {
    /// Writes the values in a record.
    ///
    /// Scalars and integers are logged as metrics at the step stored at
    /// [`STEP_KEY`](super::STEP_KEY).
    fn write(&mut self, record: Record) -> Result<()>;

    /// Attaches tags to the run.
    fn append_tags(&mut self, tags: &[String]) -> Result<()>;

    /// Logs a named text blob.
    fn log_text(&mut self, name: &str, text: &str) -> Result<()>;

    /// Uploads the video file at `path`.
    ///
    /// The file is not needed by the session after this method returns.
    fn log_video(&mut self, path: &Path) -> Result<()>;
}

/// Opens [`TrackingSession`]s on a tracking backend.
pub trait Tracker {
    /// The session type.
    type Session: TrackingSession;

    /// Opens a session for `experiment` in the project `account/project`.
    fn open(&self, account: &str, project: &str, experiment: &str) -> Result<Self::Session>;
}
