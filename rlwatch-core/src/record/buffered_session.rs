use super::{Record, Tracker, TrackingSession, STEP_KEY};
use anyhow::{anyhow, Result};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// Something a [`BufferedSession`] received.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A record given to [`TrackingSession::write`].
    Record(Record),

    /// Tags given to [`TrackingSession::append_tags`].
    Tags(Vec<String>),

    /// A text blob given to [`TrackingSession::log_text`].
    Text {
        /// Name of the blob.
        name: String,
        /// Content.
        text: String,
    },

    /// A video given to [`TrackingSession::log_video`], read at upload time.
    Video {
        /// Where the video was.
        path: PathBuf,
        /// Content of the file.
        bytes: Vec<u8>,
    },
}

/// A session keeping everything it receives in memory.
///
/// Useful for tests and for inspecting what a monitor would send to a
/// tracking backend.
#[derive(Debug, Default)]
pub struct BufferedSession {
    target: (String, String, String),
    events: Vec<SessionEvent>,
    failing_texts: HashSet<String>,
}

impl BufferedSession {
    /// Construct the session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`TrackingSession::log_text`] fail for the blob `name`.
    pub fn fail_text(mut self, name: impl Into<String>) -> Self {
        self.failing_texts.insert(name.into());
        self
    }

    /// `(account, project, experiment)` the session was opened for.
    pub fn target(&self) -> &(String, String, String) {
        &self.target
    }

    /// Returns an iterator over the received events.
    pub fn iter(&self) -> std::slice::Iter<SessionEvent> {
        self.events.iter()
    }

    /// Returns the records written to the session.
    pub fn records(&self) -> Vec<&Record> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Record(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Returns all tags attached to the session.
    pub fn tags(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Tags(tags) => Some(tags.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Returns the text logged under `name`, if any.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            SessionEvent::Text { name: n, text } if n == name => Some(text.as_str()),
            _ => None,
        })
    }

    /// Returns the uploaded videos as `(path, bytes)` pairs.
    pub fn videos(&self) -> Vec<(&Path, &[u8])> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Video { path, bytes } => Some((path.as_path(), bytes.as_slice())),
                _ => None,
            })
            .collect()
    }

    /// Returns the steps of the records, read from [`STEP_KEY`], in the order they were written.
    pub fn steps(&self) -> Vec<i64> {
        self.records()
            .into_iter()
            .filter_map(|r| r.get_integer(STEP_KEY).ok())
            .collect()
    }

    /// Returns the values of the scalar metric `key` in the order they were written.
    pub fn scalars(&self, key: &str) -> Vec<f32> {
        self.records()
            .into_iter()
            .filter_map(|r| r.get_scalar(key).ok())
            .collect()
    }
}

impl TrackingSession for BufferedSession {
    fn write(&mut self, record: Record) -> Result<()> {
        self.events.push(SessionEvent::Record(record));
        Ok(())
    }

    fn append_tags(&mut self, tags: &[String]) -> Result<()> {
        self.events.push(SessionEvent::Tags(tags.to_vec()));
        Ok(())
    }

    fn log_text(&mut self, name: &str, text: &str) -> Result<()> {
        if self.failing_texts.contains(name) {
            return Err(anyhow!("Failed to log text '{}'", name));
        }
        self.events.push(SessionEvent::Text {
            name: name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn log_video(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.events.push(SessionEvent::Video {
            path: path.to_path_buf(),
            bytes,
        });
        Ok(())
    }
}

/// Opens [`BufferedSession`]s.
#[derive(Debug, Default, Clone)]
pub struct BufferedTracker {
    unreachable: bool,
    failing_texts: Vec<String>,
}

impl BufferedTracker {
    /// Constructs the tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`Tracker::open`] fail, as if the backend could not be reached.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Sessions opened by this tracker fail to log the text blob `name`.
    pub fn fail_text(mut self, name: impl Into<String>) -> Self {
        self.failing_texts.push(name.into());
        self
    }
}

impl Tracker for BufferedTracker {
    type Session = BufferedSession;

    fn open(&self, account: &str, project: &str, experiment: &str) -> Result<Self::Session> {
        if self.unreachable {
            return Err(anyhow!("Tracking backend is unreachable"));
        }
        let mut session = self
            .failing_texts
            .iter()
            .fold(BufferedSession::new(), |s, name| s.fail_text(name.clone()));
        session.target = (
            account.to_string(),
            project.to_string(),
            experiment.to_string(),
        );
        Ok(session)
    }
}
