//! Aggregation of episode logs written during training.
//!
//! A training process writes one CSV file per episode monitor into the log
//! directory. Each file has a header and one row per finished episode, with
//! the episodic return in column `r` and the episode length in column `l`.
//! Lines starting with `#` are comments.
use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use log::{trace, warn};
use rlwatch_core::util::Summary;
use serde::Deserialize;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Suffix of the file names of episode logs.
pub const LOG_EXTENSION: &str = ".csv";

/// The number of the most recent episodes taken from each log file.
pub const WINDOW: usize = 4;

/// A row of an episode log.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EpisodeRecord {
    /// Episodic return.
    pub r: f32,

    /// Episode length.
    pub l: f32,
}

/// Summarizes the most recent episodes over all logs in `dir`.
///
/// From every log file the first data row is dropped and then the last
/// [`WINDOW`] rows are taken. The rows of all files are pooled before
/// computing the statistics. Returns `None` if no row was taken.
pub fn load_logs(dir: impl AsRef<Path>) -> Result<Option<Summary>> {
    let episodes = last_episodes(dir)?;
    let rewards = episodes.iter().map(|e| e.r).collect::<Vec<_>>();
    let lengths = episodes.iter().map(|e| e.l).collect::<Vec<_>>();
    Ok(Summary::from_episodes(&rewards, &lengths))
}

/// Returns the rows taken from all log files in `dir`, file by file in name order.
pub fn last_episodes(dir: impl AsRef<Path>) -> Result<Vec<EpisodeRecord>> {
    let mut episodes = Vec::new();
    for path in log_files(dir.as_ref())? {
        match read_last_episodes(&path) {
            Ok(rows) => {
                trace!("{} rows taken from {:?}", rows.len(), path);
                episodes.extend(rows);
            }
            Err(e) => match e.downcast_ref::<csv::Error>().map(|e| e.kind()) {
                Some(csv::ErrorKind::Io(io)) if io.kind() == ErrorKind::NotFound => {
                    warn!("{:?} disappeared before it was read", path)
                }
                _ => return Err(e.context(format!("Failed to read {:?}", path))),
            },
        }
    }
    Ok(episodes)
}

/// Lists the log files in `dir`, sorted by name.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.ends_with(LOG_EXTENSION))
        })
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

/// Reads a log file, drops its first data row and returns up to the last
/// [`WINDOW`] rows.
///
/// Rows that cannot be parsed, or whose `r` or `l` is missing or not a number,
/// are skipped with a warning. They still count as rows when the first row is
/// dropped and the window is taken.
fn read_last_episodes(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let mut rdr = ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(path)?;
    let headers = rdr.byte_headers()?.clone();

    let mut rows = Vec::new();
    for row in rdr.byte_records() {
        match row {
            Ok(row) => rows.push(Some(row)),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                warn!("Skip unreadable row in {:?}: {}", path, e);
                rows.push(None);
            }
        }
    }

    let rows = rows.get(1..).unwrap_or(&[]);
    let start = rows.len().saturating_sub(WINDOW);

    Ok(rows[start..]
        .iter()
        .flatten()
        .filter_map(|row| parse_row(row, &headers, path))
        .collect())
}

fn parse_row(row: &ByteRecord, headers: &ByteRecord, path: &Path) -> Option<EpisodeRecord> {
    match row.deserialize::<EpisodeRecord>(Some(headers)) {
        Ok(episode) => Some(episode),
        Err(e) => {
            warn!("Skip malformed row {:?} in {:?}: {}", row, path, e);
            None
        }
    }
}
