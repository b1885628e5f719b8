//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The callback was used before its `init` method was called.
    #[error("The monitor has not been initialized")]
    NotInitialized,

    /// The environment cannot produce frames.
    #[error("Rendering is not supported by the environment")]
    RenderNotSupported,

    /// Video recording is enabled, but no encoder was given.
    #[error("Video recording is enabled without a video encoder")]
    VideoEncoderMissing,

    /// A frame does not match the size of the video being recorded.
    #[error("Frame size mismatch: expected {expected:?}, got {actual:?}")]
    FrameSizeMismatch {
        /// `(width, height)` of the video.
        expected: (usize, usize),
        /// `(width, height)` of the frame.
        actual: (usize, usize),
    },

    /// Evaluation was requested with zero episodes.
    #[error("The number of evaluation episodes must be positive")]
    NoEvaluationEpisodes,
}
