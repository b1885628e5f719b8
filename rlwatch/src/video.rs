//! Recording videos of a policy.
use anyhow::Result;
use log::{debug, warn};
use rlwatch_core::{
    video::{Frame, VideoEncoder},
    Env, MonitorError, Policy, Step,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Content of the metadata file written next to a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMeta {
    /// Environment step at which recording started.
    pub step_id: usize,

    /// Episode in which recording started.
    pub episode_id: usize,

    /// MIME type of the video.
    pub content_type: String,

    /// The number of frames in the video.
    pub frames: usize,

    /// Frame width in pixels.
    pub width: usize,

    /// Frame height in pixels.
    pub height: usize,
}

/// Files written by [`VideoRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFiles {
    /// The video.
    pub video: PathBuf,

    /// Metadata of the video.
    pub meta: PathBuf,
}

impl VideoFiles {
    /// Deletes both files. Failures are logged and otherwise ignored.
    pub fn remove(&self) {
        for path in [&self.video, &self.meta] {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Failed to remove {:?}: {}", path, e);
            }
        }
    }
}

/// Wraps an environment and records the frames it renders.
///
/// Recording starts at the first reset and stops after `video_length`
/// environment steps. A frame is captured after every reset and every step
/// while recording. The video is written to
/// `{dir}/{name_prefix}-step-0-to-step-{video_length}.mp4` and its metadata to
/// the same path with the `.meta.json` extension.
pub struct VideoRecorder<'a, E: Env> {
    env: E,
    encoder: &'a mut dyn VideoEncoder,
    files: VideoFiles,
    video_length: usize,
    recording: bool,
    opened: bool,
    step_id: usize,
    episode_id: usize,
    recorded_steps: usize,
    recorded_frames: usize,
    frame_size: Option<(usize, usize)>,
}

impl<'a, E: Env> VideoRecorder<'a, E> {
    /// Constructs a recorder around `env`.
    pub fn new(
        env: E,
        encoder: &'a mut dyn VideoEncoder,
        dir: impl AsRef<Path>,
        name_prefix: &str,
        video_length: usize,
    ) -> Self {
        let base = format!("{}-step-0-to-step-{}", name_prefix, video_length);
        let files = VideoFiles {
            video: dir.as_ref().join(format!("{}.mp4", base)),
            meta: dir.as_ref().join(format!("{}.meta.json", base)),
        };
        Self {
            env,
            encoder,
            files,
            video_length,
            recording: false,
            opened: false,
            step_id: 0,
            episode_id: 0,
            recorded_steps: 0,
            recorded_frames: 0,
            frame_size: None,
        }
    }

    /// Paths of the files written by this recorder.
    pub fn files(&self) -> &VideoFiles {
        &self.files
    }

    /// Resets the environment. Recording starts at the first reset.
    pub fn reset(&mut self) -> Result<E::Obs> {
        let obs = self.env.reset()?;
        if !self.opened {
            self.start_video()?;
        } else {
            self.episode_id += 1;
        }
        if self.recording {
            self.capture_frame()?;
        }
        Ok(obs)
    }

    /// Performs an environment step.
    pub fn step(&mut self, act: &E::Act) -> Result<Step<E>> {
        let step = self.env.step(act)?;
        self.step_id += 1;
        if self.recording {
            self.capture_frame()?;
            self.recorded_steps += 1;
            if self.recorded_steps >= self.video_length {
                debug!("Stop recording at step {}", self.step_id);
                self.recording = false;
            }
        }
        Ok(step)
    }

    /// Finalizes the video and writes the metadata file.
    pub fn close(self) -> Result<VideoFiles> {
        if self.opened {
            self.encoder.close()?;
        }
        let (width, height) = self.frame_size.unwrap_or((0, 0));
        let meta = VideoMeta {
            step_id: 0,
            episode_id: 0,
            content_type: "video/mp4".to_string(),
            frames: self.recorded_frames,
            width,
            height,
        };
        let writer = BufWriter::new(File::create(&self.files.meta)?);
        serde_json::to_writer(writer, &meta)?;
        Ok(self.files)
    }

    fn start_video(&mut self) -> Result<()> {
        debug!("Start recording {:?}", self.files.video);
        self.encoder.open(&self.files.video)?;
        self.opened = true;
        self.recording = self.video_length > 0;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<()> {
        let frame: Frame = self.env.render()?;
        match self.frame_size {
            None => self.frame_size = Some(frame.size()),
            Some(size) if size != frame.size() => {
                return Err(MonitorError::FrameSizeMismatch {
                    expected: size,
                    actual: frame.size(),
                }
                .into())
            }
            _ => {}
        }
        self.encoder.write_frame(&frame)?;
        self.recorded_frames += 1;
        Ok(())
    }
}

/// Runs `policy` for `video_length` steps in `env` while recording a video.
///
/// Episodes ending during recording are followed by a reset. Returns the
/// paths of the video and its metadata file.
pub fn record_video<E, P>(
    env: E,
    policy: &mut P,
    encoder: &mut dyn VideoEncoder,
    dir: impl AsRef<Path>,
    name_prefix: &str,
    video_length: usize,
) -> Result<VideoFiles>
where
    E: Env,
    P: Policy<E>,
{
    let mut recorder = VideoRecorder::new(env, encoder, dir, name_prefix, video_length);
    let mut obs = recorder.reset()?;
    for _ in 0..video_length {
        let act = policy.sample(&obs);
        let step = recorder.step(&act)?;
        obs = if step.is_done() {
            recorder.reset()?
        } else {
            step.obs
        };
    }
    recorder.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlwatch_core::{
        dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
        Agent,
    };
    use std::io::Write;
    use tempdir::TempDir;

    /// Writes raw RGB bytes.
    #[derive(Default)]
    struct RawEncoder {
        file: Option<File>,
        n_opened: usize,
    }

    impl VideoEncoder for RawEncoder {
        fn open(&mut self, path: &Path) -> Result<()> {
            self.file = Some(File::create(path)?);
            self.n_opened += 1;
            Ok(())
        }

        fn write_frame(&mut self, frame: &Frame) -> Result<()> {
            if let Some(file) = self.file.as_mut() {
                file.write_all(&frame.data)?;
            }
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            if let Some(mut file) = self.file.take() {
                file.flush()?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_record_video() -> Result<()> {
        let dir = TempDir::new("video")?;
        let config = DummyEnvConfig::default().episode_lens(vec![3]);
        let env = DummyEnv::build(&config, 0)?;
        let mut agent = DummyAgent::new(1.0);
        agent.eval();
        let mut encoder = RawEncoder::default();

        let files = record_video(env, &mut agent, &mut encoder, dir.path(), "exp-step-500", 7)?;
        assert_eq!(
            files.video,
            dir.path().join("exp-step-500-step-0-to-step-7.mp4")
        );
        assert_eq!(
            files.meta,
            dir.path().join("exp-step-500-step-0-to-step-7.meta.json")
        );
        assert_eq!(encoder.n_opened, 1);

        // 1 frame after the first reset, 7 after steps, 2 after resets at steps 3 and 6
        let frame_bytes = 4 * 3 * 3;
        assert_eq!(std::fs::read(&files.video)?.len(), 10 * frame_bytes);

        let meta: VideoMeta = serde_json::from_reader(File::open(&files.meta)?)?;
        assert_eq!(meta.frames, 10);
        assert_eq!((meta.width, meta.height), (4, 3));
        assert_eq!(meta.content_type, "video/mp4");

        files.remove();
        assert!(!files.video.exists());
        assert!(!files.meta.exists());

        // Removing again only logs warnings
        files.remove();
        Ok(())
    }
}
