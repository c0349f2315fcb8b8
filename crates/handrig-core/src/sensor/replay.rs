//! Replays a JSON-lines sensor recording
//!
//! Each non-blank line holds one serialized [`SensorFrame`].

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::source::{SensorError, SensorSource};
use super::SensorFrame;

pub struct ReplaySource {
    path: PathBuf,
    lines: std::iter::Enumerate<std::io::Lines<BufReader<File>>>,
    exhausted: bool,
    frames_read: usize,
}

impl ReplaySource {
    /// Open a recording for playback
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SensorError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SensorError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines().enumerate(),
            exhausted: false,
            frames_read: 0,
        })
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Write frames as a recording that [`ReplaySource::open`] can play back
    pub fn record<'a>(
        path: impl AsRef<Path>,
        frames: impl IntoIterator<Item = &'a SensorFrame>,
    ) -> Result<(), SensorError> {
        let path = path.as_ref();
        let io_err = |source| SensorError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::create(path).map_err(io_err)?;
        for frame in frames {
            let json = serde_json::to_string(frame).map_err(|source| SensorError::Serialize {
                frame: frame.id,
                source,
            })?;
            writeln!(file, "{}", json).map_err(io_err)?;
        }
        Ok(())
    }
}

impl SensorSource for ReplaySource {
    fn latest_frame(&mut self) -> Result<SensorFrame, SensorError> {
        if self.exhausted {
            return Ok(SensorFrame::empty());
        }

        for (index, line) in self.lines.by_ref() {
            let line = line.map_err(|source| SensorError::Io {
                path: self.path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let frame = serde_json::from_str(&line).map_err(|source| SensorError::Parse {
                line: index + 1,
                source,
            })?;
            self.frames_read += 1;
            return Ok(frame);
        }

        debug!(path = %self.path.display(), frames = self.frames_read, "Recording exhausted");
        self.exhausted = true;
        Ok(SensorFrame::empty())
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
