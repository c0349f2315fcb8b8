//! Pull-based frame sources

use std::collections::VecDeque;
use std::path::PathBuf;

use super::SensorFrame;

/// Errors raised while producing frames
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Failed to read sensor recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize frame {frame}: {source}")]
    Serialize {
        frame: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies the latest frame once per tick.
///
/// Implementations always hand back a valid frame; a source with nothing
/// to report returns an empty one.
pub trait SensorSource {
    fn latest_frame(&mut self) -> Result<SensorFrame, SensorError>;

    /// Whether the source has no more recorded frames to offer
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Plays back a fixed list of frames, then empty frames forever
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    frames: VecDeque<SensorFrame>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = SensorFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl SensorSource for ScriptedSource {
    fn latest_frame(&mut self) -> Result<SensorFrame, SensorError> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}
