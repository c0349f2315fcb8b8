//! Configuration management for handrig
//!
//! Settings live in a single TOML file. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use handrig_core::{
    InteractionBox, Normalizer, Point3D, SceneRemap, SimulationSettings, TrackerConfig,
};

/// File name looked up in the working directory and the platform config dir
pub const CONFIG_FILE_NAME: &str = "handrig.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandrigConfig {
    #[serde(default)]
    pub tracker: TrackerSection,

    #[serde(default)]
    pub remap: RemapSection,

    #[serde(default)]
    pub sensor: SensorSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Pool size and clamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSection {
    /// Maximum hands tracked at once (default: 2)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Clamp palm positions to the interaction box (default: true)
    #[serde(default = "default_true")]
    pub clamp_palm: bool,

    /// Clamp joint positions to the interaction box (default: true)
    #[serde(default = "default_true")]
    pub clamp_joints: bool,
}

/// Unit cube to scene space mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemapSection {
    /// Edge length of the cube in scene units (default: 10.0)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Scene position of the cube's origin corner (default: [-5, -5, 15])
    #[serde(default = "default_offset")]
    pub offset: [f32; 3],

    /// Flip the depth axis (default: true)
    #[serde(default = "default_true")]
    pub invert_depth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    Replay,
}

/// Where frames come from and how often they are polled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSection {
    #[serde(default)]
    pub source: SourceKind,

    /// JSON-lines recording, required when `source = "replay"`
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// Milliseconds between ticks (default: 16)
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Identities of the simulated hands (default: [7, 12])
    #[serde(default = "default_hand_ids")]
    pub hand_ids: Vec<i32>,

    /// Ticks a simulated hand stays in view (default: 30)
    #[serde(default = "default_visible_ticks")]
    pub visible_ticks: u64,

    /// Ticks a simulated hand stays hidden (default: 10)
    #[serde(default = "default_hidden_ticks")]
    pub hidden_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_capacity() -> usize {
    handrig_core::tracker::DEFAULT_CAPACITY
}
fn default_scale() -> f32 {
    SceneRemap::SCALE
}
fn default_offset() -> [f32; 3] {
    let o = SceneRemap::OFFSET;
    [o.x, o.y, o.z]
}
fn default_tick_rate_ms() -> u64 {
    16
}
fn default_hand_ids() -> Vec<i32> {
    vec![7, 12]
}
fn default_visible_ticks() -> u64 {
    30
}
fn default_hidden_ticks() -> u64 {
    10
}
fn default_log_filter() -> String {
    "handrig=info".to_string()
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            clamp_palm: true,
            clamp_joints: true,
        }
    }
}

impl Default for RemapSection {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            offset: default_offset(),
            invert_depth: true,
        }
    }
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            replay_path: None,
            tick_rate_ms: default_tick_rate_ms(),
            hand_ids: default_hand_ids(),
            visible_ticks: default_visible_ticks(),
            hidden_ticks: default_hidden_ticks(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl HandrigConfig {
    /// Load and validate the config at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents, path.display().to_string())?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::parse(contents, "<string>".to_string())
    }

    fn parse(contents: &str, origin: String) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|source| ConfigError::Parse { origin, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `./handrig.toml`, then the platform config file, else defaults.
    ///
    /// Returns the path the config came from, if any.
    pub fn discover() -> Result<(Self, Option<PathBuf>)> {
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }
        debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Locations checked by [`HandrigConfig::discover`], in order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = ProjectDirs::from("dev", "handrig", "handrig") {
            paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracker.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "tracker.capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.remap.scale.is_finite() || self.remap.scale == 0.0 {
            return Err(ConfigError::Invalid {
                field: "remap.scale",
                reason: format!("must be finite and non-zero, got {}", self.remap.scale),
            });
        }
        if self.remap.offset.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "remap.offset",
                reason: "must be finite".to_string(),
            });
        }
        if self.sensor.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "sensor.tick_rate_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.sensor.source == SourceKind::Replay && self.sensor.replay_path.is_none() {
            return Err(ConfigError::Invalid {
                field: "sensor.replay_path",
                reason: "required when source is \"replay\"".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            clamp_palm: self.tracker.clamp_palm,
            clamp_joints: self.tracker.clamp_joints,
            remap: SceneRemap {
                scale: self.remap.scale,
                offset: Point3D::from(self.remap.offset),
                invert_depth: self.remap.invert_depth,
            },
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            capacity: self.tracker.capacity,
            normalizer: self.normalizer(),
            parent: None,
        }
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            hand_ids: self.sensor.hand_ids.clone(),
            visible_ticks: self.sensor.visible_ticks,
            hidden_ticks: self.sensor.hidden_ticks,
            interaction_box: InteractionBox::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HandrigConfig::from_toml_str("").unwrap();
        assert_eq!(config, HandrigConfig::default());
        assert_eq!(config.tracker.capacity, 2);
        assert_eq!(config.sensor.source, SourceKind::Simulated);
        assert_eq!(config.tracker_config(), TrackerConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = HandrigConfig::from_toml_str(
            r#"
            [tracker]
            capacity = 4
            clamp_joints = false

            [remap]
            offset = [0.0, 1.0, 2.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.capacity, 4);
        assert!(config.tracker.clamp_palm);
        assert!(!config.tracker.clamp_joints);
        assert_eq!(config.remap.scale, 10.0);

        let normalizer = config.normalizer();
        assert_eq!(normalizer.remap.offset, Point3D::new(0.0, 1.0, 2.0));
        assert!(!normalizer.clamp_joints);
    }

    #[test]
    fn test_validation() {
        let err = HandrigConfig::from_toml_str("[tracker]\ncapacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tracker.capacity", .. }));

        let err = HandrigConfig::from_toml_str("[remap]\nscale = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "remap.scale", .. }));

        let err = HandrigConfig::from_toml_str("[sensor]\ntick_rate_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sensor.tick_rate_ms", .. }));

        let err = HandrigConfig::from_toml_str("[sensor]\nsource = \"replay\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sensor.replay_path", .. }));
    }

    #[test]
    fn test_parse_errors() {
        let err = HandrigConfig::from_toml_str("[sensor]\nsource = \"webcam\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sensor]\nsource = \"replay\"\nreplay_path = \"frames.jsonl\"\ntick_rate_ms = 5"
        )
        .unwrap();

        let config = HandrigConfig::load(file.path()).unwrap();
        assert_eq!(config.sensor.source, SourceKind::Replay);
        assert_eq!(config.sensor.replay_path, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(config.sensor.tick_rate_ms, 5);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HandrigConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_toml_output_reloads() {
        let mut config = HandrigConfig::default();
        config.sensor.hand_ids = vec![1, 2, 3];
        let text = config.to_toml_string().unwrap();
        assert_eq!(HandrigConfig::from_toml_str(&text).unwrap(), config);
    }
}
