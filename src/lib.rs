//! handrig: drive a rigged 3D hand model from hand-tracking sensor frames
//!
//! This crate bundles the workspace into one dependency:
//! - [`handrig_core`]: tracker, slot pool, sensor sources and scene abstraction
//! - [`handrig_config`]: TOML configuration and discovery
//! - [`cli`]: the `handrig` command-line runner

pub mod cli;

pub use handrig_config;
pub use handrig_core;

// Re-export commonly used types
pub use handrig_config::HandrigConfig;
pub use handrig_core::{
    HandTracker, HandsSnapshot, MemoryScene, ReconcileReport, SceneGraph, SensorFrame,
    SensorSource, TrackerConfig,
};
