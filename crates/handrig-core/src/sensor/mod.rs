//! Sensor-side data model and frame sources
//!
//! The tracker never talks to a device driver directly. It pulls frames
//! from a [`SensorSource`], which may be a recording, a scripted sequence
//! or a synthetic generator.

mod frame;
mod replay;
mod simulated;
mod source;

pub use frame::{
    FingerKind, HandId, Handedness, SensorFinger, SensorFrame, SensorHand, FINGERS_PER_HAND,
    JOINTS_PER_FINGER, SEGMENTS_PER_FINGER,
};
pub use replay::ReplaySource;
pub use simulated::{SimulatedSource, SimulationSettings};
pub use source::{ScriptedSource, SensorError, SensorSource};
