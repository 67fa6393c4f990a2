pub mod downsampler;
pub mod synchronizer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::RawSample;

pub use downsampler::{downsample, sample_indices};
pub use synchronizer::{FrameSynchronizer, synchronize_session};

/// A driver's state at one frame instant.
///
/// Coordinates and speed are `None` when the source had no finite value; integer
/// fields fall back to 0. Fields serialize in this order, and `None` serializes as
/// `null` rather than being omitted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct DriverState {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Race position, 0 when unknown
    pub position: u32,
    pub lap: u32,
    pub tyre: u32,
    pub speed: Option<f64>,
    pub gear: u32,
    pub drs: u32,
}

impl From<&RawSample> for DriverState {
    fn from(sample: &RawSample) -> Self {
        Self {
            x: finite(sample.x),
            y: finite(sample.y),
            position: sample.position.unwrap_or(0),
            lap: sample.lap,
            tyre: sample.tyre,
            speed: finite(sample.speed),
            gear: sample.gear,
            drs: sample.drs,
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Synchronized multi-driver snapshot at one timestamp
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Session time in seconds
    pub time: f64,
    /// Session wide lap in effect at `time`
    pub lap: u32,
    /// State of every known driver, keyed by driver code
    pub positions: BTreeMap<String, DriverState>,
}
