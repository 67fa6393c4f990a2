// Assembly of the replay payload

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use log::info;
use serde::{Deserialize, Serialize};

use crate::metadata::{DriverInfo, DriverMetadataResolver, resolve_drivers};
use crate::session::RaceSession;
use crate::telemetry::{Frame, downsample, synchronize_session};
use crate::track::{TrackPoint, track_outline};

/// Default number of synchronized frames per exported frame
pub const DEFAULT_SAMPLE_RATE: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Event block of the payload
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub name: String,
    pub round: u32,
    pub year: u16,
    pub country: String,
    pub location: String,
}

/// Counts and sampling parameters of an export
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportMetadata {
    /// Frames in the payload
    pub total_frames: usize,
    /// Stride used by the downsampler
    pub sample_rate: usize,
    /// Frames before downsampling
    pub original_frames: usize,
}

/// The complete replay payload. Field order here is the key order of the encoded JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportBundle {
    pub event: EventSummary,
    pub track: Vec<TrackPoint>,
    pub drivers: BTreeMap<String, DriverInfo>,
    pub frames: Vec<Frame>,
    pub metadata: ExportMetadata,
}

#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    /// Championship year, reported in the event block
    pub year: u16,
    pub sample_rate: NonZeroUsize,
}

/// Run the pipeline over a loaded session: synchronize, downsample, then combine with
/// the track outline and driver metadata.
pub fn build_bundle(
    session: &RaceSession,
    resolver: &impl DriverMetadataResolver,
    options: ExportOptions,
) -> ExportBundle {
    let frames = synchronize_session(session);
    let original_frames = frames.len();
    let frames = downsample(frames, options.sample_rate);
    info!(
        "Downsampled {} frames to {} (sample rate {})",
        original_frames,
        frames.len(),
        options.sample_rate
    );

    ExportBundle {
        event: EventSummary {
            name: session.event.name.clone(),
            round: session.event.round,
            year: options.year,
            country: session.event.country.clone(),
            location: session.event.location.clone(),
        },
        track: track_outline(session),
        drivers: resolve_drivers(session, resolver),
        metadata: ExportMetadata {
            total_frames: frames.len(),
            sample_rate: options.sample_rate.get(),
            original_frames,
        },
        frames,
    }
}
