// Static track outline derived from the reference lap

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::session::{Lap, RaceSession};

/// A point of the track outline
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

/// The fastest lap of the session: smallest finite, positive lap time. Ties go to the
/// lap listed first.
pub fn fastest_lap(session: &RaceSession) -> Option<&Lap> {
    session
        .laps
        .iter()
        .filter_map(|lap| match lap.lap_time {
            Some(time) if time.is_finite() && time > 0.0 && lap.start_time.is_finite() => {
                Some((lap, time))
            }
            _ => None,
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(lap, _)| lap)
}

/// Outline of the track traced by the fastest lap, in time order.
///
/// Samples without both coordinates are skipped. Returns an empty outline when the
/// session has no valid lap.
pub fn track_outline(session: &RaceSession) -> Vec<TrackPoint> {
    let Some(lap) = fastest_lap(session) else {
        warn!("No valid lap in session, exporting an empty track outline");
        return Vec::new();
    };
    let start = lap.start_time;
    let end = start + lap.lap_time.unwrap_or(0.0);

    let mut window: Vec<_> = session
        .samples(&lap.driver)
        .iter()
        .filter(|sample| sample.time >= start && sample.time <= end)
        .collect();
    window.sort_by(|a, b| a.time.total_cmp(&b.time));

    let outline: Vec<TrackPoint> = window
        .into_iter()
        .filter_map(|sample| match (sample.x, sample.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(TrackPoint { x, y }),
            _ => None,
        })
        .collect();

    debug!(
        "Track outline from lap {} of {}: {} points",
        lap.number,
        lap.driver,
        outline.len()
    );
    outline
}
