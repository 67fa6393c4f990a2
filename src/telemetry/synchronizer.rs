// Merges per-driver telemetry of different cadences into one frame sequence

use std::cmp::Ordering;
use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, warn};

use super::{DriverState, Frame};
use crate::session::{RaceSession, RawSample, TimingPoint};

/// Walks one driver's time-sorted samples, holding the latest sample at or before
/// the current frame time.
struct SampleCursor<'a> {
    samples: Vec<&'a RawSample>,
    next: usize,
    current: Option<&'a RawSample>,
}

impl<'a> SampleCursor<'a> {
    fn new(samples: Vec<&'a RawSample>) -> Self {
        Self {
            samples,
            next: 0,
            current: None,
        }
    }

    fn advance_to(&mut self, time: f64) -> Option<&'a RawSample> {
        while let Some(sample) = self.samples.get(self.next) {
            if sample.time > time {
                break;
            }
            self.current = Some(*sample);
            self.next += 1;
        }
        self.current
    }
}

/// Builds the union time base over all drivers and carries each driver's last known
/// sample forward to every frame.
///
/// Each driver's samples are visited once and the time base is a k-way merge of the
/// per-driver timestamp streams, so synchronization is linear in the number of
/// samples (times the log of the driver count).
pub struct FrameSynchronizer<'a> {
    /// Time-sorted samples with finite timestamps, one entry per known driver
    drivers: BTreeMap<String, Vec<&'a RawSample>>,
    /// Time-sorted session lap counter, may be empty
    timing: Vec<TimingPoint>,
}

impl<'a> FrameSynchronizer<'a> {
    /// Create a synchronizer over `driver_codes`. Drivers without an entry in
    /// `telemetry` still appear in every frame, with default state.
    pub fn new(
        driver_codes: impl IntoIterator<Item = String>,
        telemetry: &'a BTreeMap<String, Vec<RawSample>>,
    ) -> Self {
        let drivers = driver_codes
            .into_iter()
            .map(|code| {
                let samples = telemetry
                    .get(&code)
                    .map(|samples| sorted_samples(&code, samples))
                    .unwrap_or_default();
                (code, samples)
            })
            .collect();
        Self {
            drivers,
            timing: Vec::new(),
        }
    }

    /// Use a session wide timing signal for the frame lap
    pub fn with_timing(mut self, timing: &[TimingPoint]) -> Self {
        let mut timing: Vec<TimingPoint> = timing
            .iter()
            .copied()
            .filter(|point| point.time.is_finite())
            .collect();
        timing.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.timing = timing;
        self
    }

    /// Every distinct sample timestamp across all drivers, ascending
    pub fn time_base(&self) -> Vec<f64> {
        self.drivers
            .values()
            .map(|samples| samples.iter().map(|sample| sample.time))
            .kmerge_by(|a: &f64, b: &f64| a < b)
            .dedup()
            .collect()
    }

    /// Produce one frame per distinct timestamp.
    ///
    /// The frame lap comes from the timing signal when there is one (the lap of the
    /// latest timing point at or before the frame), otherwise it is the highest lap any
    /// driver has reached so far.
    pub fn frames(&self) -> Vec<Frame> {
        let time_base = self.time_base();
        let mut cursors: Vec<(&String, SampleCursor)> = self
            .drivers
            .iter()
            .map(|(code, samples)| (code, SampleCursor::new(samples.clone())))
            .collect();
        let mut timing_next = 0;
        let mut timing_lap = 0;

        let mut frames = Vec::with_capacity(time_base.len());
        for time in time_base {
            let mut leader_lap = 0;
            let positions: BTreeMap<String, DriverState> = cursors
                .iter_mut()
                .map(|(code, cursor)| {
                    let state = cursor
                        .advance_to(time)
                        .map(DriverState::from)
                        .unwrap_or_default();
                    leader_lap = leader_lap.max(state.lap);
                    (code.to_string(), state)
                })
                .collect();

            while let Some(point) = self.timing.get(timing_next) {
                if point.time > time {
                    break;
                }
                timing_lap = point.lap;
                timing_next += 1;
            }

            let lap = if self.timing.is_empty() {
                leader_lap
            } else {
                timing_lap
            };
            frames.push(Frame {
                time,
                lap,
                positions,
            });
        }

        debug!(
            "Synchronized {} drivers into {} frames",
            self.drivers.len(),
            frames.len()
        );
        frames
    }
}

/// Synchronize every driver of a session, listed or with samples
pub fn synchronize_session(session: &RaceSession) -> Vec<Frame> {
    FrameSynchronizer::new(session.driver_codes(), &session.telemetry)
        .with_timing(&session.timing)
        .frames()
}

fn sorted_samples<'a>(code: &str, samples: &'a [RawSample]) -> Vec<&'a RawSample> {
    let mut sorted: Vec<&RawSample> = samples
        .iter()
        .filter(|sample| sample.time.is_finite())
        .collect();
    if sorted.len() != samples.len() {
        warn!(
            "Dropped {} samples with invalid timestamps for driver {}",
            samples.len() - sorted.len(),
            code
        );
    }
    let in_order = sorted
        .windows(2)
        .all(|pair| pair[0].time.total_cmp(&pair[1].time) != Ordering::Greater);
    if !in_order {
        debug!("Samples for driver {} are not time ordered, sorting", code);
        // Stable, so the later of two samples sharing a timestamp still wins
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
    sorted
}
