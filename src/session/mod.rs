// Recorded race sessions: the read-only input of the export pipeline

pub mod cache;
pub mod provider;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ExportError;

pub use cache::{CachedSessionProvider, SessionCache};
pub use provider::{FileSessionProvider, InMemorySessionProvider};

/// Event level information for a recorded session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventInfo {
    /// Event name (e.g., "British Grand Prix")
    pub name: String,
    /// Championship round number
    pub round: u32,
    pub country: String,
    pub location: String,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            round: 0,
            country: "Unknown".to_string(),
            location: "Unknown".to_string(),
        }
    }
}

/// A competitor as listed by the data provider
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct DriverEntry {
    /// Car number, kept as text the way timing feeds report it
    pub number: String,
    /// Three letter driver code, used as the driver key everywhere downstream
    pub abbreviation: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub full_name: String,
    /// Team color reported by the provider, if any (with or without leading '#')
    #[serde(default)]
    pub team_color: Option<String>,
}

/// One raw measurement for one driver
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct RawSample {
    /// Session time in seconds
    pub time: f64,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub lap: u32,
    /// Tire compound index
    #[serde(default)]
    pub tyre: u32,
    /// Speed in km/h
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub gear: u32,
    #[serde(default)]
    pub drs: u32,
    /// Race position, unknown for some samples
    #[serde(default)]
    pub position: Option<u32>,
}

/// A timed lap, used to pick the reference lap for the track outline
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lap {
    /// Driver code
    pub driver: String,
    pub number: u32,
    /// Session time in seconds at which the lap started
    pub start_time: f64,
    /// Lap time in seconds, absent for laps without a valid time
    #[serde(default)]
    pub lap_time: Option<f64>,
}

/// Session wide lap counter as reported by the timing feed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimingPoint {
    pub time: f64,
    pub lap: u32,
}

/// Immutable handle to a recorded event
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct RaceSession {
    pub event: EventInfo,
    pub drivers: Vec<DriverEntry>,
    pub laps: Vec<Lap>,
    /// Raw samples keyed by driver code
    pub telemetry: BTreeMap<String, Vec<RawSample>>,
    #[serde(default)]
    pub timing: Vec<TimingPoint>,
}

impl RaceSession {
    /// Build a session from a stream of records, in file order
    pub fn from_records(round: u32, records: impl IntoIterator<Item = SessionRecord>) -> Self {
        let mut session = RaceSession {
            event: EventInfo {
                round,
                ..Default::default()
            },
            ..Default::default()
        };
        for record in records {
            match record {
                SessionRecord::Event(event) => session.event = event,
                SessionRecord::Driver(driver) => session.drivers.push(driver),
                SessionRecord::Lap(lap) => session.laps.push(lap),
                SessionRecord::Sample { driver, sample } => {
                    session.telemetry.entry(driver).or_default().push(sample)
                }
                SessionRecord::Timing(point) => session.timing.push(point),
            }
        }
        session
    }

    /// All driver codes known to the session: listed drivers plus any driver with samples
    pub fn driver_codes(&self) -> BTreeSet<String> {
        self.drivers
            .iter()
            .map(|d| d.abbreviation.clone())
            .chain(self.telemetry.keys().cloned())
            .collect()
    }

    pub fn driver(&self, code: &str) -> Option<&DriverEntry> {
        self.drivers.iter().find(|d| d.abbreviation == code)
    }

    pub fn samples(&self, code: &str) -> &[RawSample] {
        self.telemetry.get(code).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One line of a recorded session file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRecord {
    Event(EventInfo),
    Driver(DriverEntry),
    Lap(Lap),
    Sample { driver: String, sample: RawSample },
    Timing(TimingPoint),
}

/// Source of recorded sessions.
///
/// Implementations decide where sessions come from (files, memory, a cache in front of
/// another provider). The export pipeline only ever reads the returned session.
pub trait SessionProvider {
    /// Load the session for the given championship year and round.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or cannot be decoded.
    fn load_session(&mut self, year: u16, round: u32) -> Result<RaceSession, ExportError>;

    /// Opaque version of the stored session, changing whenever its content may have
    /// changed. `None` when the source cannot tell.
    fn source_version(&self, _year: u16, _round: u32) -> Option<String> {
        None
    }
}
