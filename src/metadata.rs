// Driver display metadata: names, teams and colors

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::session::{DriverEntry, RaceSession};

/// Color used for drivers whose color cannot be resolved
pub const DEFAULT_DRIVER_COLOR: &str = "#FFFFFF";

/// Team colors used when the session does not carry its own
const TEAM_COLORS: [(&str, &str); 10] = [
    ("red bull racing", "#3671C6"),
    ("mclaren", "#FF8000"),
    ("ferrari", "#E8002D"),
    ("mercedes", "#27F4D2"),
    ("aston martin", "#229971"),
    ("alpine", "#00A1E8"),
    ("williams", "#64C4FF"),
    ("racing bulls", "#6692FF"),
    ("kick sauber", "#52E252"),
    ("haas f1 team", "#B6BABD"),
];

/// Static per-driver record shown by the replay client
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    pub abbreviation: String,
    pub team: String,
    pub full_name: String,
    /// Car number as reported by the session
    pub number: String,
    /// Display color as `#RRGGBB`
    pub color: String,
}

/// Lookup of display colors for drivers
pub trait DriverMetadataResolver {
    /// Color for the driver as `#RRGGBB`, or `None` when unknown
    fn driver_color(&self, driver: &DriverEntry) -> Option<String>;
}

/// Resolves colors from per-driver overrides, then the session's team color, then a
/// built-in team table.
pub struct TeamColorResolver {
    overrides: HashMap<String, String>,
    team_colors: HashMap<String, String>,
}

impl TeamColorResolver {
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            team_colors: TEAM_COLORS
                .iter()
                .map(|(team, color)| (team.to_string(), color.to_string()))
                .collect(),
        }
    }

    /// Force a color for one driver code. Invalid colors are ignored.
    pub fn with_override(mut self, abbreviation: &str, color: &str) -> Self {
        if let Some(color) = normalize_color(color) {
            self.overrides.insert(abbreviation.to_string(), color);
        }
        self
    }

    fn normalize_team_name(team_name: &str) -> String {
        team_name
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TeamColorResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverMetadataResolver for TeamColorResolver {
    fn driver_color(&self, driver: &DriverEntry) -> Option<String> {
        self.overrides
            .get(&driver.abbreviation)
            .cloned()
            .or_else(|| driver.team_color.as_deref().and_then(normalize_color))
            .or_else(|| {
                self.team_colors
                    .get(&Self::normalize_team_name(&driver.team_name))
                    .cloned()
            })
    }
}

/// Normalize a hex color to `#RRGGBB`. Returns `None` for anything that is not six hex
/// digits, with or without a leading '#'.
pub fn normalize_color(color: &str) -> Option<String> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}

/// Build the driver info map for every driver known to the session, keyed by code.
///
/// Drivers that only appear in telemetry get their code as name and empty team and
/// number. Unresolved colors fall back to [`DEFAULT_DRIVER_COLOR`].
pub fn resolve_drivers(
    session: &RaceSession,
    resolver: &impl DriverMetadataResolver,
) -> BTreeMap<String, DriverInfo> {
    session
        .driver_codes()
        .into_iter()
        .map(|code| {
            let entry = session.driver(&code).cloned().unwrap_or_else(|| DriverEntry {
                abbreviation: code.clone(),
                full_name: code.clone(),
                ..Default::default()
            });
            let color = resolver.driver_color(&entry).unwrap_or_else(|| {
                debug!("No color for driver {}, using default", code);
                DEFAULT_DRIVER_COLOR.to_string()
            });
            let info = DriverInfo {
                abbreviation: entry.abbreviation,
                team: entry.team_name,
                full_name: entry.full_name,
                number: entry.number,
                color,
            };
            (code, info)
        })
        .collect()
}
