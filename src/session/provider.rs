use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use log::{debug, info};

use super::{RaceSession, SessionProvider, SessionRecord};
use crate::ExportError;

/// Loads sessions recorded as JSON Lines files.
///
/// Sessions live under `<session_dir>/<year>/round_<NN>.jsonl`, one [`SessionRecord`]
/// per line.
pub struct FileSessionProvider {
    session_dir: PathBuf,
}

impl FileSessionProvider {
    pub fn new(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }

    /// File path for a given year and round
    pub fn session_path(&self, year: u16, round: u32) -> PathBuf {
        self.session_dir
            .join(year.to_string())
            .join(format!("round_{:02}.jsonl", round))
    }
}

impl SessionProvider for FileSessionProvider {
    fn load_session(&mut self, year: u16, round: u32) -> Result<RaceSession, ExportError> {
        let path = self.session_path(year, round);
        if !path.exists() {
            return Err(ExportError::SessionNotFound { year, round, path });
        }
        debug!("Reading session file {:?}", path);

        let records = serde_jsonlines::json_lines(&path)
            .map_err(|e| ExportError::SessionReadError { source: e })?
            .collect::<Result<Vec<SessionRecord>, io::Error>>()
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                    ExportError::SessionParseError {
                        reason: format!("{:?}: {}", path, e),
                    }
                }
                _ => ExportError::SessionReadError { source: e },
            })?;

        let session = RaceSession::from_records(round, records);
        info!(
            "Loaded {:?}, found {} drivers, {} laps and {} samples",
            path,
            session.drivers.len(),
            session.laps.len(),
            session.telemetry.values().map(Vec::len).sum::<usize>()
        );
        Ok(session)
    }

    /// File length and modification time, in nanoseconds since the epoch
    fn source_version(&self, year: u16, round: u32) -> Option<String> {
        let metadata = fs::metadata(self.session_path(year, round)).ok()?;
        let modified = metadata
            .modified()
            .ok()?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_nanos();
        Some(format!("{}-{}", metadata.len(), modified))
    }
}

/// Serves sessions held in memory, for tests and offline pipelines
#[derive(Default)]
pub struct InMemorySessionProvider {
    sessions: HashMap<(u16, u32), RaceSession>,
    loads: usize,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: u16, round: u32, session: RaceSession) {
        self.sessions.insert((year, round), session);
    }

    /// Number of successful loads served so far
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn load_session(&mut self, year: u16, round: u32) -> Result<RaceSession, ExportError> {
        let session = self
            .sessions
            .get(&(year, round))
            .cloned()
            .ok_or_else(|| ExportError::SessionNotFound {
                year,
                round,
                path: PathBuf::from("<memory>"),
            })?;
        self.loads += 1;
        Ok(session)
    }
}
