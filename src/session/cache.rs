// On-disk cache for loaded sessions

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{RaceSession, SessionProvider};
use crate::ExportError;

/// A cached session together with the version of the source it was loaded from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct CachedSession {
    source_version: Option<String>,
    session: RaceSession,
}

impl CachedSession {
    /// An entry is stale when the source reports a version other than the stored one.
    /// Sources that cannot report a version accept any entry.
    fn matches(&self, source_version: Option<&str>) -> bool {
        source_version.is_none_or(|version| self.source_version.as_deref() == Some(version))
    }
}

/// Cache of loaded sessions with an explicit enable/disable lifecycle.
///
/// A new cache starts disabled. While disabled, lookups always miss and stores are
/// ignored, so callers can hold a cache unconditionally and toggle it from config.
pub struct SessionCache {
    /// Directory holding one JSON file per cached session
    cache_dir: PathBuf,
    enabled: bool,
    /// In-memory copies of sessions already read or stored during this run
    memory: HashMap<(u16, u32), CachedSession>,
}

impl SessionCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            enabled: false,
            memory: HashMap::new(),
        }
    }

    /// Default cache location in the user's cache directory
    pub fn default_cache_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("f1replay"))
    }

    /// Enable the cache, creating its directory if needed
    pub fn enable(&mut self) -> Result<(), ExportError> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).map_err(|e| ExportError::CacheIOError {
                operation: "create_cache_dir".to_string(),
                source: e,
            })?;
        }
        self.enabled = true;
        info!("Session cache enabled at {:?}", self.cache_dir);
        Ok(())
    }

    /// Disable the cache and drop in-memory entries. Files on disk are kept.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.memory.clear();
        debug!("Session cache disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn file_path(&self, year: u16, round: u32) -> PathBuf {
        self.cache_dir.join(format!("{}_round_{:02}.json", year, round))
    }

    /// Look up a cached session loaded from `source_version`. Unreadable cache files and
    /// entries recorded from another source version count as misses.
    pub fn get(
        &mut self,
        year: u16,
        round: u32,
        source_version: Option<&str>,
    ) -> Option<RaceSession> {
        if !self.enabled {
            return None;
        }
        if let Some(entry) = self.memory.get(&(year, round)) {
            if entry.matches(source_version) {
                debug!("Session cache memory hit for {} round {}", year, round);
                return Some(entry.session.clone());
            }
            debug!("Session cache entry for {} round {} is stale", year, round);
            return None;
        }

        let path = self.file_path(year, round);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read cache file {:?}: {}", path, e);
                return None;
            }
        };
        let entry = match serde_json::from_str::<CachedSession>(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring corrupt cache file {:?}: {}", path, e);
                return None;
            }
        };
        if !entry.matches(source_version) {
            info!(
                "Session {} round {} changed since it was cached, reloading",
                year, round
            );
            return None;
        }
        debug!("Session cache file hit for {} round {}", year, round);
        let session = entry.session.clone();
        self.memory.insert((year, round), entry);
        Some(session)
    }

    /// Store a session loaded from `source_version`. No-op while the cache is disabled.
    pub fn put(
        &mut self,
        year: u16,
        round: u32,
        source_version: Option<&str>,
        session: &RaceSession,
    ) -> Result<(), ExportError> {
        if !self.enabled {
            return Ok(());
        }

        let entry = CachedSession {
            source_version: source_version.map(str::to_string),
            session: session.clone(),
        };
        let file_path = self.file_path(year, round);
        let temp_path = file_path.with_extension("json.tmp");
        let content = serde_json::to_string(&entry)
            .map_err(|e| ExportError::CacheSerializeError { source: e })?;

        // Write to temporary file first
        {
            let mut temp_file =
                fs::File::create(&temp_path).map_err(|e| ExportError::CacheIOError {
                    operation: "create_temp_file".to_string(),
                    source: e,
                })?;
            temp_file
                .write_all(content.as_bytes())
                .map_err(|e| ExportError::CacheIOError {
                    operation: "write_temp_file".to_string(),
                    source: e,
                })?;
        }

        fs::rename(&temp_path, &file_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ExportError::CacheIOError {
                operation: "atomic_move".to_string(),
                source: e,
            }
        })?;

        self.memory.insert((year, round), entry);
        Ok(())
    }

    /// Remove every cached session, in memory and on disk
    pub fn clear(&mut self) -> Result<(), ExportError> {
        self.memory.clear();
        if !self.cache_dir.exists() {
            return Ok(());
        }
        let entries = fs::read_dir(&self.cache_dir).map_err(|e| ExportError::CacheIOError {
            operation: "read_cache_dir".to_string(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                fs::remove_file(&path).map_err(|e| ExportError::CacheIOError {
                    operation: "remove_cache_file".to_string(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }
}

/// Session provider that consults a [`SessionCache`] before the wrapped provider
pub struct CachedSessionProvider<P: SessionProvider> {
    inner: P,
    cache: SessionCache,
}

impl<P: SessionProvider> CachedSessionProvider<P> {
    pub fn new(inner: P, cache: SessionCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: SessionProvider> SessionProvider for CachedSessionProvider<P> {
    fn load_session(&mut self, year: u16, round: u32) -> Result<RaceSession, ExportError> {
        let source_version = self.inner.source_version(year, round);
        if let Some(session) = self.cache.get(year, round, source_version.as_deref()) {
            return Ok(session);
        }
        let session = self.inner.load_session(year, round)?;
        // A cache that cannot be written must not fail the export
        if let Err(e) = self
            .cache
            .put(year, round, source_version.as_deref(), &session)
        {
            warn!("Could not cache session {} round {}: {}", year, round, e);
        }
        Ok(session)
    }

    fn source_version(&self, year: u16, round: u32) -> Option<String> {
        self.inner.source_version(year, round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EventInfo, InMemorySessionProvider};
    use tempfile::TempDir;

    fn create_test_session() -> RaceSession {
        RaceSession {
            event: EventInfo {
                name: "Cached GP".to_string(),
                round: 4,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_starts_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().join("cache"));

        assert!(!cache.is_enabled());
        cache.put(2025, 4, None, &create_test_session()).unwrap();
        assert!(cache.get(2025, 4, None).is_none());
        assert!(!temp_dir.path().join("cache").exists());
    }

    #[test]
    fn test_enable_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().join("cache"));
        cache.enable().unwrap();

        let session = create_test_session();
        cache.put(2025, 4, None, &session).unwrap();
        assert_eq!(cache.get(2025, 4, None), Some(session.clone()));

        // A fresh cache over the same directory reads the file back
        let mut reopened = SessionCache::new(temp_dir.path().join("cache"));
        reopened.enable().unwrap();
        assert_eq!(reopened.get(2025, 4, None), Some(session));
        assert!(reopened.get(2025, 5, None).is_none());
    }

    #[test]
    fn test_disable_hides_entries() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().to_path_buf());
        cache.enable().unwrap();
        cache.put(2025, 4, None, &create_test_session()).unwrap();

        cache.disable();
        assert!(cache.get(2025, 4, None).is_none());

        cache.enable().unwrap();
        assert!(cache.get(2025, 4, None).is_some());
    }

    #[test]
    fn test_changed_source_version_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().to_path_buf());
        cache.enable().unwrap();
        let session = create_test_session();
        cache.put(2025, 4, Some("120-1000"), &session).unwrap();

        assert_eq!(cache.get(2025, 4, Some("120-1000")), Some(session.clone()));
        assert!(cache.get(2025, 4, Some("180-2000")).is_none());
        // A source that cannot report its version keeps using the cached copy
        assert_eq!(cache.get(2025, 4, None), Some(session.clone()));

        let mut reopened = SessionCache::new(temp_dir.path().to_path_buf());
        reopened.enable().unwrap();
        assert!(reopened.get(2025, 4, Some("180-2000")).is_none());
        assert_eq!(reopened.get(2025, 4, Some("120-1000")), Some(session));
    }

    #[test]
    fn test_corrupt_cache_file_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().to_path_buf());
        cache.enable().unwrap();
        fs::write(temp_dir.path().join("2025_round_04.json"), "{not json").unwrap();

        assert!(cache.get(2025, 4, None).is_none());
    }

    #[test]
    fn test_clear_removes_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SessionCache::new(temp_dir.path().to_path_buf());
        cache.enable().unwrap();
        cache.put(2025, 4, None, &create_test_session()).unwrap();

        cache.clear().unwrap();
        assert!(cache.get(2025, 4, None).is_none());
        assert!(!temp_dir.path().join("2025_round_04.json").exists());
    }

    #[test]
    fn test_cached_provider_loads_inner_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut inner = InMemorySessionProvider::new();
        inner.insert(2025, 4, create_test_session());

        let mut cache = SessionCache::new(temp_dir.path().to_path_buf());
        cache.enable().unwrap();
        let mut provider = CachedSessionProvider::new(inner, cache);

        let first = provider.load_session(2025, 4).unwrap();
        let second = provider.load_session(2025, 4).unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.inner().loads(), 1);
    }

    #[test]
    fn test_cached_provider_with_disabled_cache() {
        let temp_dir = TempDir::new().unwrap();
        let mut inner = InMemorySessionProvider::new();
        inner.insert(2025, 4, create_test_session());

        let cache = SessionCache::new(temp_dir.path().to_path_buf());
        let mut provider = CachedSessionProvider::new(inner, cache);

        provider.load_session(2025, 4).unwrap();
        provider.load_session(2025, 4).unwrap();
        assert_eq!(provider.inner().loads(), 2);
        assert!(provider.load_session(2025, 9).is_err());
    }
}
