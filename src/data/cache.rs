//! Session roster cache: one entry, keyed by source path.
//! Loaded on first use and shared by every scenario evaluation until the path changes or
//! a reload is requested. There is no time-based eviction.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::roster::{load_roster_with_report, LoadError, LoadReport, Roster};

/// A loaded roster plus where and when it came from.
#[derive(Debug, Clone)]
pub struct CachedRoster {
    pub source: PathBuf,
    pub roster: Arc<Roster>,
    pub report: LoadReport,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RosterCache {
    entry: Mutex<Option<CachedRoster>>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedRoster>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached roster for `path`, loading it if the cache is empty or holds another source.
    /// A failed load leaves any existing entry untouched.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<CachedRoster, LoadError> {
        let path = path.as_ref();
        let mut entry = self.lock();
        if let Some(cached) = entry.as_ref().filter(|c| c.source.as_path() == path) {
            return Ok(cached.clone());
        }
        let loaded = load_entry(path)?;
        *entry = Some(loaded.clone());
        Ok(loaded)
    }

    /// Re-read `path` even if it is already cached.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<CachedRoster, LoadError> {
        let path = path.as_ref();
        let mut entry = self.lock();
        let loaded = load_entry(path)?;
        *entry = Some(loaded.clone());
        Ok(loaded)
    }

    pub fn invalidate(&self) {
        self.lock().take();
    }

    pub fn current(&self) -> Option<CachedRoster> {
        self.lock().clone()
    }
}

fn load_entry(path: &Path) -> Result<CachedRoster, LoadError> {
    let (roster, report) = load_roster_with_report(path)?;
    info!(
        source = %path.display(),
        employees = report.employees_kept,
        skipped_non_employee = report.skipped_non_employee,
        skipped_invalid_comp = report.skipped_invalid_comp,
        "roster loaded"
    );
    Ok(CachedRoster {
        source: path.to_path_buf(),
        roster: Arc::new(roster),
        report,
        loaded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const HEADER: &str = "employee_id,name,role,department,location,comp_usd\n";

    fn write_roster(dir: &Path, file: &str, rows: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(&path, format!("{HEADER}{rows}")).expect("fixture should be written");
        path
    }

    #[test]
    fn same_path_returns_the_same_roster_without_reparsing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_roster(dir.path(), "roster.csv", "E1,Ada,Eng,R&D,NYC,100\n");
        let cache = RosterCache::new();

        let first = cache.get_or_load(&path).expect("first load");
        // Editing the file does not affect the cached snapshot.
        fs::write(&path, format!("{HEADER}E1,Ada,Eng,R&D,NYC,100\nE2,Bo,Ops,Ops,SF,200\n"))
            .expect("rewrite");
        let second = cache.get_or_load(&path).expect("cached load");

        assert!(Arc::ptr_eq(&first.roster, &second.roster));
        assert_eq!(second.roster.len(), 1);
    }

    #[test]
    fn different_path_replaces_the_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write_roster(dir.path(), "a.csv", "E1,Ada,Eng,R&D,NYC,100\n");
        let b = write_roster(dir.path(), "b.csv", "E1,Ada,Eng,R&D,NYC,100\nE2,Bo,Ops,Ops,SF,200\n");
        let cache = RosterCache::new();

        assert_eq!(cache.get_or_load(&a).expect("load a").roster.len(), 1);
        assert_eq!(cache.get_or_load(&b).expect("load b").roster.len(), 2);
        assert_eq!(cache.current().map(|c| c.source), Some(b));
    }

    #[test]
    fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_roster(dir.path(), "roster.csv", "E1,Ada,Eng,R&D,NYC,100\n");
        let cache = RosterCache::new();
        cache.get_or_load(&path).expect("load");

        fs::write(&path, format!("{HEADER}E1,Ada,Eng,R&D,NYC,100\nE2,Bo,Ops,Ops,SF,200\n"))
            .expect("rewrite");
        assert_eq!(cache.reload(&path).expect("reload").roster.len(), 2);
    }

    #[test]
    fn failed_load_keeps_previous_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = write_roster(dir.path(), "good.csv", "E1,Ada,Eng,R&D,NYC,100\n");
        let cache = RosterCache::new();
        cache.get_or_load(&good).expect("load");

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            cache.get_or_load(&missing),
            Err(LoadError::Read { .. })
        ));
        assert_eq!(cache.current().map(|c| c.source), Some(good));
    }

    #[test]
    fn invalidate_empties_the_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_roster(dir.path(), "roster.csv", "E1,Ada,Eng,R&D,NYC,100\n");
        let cache = RosterCache::new();
        cache.get_or_load(&path).expect("load");
        cache.invalidate();
        assert!(cache.current().is_none());
    }
}
