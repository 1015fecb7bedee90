//! Application icon lookup with a persistent, time-bounded cache.
//!
//! Windows are shown with their application's icon, which Alfred renders
//! from the application bundle on disk (`{"type": "fileicon"}`).  Finding
//! that bundle from a bundle id means asking Spotlight (`mdfind`) and, as a
//! fallback, AppleScript (`osascript`).  Both are slow, so every answer
//! (including "not found") is remembered in `icon_cache.json` for
//! [`DEFAULT_TTL_SECS`].
//!
//! The cache has an explicit lifecycle: [`IconCache::load`] at start,
//! mutate through [`IconResolver::resolve`], and
//! [`IconCache::save_if_dirty`] at the end of the run.  Cache I/O problems
//! are never fatal.

use crate::traits::CommandRunner;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default entry lifetime: one week.
pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Directory name used under the per-user cache root.
const CACHE_DIR_NAME: &str = "aerospace-alfred-workflow";

/// File name of the persisted cache.
const CACHE_FILE_NAME: &str = "icon_cache.json";

/// One remembered lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCacheEntry {
    /// Resolved application path, empty when the lookup found nothing.
    #[serde(default)]
    pub path: String,
    /// When the lookup happened, in seconds since the Unix epoch.
    #[serde(default)]
    pub ts: u64,
}

impl IconCacheEntry {
    /// Whether the entry is still usable at `now`.  A zero timestamp never
    /// counts as fresh.
    pub fn is_fresh(&self, now: u64, ttl_secs: u64) -> bool {
        self.ts != 0 && now.saturating_sub(self.ts) < ttl_secs
    }
}

/// Error from reading or writing the cache file.
///
/// Only ever logged: the cache is an optimization.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory view of the icon cache file.
#[derive(Debug, Default, Clone)]
pub struct IconCache {
    entries: HashMap<String, IconCacheEntry>,
    dirty: bool,
}

impl IconCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty cache.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(cache) => {
                debug!("loaded {} icon cache entries", cache.entries.len());
                cache
            }
            Err(e) => {
                debug!("starting with empty icon cache ({})", e);
                Self::new()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, CacheError> {
        let contents = std::fs::read_to_string(path)?;
        let entries = serde_json::from_str(&contents)?;
        Ok(Self {
            entries,
            dirty: false,
        })
    }

    /// Write the cache to `path`, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Persist the cache if anything changed during this run, logging
    /// (and otherwise ignoring) failures.
    pub fn save_if_dirty(&self, path: &Path) {
        if !self.dirty {
            return;
        }
        match self.save(path) {
            Ok(()) => debug!("saved {} icon cache entries", self.entries.len()),
            Err(e) => warn!("failed to save icon cache to {}: {}", path.display(), e),
        }
    }

    pub fn get(&self, bundle_id: &str) -> Option<&IconCacheEntry> {
        self.entries.get(bundle_id)
    }

    /// Record a lookup result and mark the cache dirty.
    pub fn insert(&mut self, bundle_id: &str, path: Option<&Path>, now: u64) {
        let path = path.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        self.entries
            .insert(bundle_id.to_string(), IconCacheEntry { path, ts: now });
        self.dirty = true;
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the cache file location from the process environment.
///
/// `$XDG_CACHE_HOME/aerospace-alfred-workflow/icon_cache.json`, falling back
/// to `~/Library/Caches/…`.  `override_dir` (from the config file) replaces
/// the directory entirely.  `None` when there is no home directory to fall
/// back to.
pub fn cache_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    cache_path_with(override_dir, |name| std::env::var(name).ok(), dirs::home_dir())
}

/// [`cache_path`] with the environment lookup and home directory supplied
/// by the caller.  An empty `XDG_CACHE_HOME` counts as unset.
pub fn cache_path_with<F>(override_dir: Option<&Path>, var: F, home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = override_dir {
        return Some(dir.join(CACHE_FILE_NAME));
    }
    let root = match var("XDG_CACHE_HOME").filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home?.join("Library").join("Caches"),
    };
    Some(root.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

/// Seconds since the Unix epoch.
pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Finds application bundles for bundle ids via `mdfind` and `osascript`.
pub struct IconResolver<R> {
    runner: R,
    ttl_secs: u64,
}

impl<R: CommandRunner> IconResolver<R> {
    pub fn new(runner: R, ttl_secs: u64) -> Self {
        Self { runner, ttl_secs }
    }

    /// Return the application path for `bundle_id`, if one can be found.
    ///
    /// Fresh cache entries are answered without running anything.
    /// Otherwise the lookup runs and its outcome (found or not) is written
    /// to `cache` with timestamp `now`.
    pub fn resolve(&self, bundle_id: &str, cache: &mut IconCache, now: u64) -> Option<PathBuf> {
        if bundle_id.is_empty() {
            return None;
        }

        if let Some(entry) = cache.get(bundle_id) {
            if entry.is_fresh(now, self.ttl_secs) {
                debug!("icon cache hit for {}", bundle_id);
                return (!entry.path.is_empty()).then(|| PathBuf::from(&entry.path));
            }
        }

        debug!("icon cache miss for {}", bundle_id);
        let resolved = self.lookup(bundle_id).filter(|p| p.exists());
        cache.insert(bundle_id, resolved.as_deref(), now);
        resolved
    }

    fn lookup(&self, bundle_id: &str) -> Option<PathBuf> {
        // Bundle ids are interpolated into quoted query strings below.
        if bundle_id.contains(['\'', '"', '\\']) {
            debug!("not searching for suspicious bundle id {:?}", bundle_id);
            return None;
        }
        self.spotlight(bundle_id)
            .or_else(|| self.applescript(bundle_id))
            .map(PathBuf::from)
    }

    fn spotlight(&self, bundle_id: &str) -> Option<String> {
        let query = format!("kMDItemCFBundleIdentifier == '{}'", bundle_id);
        let out = self
            .runner
            .run("mdfind", &[&query])
            .map_err(|e| debug!("mdfind failed for {}: {}", bundle_id, e))
            .ok()?;
        let first = out.lines().next().unwrap_or_default().trim();
        (!first.is_empty()).then(|| first.to_string())
    }

    fn applescript(&self, bundle_id: &str) -> Option<String> {
        let script = format!("POSIX path of (path to application id \"{}\")", bundle_id);
        let out = self
            .runner
            .run("osascript", &["-e", &script])
            .map_err(|e| debug!("osascript failed for {}: {}", bundle_id, e))
            .ok()?;
        let path = out.trim();
        (!path.is_empty()).then(|| path.to_string())
    }
}
