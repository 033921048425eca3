//! The shared file catalogue (C2): a basename -> absolute path index built from
//! watched directories, mirroring a shared file catalogue.

use crate::error::{FilesystemError, Result};
use crate::wildcard;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

struct Inner {
    /// Absolute `directory + wildcard` patterns already registered, in addition order.
    dir_list: Vec<String>,
    /// basename -> absolute path. Case-sensitive keys; `findi`/`fileExistsAs` scan linearly
    /// for a case-insensitive match, same as the original's `comparei` loop.
    file_list: BTreeMap<String, PathBuf>,
}

/// Shared index from logical filename to on-disk path.
///
/// All operations serialize through a single re-entrant mutex: `add_dir` may recurse into
/// itself while scanning subdirectories, and duplicate `add_dir` calls resync the whole
/// catalogue from within the lock, so the mutex must tolerate same-thread re-acquisition.
pub struct FileCatalogue {
    server_root: PathBuf,
    nofoldersconfig: std::sync::atomic::AtomicBool,
    inner: ReentrantMutex<RefCell<Inner>>,
}

impl FileCatalogue {
    /// `server_root` is joined onto every directory added via [`add_dir`](Self::add_dir),
    /// mirroring `server->getServerPath()` in the original. `nofoldersconfig` is the
    /// server-wide setting consulted when a caller doesn't force recursion explicitly.
    pub fn new(server_root: impl Into<PathBuf>, nofoldersconfig: bool) -> Self {
        Self {
            server_root: server_root.into(),
            nofoldersconfig: std::sync::atomic::AtomicBool::new(nofoldersconfig),
            inner: ReentrantMutex::new(RefCell::new(Inner {
                dir_list: Vec::new(),
                file_list: BTreeMap::new(),
            })),
        }
    }

    pub fn set_nofoldersconfig(&self, value: bool) {
        self.nofoldersconfig
            .store(value, std::sync::atomic::Ordering::Relaxed);
    }

    fn nofoldersconfig(&self) -> bool {
        self.nofoldersconfig.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Register a watched directory + wildcard pattern and scan it. Re-adding an
    /// already-registered directory is treated as a request to [`resync`](Self::resync)
    /// the whole catalogue rather than an error, matching the original.
    pub fn add_dir(&self, dir: &str, wildcard: &str, force_recursive: bool) {
        let normalized = normalize_dir(dir);
        let pattern = format!("{normalized}{wildcard}");

        let already_registered = {
            let guard = self.inner.lock();
            let inner = guard.borrow();
            inner.dir_list.iter().any(|d| *d == pattern)
        };
        if already_registered {
            self.resync();
            return;
        }

        {
            let guard = self.inner.lock();
            guard.borrow_mut().dir_list.push(pattern.clone());
        }

        let recursive = force_recursive || self.nofoldersconfig();
        let abs_dir = self.server_root.join(&normalized);
        self.scan_directory(&abs_dir, wildcard, recursive);
    }

    /// Walk one directory level, inserting matching files and recursing into
    /// subdirectories (via a fresh [`add_dir`](Self::add_dir) call, not a nested lock).
    fn scan_directory(&self, abs_dir: &Path, wildcard: &str, recursive: bool) {
        let entries = match std::fs::read_dir(abs_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %abs_dir.display(), error = %e, "addDir: directory unreadable");
                return;
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let is_dir = entry
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            if is_dir {
                if recursive {
                    subdirs.push(path);
                }
                continue;
            }

            if wildcard::matches(wildcard, &name) {
                let guard = self.inner.lock();
                guard.borrow_mut().file_list.insert(name, path);
            }
        }

        for subdir in subdirs {
            let Ok(rel) = subdir.strip_prefix(&self.server_root) else {
                continue;
            };
            let rel_str = format!("{}{}", path_to_unix(rel), std::path::MAIN_SEPARATOR);
            self.add_dir(&rel_str, "*", true);
        }
    }

    /// Insert a single file keyed by its basename, superseding any prior entry.
    pub fn add_file(&self, path: &str) {
        let path = normalize_separators(path);
        let basename = match path.rsplit_once(std::path::MAIN_SEPARATOR) {
            Some((_, base)) => base.to_string(),
            None => path.clone(),
        };
        let abs = self.server_root.join(&path);
        let guard = self.inner.lock();
        guard.borrow_mut().file_list.insert(basename, abs);
    }

    /// Remove a file entry by basename.
    pub fn remove_file(&self, name: &str) {
        let path = normalize_separators(name);
        let basename = match path.rsplit_once(std::path::MAIN_SEPARATOR) {
            Some((_, base)) => base.to_string(),
            None => path,
        };
        let guard = self.inner.lock();
        guard.borrow_mut().file_list.remove(&basename);
    }

    /// Clear the file list and rescan every registered directory. Idempotent: calling
    /// twice in a row yields the same `file_list`.
    pub fn resync(&self) {
        let dirs = {
            let guard = self.inner.lock();
            guard.borrow_mut().file_list.clear();
            guard.borrow().dir_list.clone()
        };

        let recursive = self.nofoldersconfig();
        for pattern in dirs {
            let (dir_part, wildcard_part) = split_dir_pattern(&pattern);
            let abs_dir = self.server_root.join(&dir_part);
            self.scan_directory(&abs_dir, &wildcard_part, recursive);
        }
    }

    /// Case-sensitive exact lookup.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let guard = self.inner.lock();
        guard.borrow().file_list.get(name).cloned()
    }

    /// Case-insensitive lookup; returns the absolute path of the first match.
    pub fn findi(&self, name: &str) -> Option<PathBuf> {
        let guard = self.inner.lock();
        let inner = guard.borrow();
        inner
            .file_list
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Case-insensitive lookup returning the canonical stored basename rather than the path.
    pub fn file_exists_as(&self, name: &str) -> Option<String> {
        let guard = self.inner.lock();
        let inner = guard.borrow();
        inner
            .file_list
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Read a catalogued file's bytes.
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .find(name)
            .ok_or_else(|| FilesystemError::NotFound(name.to_string()))?;
        std::fs::read(&path).map_err(|source| FilesystemError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Modification time as Unix seconds, or `None` if the file isn't catalogued or
    /// its metadata can't be read.
    pub fn get_mod_time(&self, name: &str) -> Option<u64> {
        let path = self.find(name)?;
        let meta = std::fs::metadata(&path).ok()?;
        let modified = meta.modified().ok()?;
        modified
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs())
    }

    /// Set a catalogued file's modification time. Returns `false` if the file isn't
    /// catalogued or the underlying `utime` call fails.
    pub fn set_mod_time(&self, name: &str, mod_time: u64) -> bool {
        let Some(path) = self.find(name) else {
            return false;
        };
        let ft = filetime::FileTime::from_unix_time(mod_time as i64, 0);
        filetime::set_file_mtime(&path, ft).is_ok()
    }

    /// Size in bytes of a catalogued file, or `None` if unreadable.
    pub fn get_file_size(&self, name: &str) -> Option<u64> {
        let path = self.find(name)?;
        std::fs::metadata(&path).ok().map(|m| m.len())
    }

    /// Number of distinct basenames currently catalogued.
    pub fn file_count(&self) -> usize {
        let guard = self.inner.lock();
        guard.borrow().file_list.len()
    }
}

fn normalize_dir(dir: &str) -> String {
    let mut s = normalize_separators(dir);
    if !s.ends_with(std::path::MAIN_SEPARATOR) {
        s.push(std::path::MAIN_SEPARATOR);
    }
    s
}

fn normalize_separators(s: &str) -> String {
    s.replace(['/', '\\'], &std::path::MAIN_SEPARATOR.to_string())
}

fn path_to_unix(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

/// Split a stored `dir_list` pattern (`"levels/*.nw"`) back into its directory and
/// wildcard parts for rescanning.
fn split_dir_pattern(pattern: &str) -> (String, String) {
    match pattern.rfind(std::path::MAIN_SEPARATOR) {
        Some(idx) => (
            pattern[..=idx].to_string(),
            pattern[idx + 1..].to_string(),
        ),
        None => (String::new(), pattern.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn setup() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("levels/sub")).unwrap();
        fs::write(dir.path().join("levels/arena.nw"), b"level-a").unwrap();
        fs::write(dir.path().join("levels/Town.Nw"), b"level-b").unwrap();
        fs::write(dir.path().join("levels/readme.txt"), b"not-a-level").unwrap();
        fs::write(dir.path().join("levels/sub/cave.nw"), b"level-c").unwrap();
        dir
    }

    #[test]
    fn add_dir_scans_matching_files_non_recursive() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);

        assert!(cat.find("arena.nw").is_some());
        assert!(cat.find("readme.txt").is_none());
        assert!(cat.find("cave.nw").is_none(), "non-recursive scan must not descend");
    }

    #[test]
    fn add_dir_recursive_descends_into_subdirectories() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", true);

        assert!(cat.find("cave.nw").is_some());
    }

    #[test]
    fn find_is_case_sensitive_findi_is_not() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);

        assert!(cat.find("town.nw").is_none());
        assert!(cat.findi("town.nw").is_some());
        assert_eq!(cat.file_exists_as("town.nw"), Some("Town.Nw".to_string()));
    }

    #[test]
    fn resync_is_idempotent() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);
        let before = cat.file_count();
        cat.resync();
        let after_first = cat.file_count();
        cat.resync();
        let after_second = cat.file_count();

        assert_eq!(before, after_first);
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn add_dir_duplicate_triggers_resync_not_panic() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);
        // Re-adding the identical pattern must resync rather than deadlock, even
        // though resync is invoked from within the same re-entrant lock scope.
        cat.add_dir("levels/", "*.nw", false);
        assert!(cat.find("arena.nw").is_some());
    }

    #[test]
    fn add_file_supersedes_prior_entry_with_same_basename() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_file("levels/arena.nw");
        assert!(cat.find("arena.nw").is_some());

        cat.add_file("other/arena.nw");
        let path = cat.find("arena.nw").unwrap();
        assert!(path.ends_with("other/arena.nw") || path.to_string_lossy().contains("other"));
    }

    #[test]
    fn remove_file_drops_entry() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);
        assert!(cat.find("arena.nw").is_some());
        cat.remove_file("arena.nw");
        assert!(cat.find("arena.nw").is_none());
    }

    #[test]
    fn load_reads_catalogued_bytes() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);
        let data = cat.load("arena.nw").unwrap();
        assert_eq!(data, b"level-a");
    }

    #[test]
    fn mod_time_round_trips() {
        let dir = setup();
        let cat = FileCatalogue::new(dir.path(), false);
        cat.add_dir("levels/", "*.nw", false);
        assert!(cat.set_mod_time("arena.nw", 1_700_000_000));
        assert_eq!(cat.get_mod_time("arena.nw"), Some(1_700_000_000));
    }
}
