//! In-memory filesystem shared by the unit tests

use crate::fs::{Filesystem, LogFileEntry};
use crate::JanitorError;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub(crate) const MB: u64 = 1024 * 1024;

pub(crate) fn days_ago(days: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(days * 86400)
}

#[derive(Default)]
struct MockState {
    dirs: HashSet<PathBuf>,
    files: BTreeMap<PathBuf, LogFileEntry>,
    free_bytes: u64,
    fail_delete: HashSet<PathBuf>,
    vanish_after_enumeration: HashSet<PathBuf>,
    space_query_fails: bool,
    enumeration_fails: bool,
    removed: Vec<PathBuf>,
    space_queries: usize,
}

pub(crate) struct MockFilesystem {
    root: PathBuf,
    state: Mutex<MockState>,
}

impl MockFilesystem {
    /// A filesystem with an existing, empty `root` and plenty of free space
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state = MockState {
            dirs: HashSet::from([root.clone()]),
            free_bytes: 100_000 * MB,
            ..Default::default()
        };
        Self {
            root,
            state: Mutex::new(state),
        }
    }

    /// A filesystem where nothing exists
    pub(crate) fn empty() -> Self {
        Self {
            root: PathBuf::new(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Add a file under the root, returning its path
    pub(crate) fn add_file(
        &self,
        name: &str,
        last_write: SystemTime,
        last_access: SystemTime,
        len: u64,
    ) -> PathBuf {
        let path = self.root.join(name);
        self.state().files.insert(
            path.clone(),
            LogFileEntry {
                path: path.clone(),
                last_write,
                last_access,
                len,
            },
        );
        path
    }

    pub(crate) fn set_free_mb(&self, mb: u64) {
        self.state().free_bytes = mb * MB;
    }

    pub(crate) fn fail_delete(&self, path: &Path) {
        self.state().fail_delete.insert(path.to_path_buf());
    }

    pub(crate) fn vanish_after_enumeration(&self, path: &Path) {
        self.state().vanish_after_enumeration.insert(path.to_path_buf());
    }

    pub(crate) fn fail_space_query(&self) {
        self.state().space_query_fails = true;
    }

    pub(crate) fn fail_enumeration(&self) {
        self.state().enumeration_fails = true;
    }

    pub(crate) fn removed(&self) -> Vec<PathBuf> {
        self.state().removed.clone()
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.state().files.contains_key(path)
    }

    pub(crate) fn space_queries(&self) -> usize {
        self.state().space_queries
    }
}

impl Filesystem for MockFilesystem {
    fn is_dir(&self, path: &Path) -> bool {
        self.state().dirs.contains(path)
    }

    fn find_logs(&self, root: &Path, extension: &str) -> Result<Vec<LogFileEntry>, JanitorError> {
        let mut state = self.state();
        if state.enumeration_fails {
            return Err(JanitorError::io(
                root,
                io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            ));
        }

        let found: Vec<LogFileEntry> = state
            .files
            .values()
            .filter(|entry| entry.path.starts_with(root))
            .filter(|entry| {
                entry
                    .path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let vanishing: Vec<PathBuf> = state.vanish_after_enumeration.drain().collect();
        for path in vanishing {
            state.files.remove(&path);
        }

        Ok(found)
    }

    fn exists(&self, path: &Path) -> bool {
        self.state().files.contains_key(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_delete.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file is locked by another process",
            ));
        }
        let entry = state
            .files
            .remove(path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        state.free_bytes += entry.len;
        state.removed.push(path.to_path_buf());
        Ok(())
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn available_space(&self, _path: &Path) -> io::Result<u64> {
        let mut state = self.state();
        state.space_queries += 1;
        if state.space_query_fails {
            return Err(io::Error::new(io::ErrorKind::Other, "volume not mounted"));
        }
        Ok(state.free_bytes)
    }
}
