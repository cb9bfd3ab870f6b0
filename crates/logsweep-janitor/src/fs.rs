//! Filesystem access used by the cleanup engine
//!
//! Everything the engine touches on disk goes through [`Filesystem`] so the
//! deletion policy can be exercised against an in-memory tree.

use crate::JanitorError;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Extension of the files the engine manages
pub const LOG_EXTENSION: &str = "log";

/// A log file found during enumeration
///
/// Built fresh on every pass and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// Last modification time
    pub last_write: SystemTime,
    /// Last access time
    pub last_access: SystemTime,
    /// Size in bytes
    pub len: u64,
}

/// Filesystem operations consumed by the engine
pub trait Filesystem: Send + Sync {
    /// Whether `path` is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Recursively find regular files under `root` with the given extension
    ///
    /// The extension match is case-insensitive.
    fn find_logs(&self, root: &Path, extension: &str) -> Result<Vec<LogFileEntry>, JanitorError>;

    /// Whether a file still exists
    fn exists(&self, path: &Path) -> bool;

    /// Delete a single file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Absolute, symlink-free form of `path`
    fn resolve(&self, path: &Path) -> io::Result<PathBuf>;

    /// Bytes available to unprivileged users on the volume holding `path`
    fn available_space(&self, path: &Path) -> io::Result<u64>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    fn entry_for(entry: &walkdir::DirEntry) -> Result<Option<LogFileEntry>, JanitorError> {
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let last_write = metadata
            .modified()
            .map_err(|e| JanitorError::io(entry.path(), e))?;
        // no access time on this platform
        let last_access = metadata.accessed().unwrap_or(last_write);

        Ok(Some(LogFileEntry {
            path: entry.path().to_path_buf(),
            last_write,
            last_access,
            len: metadata.len(),
        }))
    }
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error()
        .map(|io| io.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

impl Filesystem for LocalFilesystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn find_logs(&self, root: &Path, extension: &str) -> Result<Vec<LogFileEntry>, JanitorError> {
        let mut found = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                // removed while we were walking
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(e.into()),
            };

            if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
                continue;
            }

            if let Some(log) = Self::entry_for(&entry)? {
                found.push(log);
            }
        }

        Ok(found)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn available_space(&self, path: &Path) -> io::Result<u64> {
        fs2::available_space(path)
    }
}
