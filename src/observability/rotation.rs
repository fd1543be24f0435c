//! Size-capped rotating log file.
//!
//! # Design Decisions
//! - Rotation happens before a write that would reach `max_bytes`
//! - Backups are `<path>.1` (newest) through `<path>.<max_files>` (oldest)
//! - An empty file never rotates, so one oversized line is still written
//! - Appends are serialized by an internal mutex
//! - In production the file is owned by the non-blocking appender's worker
//!   thread, so request tasks never wait on disk

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Rotation limits used when none are configured.
pub const DEFAULT_MAX_BYTES: u64 = 1_000_000;
pub const DEFAULT_MAX_FILES: usize = 5;

struct Active {
    file: File,
    written: u64,
}

/// Append-only file that rolls over once it reaches a size limit.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    active: Mutex<Active>,
}

impl RotatingFile {
    /// Opens (or creates) `path` for appending, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            max_files,
            active: Mutex::new(Active { file, written }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `index`-th backup.
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn append(&self, buf: &[u8]) -> io::Result<()> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| io::Error::other("rotating file lock poisoned"))?;

        if active.written > 0 && active.written + buf.len() as u64 >= self.max_bytes {
            self.rotate(&mut active)?;
        }

        active.file.write_all(buf)?;
        active.written += buf.len() as u64;
        Ok(())
    }

    fn rotate(&self, active: &mut Active) -> io::Result<()> {
        active.file.flush()?;

        if self.max_files == 0 {
            active.file = File::create(&self.path)?;
            active.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        active.file = open_append(&self.path)?;
        active.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for &RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Whole buffers only, so a line never straddles two files.
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active
            .lock()
            .map_err(|_| io::Error::other("rotating file lock poisoned"))?
            .file
            .flush()
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("max_files", &self.max_files)
            .finish()
    }
}
