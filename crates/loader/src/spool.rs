//! Append-only spool files and rotation.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

/// A named spool file on disk.
///
/// The file name doubles as the object key after upload; it is unique per
/// rotation: `<table>_<epoch-millis>_<pid>.log`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpoolFile {
    /// File name, later the object key.
    pub key: String,
    /// Full path under the spool directory.
    pub path: PathBuf,
}

impl SpoolFile {
    pub fn new(key: impl Into<String>, dir: &Path) -> Self {
        let key = key.into();
        let path = dir.join(&key);
        Self { key, path }
    }
}

impl fmt::Display for SpoolFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Generates spool file names for one table.
///
/// Names embed a millisecond timestamp. When two rotations land in the
/// same millisecond the namer bumps the reading, so names never repeat
/// within a process.
#[derive(Debug)]
pub struct FileNamer {
    table: String,
    last_millis: i64,
}

impl FileNamer {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            last_millis: 0,
        }
    }

    pub fn next(&mut self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        if millis <= self.last_millis {
            millis = self.last_millis + 1;
        }
        self.last_millis = millis;
        format!("{}_{}_{}.log", self.table, millis, std::process::id())
    }
}

/// Buffered append-only writer over the active spool file.
pub struct Spool {
    file: SpoolFile,
    writer: BufWriter<File>,
}

impl Spool {
    /// Opens `file` for appending, creating it if needed.
    pub fn open(file: SpoolFile) -> io::Result<Self> {
        let handle = File::options().create(true).append(true).open(&file.path)?;
        Ok(Self {
            file,
            writer: BufWriter::new(handle),
        })
    }

    pub fn file(&self) -> &SpoolFile {
        &self.file
    }

    /// Appends one encoded line plus the record terminator.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    /// Flushes buffered bytes through to the operating system.
    pub fn sync(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Seals the active file and swaps in `next`, returning the sealed
    /// one. Buffered bytes are flushed before the swap; on error the
    /// current file stays active.
    pub fn rotate(&mut self, next: SpoolFile) -> io::Result<SpoolFile> {
        self.writer.flush()?;
        let handle = File::options().create(true).append(true).open(&next.path)?;
        // Dropping the previous writer closes the sealed file's handle.
        let previous = std::mem::replace(&mut self.writer, BufWriter::new(handle));
        drop(previous);
        Ok(std::mem::replace(&mut self.file, next))
    }

    /// Flushes and closes the spool without rotating.
    pub fn close(mut self) -> io::Result<()> {
        self.sync()
    }
}

#[cfg(test)]
#[path = "spool_test.rs"]
mod spool_test;
