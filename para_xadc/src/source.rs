//! Sensor attribute sources.
//!
//! The catalog and the value reader never touch the filesystem directly; they
//! go through [`SensorSource`]. Production code uses [`SysfsSource`] rooted at
//! the IIO device directory. Tests plug in fakes and wrappers that count
//! accesses.

use para_common::consts::{DEFAULT_IIO_ROOT, MAX_LINE_LEN};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Access to a flat directory of single-value attribute files.
pub trait SensorSource: Send + Sync {
    /// Names of all entries under the sensor root, in any order.
    ///
    /// # Errors
    /// `io::ErrorKind::NotFound` when the root itself does not exist; any
    /// other error when it cannot be listed.
    fn list_entries(&self) -> io::Result<Vec<String>>;

    /// First line of the named attribute file, bounded to
    /// [`MAX_LINE_LEN`] - 1 bytes.
    fn read_line(&self, file_name: &str) -> io::Result<String>;

    /// Human-readable location of `file_name`, used in errors and logs.
    fn locate(&self, file_name: &str) -> String {
        file_name.to_string()
    }
}

/// Attribute files under a sysfs IIO device directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsSource {
    root: PathBuf,
}

impl SysfsSource {
    /// Source rooted at `root` (e.g. `/sys/bus/iio/devices/iio:device0`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// IIO device directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new(DEFAULT_IIO_ROOT)
    }
}

impl SensorSource for SysfsSource {
    fn list_entries(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            // Attribute names are ASCII; anything else cannot be a channel.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_line(&self, file_name: &str) -> io::Result<String> {
        let file = File::open(self.root.join(file_name))?;
        let mut reader = BufReader::new(file.take((MAX_LINE_LEN - 1) as u64));
        let mut buf = Vec::with_capacity(32);
        reader.read_until(b'\n', &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn locate(&self, file_name: &str) -> String {
        self.root.join(file_name).display().to_string()
    }
}
