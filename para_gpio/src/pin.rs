//! Sysfs GPIO pin handle.
//!
//! Uses the legacy `/sys/class/gpio` interface:
//!
//! ```text
//! /sys/class/gpio/export          <- write pin number to export
//! /sys/class/gpio/unexport        <- write pin number to release
//! /sys/class/gpio/gpioN/direction <- "in" | "out"
//! /sys/class/gpio/gpioN/edge      <- "none" | "rising" | "falling" | "both"
//! /sys/class/gpio/gpioN/value     <- "0" | "1", pollable for POLLPRI
//! ```

use crate::error::{GpioError, GpioResult};
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use para_common::config::GpioConfig;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input
    In,
    /// Output
    Out,
}

impl Direction {
    /// Sysfs spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Signal edge that wakes a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
    /// Either transition
    Both,
}

impl Edge {
    /// Sysfs spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Both => "both",
        }
    }
}

/// Outcome of [`Gpio::wait_for_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWait {
    /// The requested edge occurred; `level` is the value read after waking.
    Edge {
        /// Pin level after the edge
        level: u8,
    },
    /// No edge within the timeout.
    Timeout,
}

/// An exported sysfs GPIO.
#[derive(Debug)]
pub struct Gpio {
    pin: u32,
    root: PathBuf,
    dir: PathBuf,
    exported_here: bool,
}

impl Gpio {
    /// Open `pin` under the default `/sys/class/gpio` tree.
    pub fn open(pin: u32) -> GpioResult<Self> {
        Self::open_with(&GpioConfig::default(), pin)
    }

    /// Open `pin`, exporting it first if `gpioN/` does not exist yet.
    ///
    /// After an export the kernel (and udev, for permissions) needs a moment
    /// to create the directory; it is checked `export_retries` times,
    /// `export_settle_ms` apart.
    pub fn open_with(config: &GpioConfig, pin: u32) -> GpioResult<Self> {
        let root = config.sysfs_root.clone();
        let dir = root.join(format!("gpio{pin}"));

        if dir.is_dir() {
            debug!("GPIO {} already exported", pin);
            return Ok(Self {
                pin,
                root,
                dir,
                exported_here: false,
            });
        }

        write_attr(&root.join("export"), &pin.to_string()).map_err(|e| GpioError::Export {
            pin,
            reason: e.to_string(),
        })?;

        let settle = Duration::from_millis(config.export_settle_ms);
        for _ in 0..config.export_retries {
            if dir.is_dir() {
                info!("Exported GPIO {}", pin);
                return Ok(Self {
                    pin,
                    root,
                    dir,
                    exported_here: true,
                });
            }
            std::thread::sleep(settle);
        }

        // Best effort: do not leave a half-exported pin behind.
        if let Err(e) = write_attr(&root.join("unexport"), &pin.to_string()) {
            warn!("Failed to unexport GPIO {} after export timeout: {}", pin, e);
        }
        Err(GpioError::Export {
            pin,
            reason: format!("{} did not appear", dir.display()),
        })
    }

    /// Pin number.
    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// `true` if this handle exported the pin (and will unexport it on close).
    pub fn exported_here(&self) -> bool {
        self.exported_here
    }

    /// Set the pin direction.
    pub fn set_direction(&self, direction: Direction) -> GpioResult<()> {
        self.write("direction", direction.as_str())?;
        debug!("GPIO {} direction set to {}", self.pin, direction.as_str());
        Ok(())
    }

    /// Current pin level, 0 or 1.
    pub fn read_level(&self) -> GpioResult<u8> {
        let path = self.dir.join("value");
        let text = fs::read_to_string(&path).map_err(|e| self.io_error(&path, e))?;
        Ok(parse_level(&text))
    }

    /// Block until `edge` occurs or `timeout` expires (`None` waits forever).
    ///
    /// Arms the edge trigger, discards the pending value so a stale event
    /// does not wake us, then polls the value attribute for `POLLPRI`.
    pub fn wait_for_edge(&self, edge: Edge, timeout: Option<Duration>) -> GpioResult<EdgeWait> {
        self.write("edge", edge.as_str())?;

        let path = self.dir.join("value");
        let mut value = File::open(&path).map_err(|e| self.io_error(&path, e))?;
        let mut scratch = String::new();
        value
            .read_to_string(&mut scratch)
            .map_err(|e| self.io_error(&path, e))?;

        let timeout = match timeout {
            None => PollTimeout::NONE,
            Some(t) => {
                let ms = i32::try_from(t.as_millis()).unwrap_or(i32::MAX);
                PollTimeout::try_from(ms).map_err(|_| {
                    GpioError::BadArgument(format!("poll timeout {ms} ms out of range"))
                })?
            }
        };

        let ready = loop {
            let mut fds = [PollFd::new(
                value.as_fd(),
                PollFlags::POLLPRI | PollFlags::POLLERR,
            )];
            match poll(&mut fds, timeout) {
                Ok(n) => break n,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(GpioError::Poll(e.to_string())),
            }
        };
        if ready == 0 {
            debug!("GPIO {} {} edge wait timed out", self.pin, edge.as_str());
            return Ok(EdgeWait::Timeout);
        }

        scratch.clear();
        value
            .seek(SeekFrom::Start(0))
            .and_then(|_| value.read_to_string(&mut scratch))
            .map_err(|e| self.io_error(&path, e))?;
        let level = parse_level(&scratch);
        debug!("GPIO {} {} edge, level {}", self.pin, edge.as_str(), level);
        Ok(EdgeWait::Edge { level })
    }

    /// Release the handle. The pin is unexported if `unexport` is set or if
    /// this handle exported it.
    pub fn close(self, unexport: bool) -> GpioResult<()> {
        if !(unexport || self.exported_here) {
            return Ok(());
        }
        let path = self.root.join("unexport");
        write_attr(&path, &self.pin.to_string()).map_err(|e| GpioError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!("Unexported GPIO {}", self.pin);
        Ok(())
    }

    fn write(&self, attr: &str, value: &str) -> GpioResult<()> {
        let path = self.dir.join(attr);
        write_attr(&path, value).map_err(|e| self.io_error(&path, e))
    }

    fn io_error(&self, path: &Path, e: io::Error) -> GpioError {
        if !self.dir.is_dir() {
            return GpioError::NotExported { pin: self.pin };
        }
        GpioError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Convert a caller-supplied signed pin number.
///
/// # Errors
/// `BadArgument` for negative or oversized values.
pub fn pin_number(pin: i64) -> GpioResult<u32> {
    u32::try_from(pin).map_err(|_| GpioError::BadArgument(format!("invalid GPIO number {pin}")))
}

/// Write a sysfs attribute without creating it.
fn write_attr(path: &Path, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(value.as_bytes())
}

/// Any leading digit other than '0' reads as high.
fn parse_level(text: &str) -> u8 {
    match text.trim_start().bytes().next() {
        Some(b) if b.is_ascii_digit() && b != b'0' => 1,
        _ => 0,
    }
}
