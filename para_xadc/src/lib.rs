//! # Parallella XADC Library
//!
//! On-chip analog telemetry for the Zynq (die temperature, supply rails),
//! read from the attribute files the Linux IIO driver publishes under
//! `/sys/bus/iio/devices/iio:device0/`.
//!
//! The first call of any query scans the device directory for `in_*_raw`
//! attributes and resolves every channel's `_offset` and `_scale` once.
//! Later calls only read the raw attribute of the requested channel and
//! apply the stored correction.
//!
//! # Module Structure
//!
//! - [`xadc`] - `Xadc` subsystem: lazy catalog, queries, value reader
//! - [`catalog`] - Channel discovery and calibration resolution
//! - [`channel`] - Channel descriptor and attribute file naming
//! - [`source`] - `SensorSource` trait and the sysfs implementation
//! - [`global`] - Process-wide instance and free functions
//! - [`parse`] - Lenient numeric parsing of attribute text
//! - [`error`] - Error type and result codes
//!
//! # Example
//!
//! ```rust,no_run
//! use para_xadc::Xadc;
//!
//! let xadc = Xadc::new("/sys/bus/iio/devices/iio:device0");
//! let temp = xadc.find_channel("temp")?;
//! println!("Zynq temperature: {:.1} °C", xadc.read_channel(temp)?);
//! # Ok::<(), para_xadc::XadcError>(())
//! ```

#![deny(missing_docs)]

pub mod catalog;
pub mod channel;
pub mod error;
pub mod global;
pub mod parse;
pub mod source;
pub mod xadc;

// Re-export key types for convenience
pub use crate::catalog::Catalog;
pub use crate::channel::{Channel, ChannelKind, Reading};
pub use crate::error::{ErrorKind, XadcError, XadcResult};
pub use crate::global::{configure, find_channel, global, info, read_channel};
pub use crate::source::{SensorSource, SysfsSource};
pub use crate::xadc::{CatalogState, Xadc, channel_index};
