//! Parallella Common Library
//!
//! Shared constants, configuration loading and logging setup for the
//! telemetry workspace crates (`para_xadc`, `para_gpio`) and their
//! test drivers.
//!
//! # Module Structure
//!
//! - [`consts`] - Capacity limits and default sysfs paths
//! - [`config`] - Configuration loading trait and types
//! - [`logging`] - `tracing-subscriber` setup shared by the binaries
//!
//! # Usage
//!
//! ```rust,no_run
//! use para_common::config::{ConfigLoader, ParaConfig};
//! use std::path::Path;
//!
//! let config = ParaConfig::load(Path::new("/etc/para/para.toml")).unwrap();
//! println!("IIO root: {}", config.xadc.sensor_root.display());
//! ```

pub mod config;
pub mod consts;
pub mod logging;
