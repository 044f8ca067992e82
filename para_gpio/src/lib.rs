//! # Parallella GPIO Library
//!
//! Minimal sysfs GPIO access for the Parallella expansion header: export,
//! direction, level reads and interrupt-driven edge waits on the `value`
//! attribute.
//!
//! # Example
//!
//! ```rust,no_run
//! use para_gpio::{Direction, Edge, EdgeWait, Gpio};
//! use std::time::Duration;
//!
//! let gpio = Gpio::open(7)?;
//! gpio.set_direction(Direction::In)?;
//! match gpio.wait_for_edge(Edge::Rising, Some(Duration::from_secs(10)))? {
//!     EdgeWait::Edge { level } => println!("edge, level {level}"),
//!     EdgeWait::Timeout => println!("timed out"),
//! }
//! gpio.close(false)?;
//! # Ok::<(), para_gpio::GpioError>(())
//! ```

#![deny(missing_docs)]

pub mod error;
pub mod pin;

pub use error::{GpioError, GpioResult};
pub use pin::{Direction, Edge, EdgeWait, Gpio, pin_number};
