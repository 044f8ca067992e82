//! Process-wide XADC instance.
//!
//! Thin free functions over one shared [`Xadc`] for callers that do not want
//! to thread an instance through their code. The instance is created on first
//! use from the default IIO root, or explicitly with [`configure`] before any
//! other call.

use crate::error::{XadcError, XadcResult};
use crate::xadc::Xadc;
use para_common::config::XadcConfig;
use para_common::consts::DEFAULT_IIO_ROOT;
use std::sync::OnceLock;

static GLOBAL_XADC: OnceLock<Xadc> = OnceLock::new();

/// Install the process-wide instance from config.
///
/// # Errors
/// `BadArgument` if the instance already exists (configured earlier or
/// created implicitly by a previous call).
pub fn configure(config: &XadcConfig) -> XadcResult<&'static Xadc> {
    let mut installed = false;
    let xadc = GLOBAL_XADC.get_or_init(|| {
        installed = true;
        Xadc::from_config(config)
    });
    if !installed {
        return Err(XadcError::BadArgument(
            "process-wide XADC already initialised".to_string(),
        ));
    }
    Ok(xadc)
}

/// The process-wide instance, created with defaults if not configured.
pub fn global() -> &'static Xadc {
    GLOBAL_XADC.get_or_init(|| Xadc::new(DEFAULT_IIO_ROOT))
}

/// Number of channels and their names, see [`Xadc::info`].
pub fn info() -> XadcResult<(usize, Vec<&'static str>)> {
    global().info()
}

/// First channel containing `pattern`, see [`Xadc::find_channel`].
pub fn find_channel(pattern: &str) -> XadcResult<usize> {
    global().find_channel(pattern)
}

/// Corrected value of channel `index`, see [`Xadc::read_channel`].
pub fn read_channel(index: usize) -> XadcResult<f64> {
    global().read_channel(index)
}
