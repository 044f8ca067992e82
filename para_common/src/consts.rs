//! System-wide constants for the Parallella telemetry workspace.
//!
//! Single source of truth for capacity limits and default sysfs paths.

use static_assertions::const_assert;

/// Maximum number of XADC channels held in a catalog.
pub const MAX_CHANNELS: usize = 64;

/// Maximum length of a single line read from a sysfs attribute file.
pub const MAX_LINE_LEN: usize = 256;

/// Default IIO device directory publishing the XADC attributes.
pub const DEFAULT_IIO_ROOT: &str = "/sys/bus/iio/devices/iio:device0";

/// Default sysfs GPIO class directory.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/para/para.toml";

/// Default service name used in logs.
pub const DEFAULT_SERVICE_NAME: &str = "para";

/// Delay between checks for a freshly exported GPIO directory.
pub const DEFAULT_EXPORT_SETTLE_MS: u64 = 100;

/// Number of checks for a freshly exported GPIO directory.
pub const DEFAULT_EXPORT_RETRIES: u32 = 10;

const_assert!(MAX_CHANNELS > 0);
const_assert!(MAX_LINE_LEN >= 16);
