//! XADC channel descriptors and attribute file naming.
//!
//! On the Parallella the IIO driver publishes 9 or 10 channels, depending on
//! the devicetree:
//!
//! | Name                | Measures                          |
//! |---------------------|-----------------------------------|
//! | `temp0`             | Zynq die temperature (°C)         |
//! | `voltage0_vccint`   | PL internal core voltage          |
//! | `voltage1_vccaux`   | PL VccAux voltage                 |
//! | `voltage2_vccbram`  | PL internal BRAM voltage          |
//! | `voltage3_vccpint`  | PS internal core voltage          |
//! | `voltage4_vccpaux`  | PS VccAux voltage                 |
//! | `voltage5_vcco_ddr` | DDR I/O voltage                   |
//! | `voltage6_vrefp`    | XADC positive reference voltage   |
//! | `voltage7_vrefn`    | XADC negative reference voltage   |
//! | `voltage8`          | Dedicated VP/VN input (newer DTs) |
//!
//! Only temperature channels carry an offset attribute.

use std::fmt;

/// Prefix of every channel attribute file.
pub const ATTR_PREFIX: &str = "in_";

/// Suffix of the raw sample attribute.
pub const RAW_SUFFIX: &str = "_raw";

/// Suffix of the additive calibration attribute.
pub const OFFSET_SUFFIX: &str = "_offset";

/// Suffix of the multiplicative calibration attribute.
pub const SCALE_SUFFIX: &str = "_scale";

/// Scale attributes are published in milli-units per LSB.
pub const MILLI_PER_UNIT: f64 = 1000.0;

/// Attribute file name for `channel` with the given suffix.
pub fn attr_file(channel: &str, suffix: &str) -> String {
    format!("{ATTR_PREFIX}{channel}{suffix}")
}

/// One analog source with its resolved calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    offset: i64,
    scale: f64,
}

impl Channel {
    /// Channel with explicit calibration.
    pub fn new(name: impl Into<String>, offset: i64, scale: f64) -> Self {
        Self {
            name: name.into(),
            offset,
            scale,
        }
    }

    /// Channel name, e.g. `temp0` or `voltage3_vccpint`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Additive calibration term (0 when the driver publishes none).
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Multiplicative calibration term, milli-units per LSB.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Measurement class derived from the name.
    pub fn kind(&self) -> ChannelKind {
        ChannelKind::from_name(&self.name)
    }

    /// Convert a raw sample into engineering units.
    pub fn correct(&self, raw: i64) -> f64 {
        raw.saturating_add(self.offset) as f64 * self.scale / MILLI_PER_UNIT
    }
}

/// Measurement class of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Die temperature in degrees Celsius.
    Temperature,
    /// Supply rail or reference voltage in volts.
    Voltage,
    /// Anything else the driver may publish.
    Other,
}

impl ChannelKind {
    /// Classify a channel by its name prefix.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("temp") {
            Self::Temperature
        } else if name.starts_with("voltage") {
            Self::Voltage
        } else {
            Self::Other
        }
    }

    /// Engineering unit of corrected values.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Voltage => "V",
            Self::Other => "",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Voltage => write!(f, "voltage"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A corrected value together with the channel it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<'a> {
    /// Catalog index
    pub index: usize,
    /// Channel name
    pub name: &'a str,
    /// Corrected value in engineering units
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_formula() {
        let ch = Channel::new("temp0", 50, 0.25);
        assert!((ch.correct(1000) - 0.2625).abs() < 1e-12);
    }

    #[test]
    fn test_zynq_temperature() {
        // Typical Zynq values: offset -2219, scale 123.040771484.
        let ch = Channel::new("temp0", -2219, 123.040771484);
        let celsius = ch.correct(2603);
        assert!((celsius - 47.2476562).abs() < 1e-3);
    }

    #[test]
    fn test_voltage_without_offset() {
        let ch = Channel::new("voltage0_vccint", 0, 0.732421875);
        assert!((ch.correct(1365) - 0.999755859).abs() < 1e-6);
    }

    #[test]
    fn test_kind_and_unit() {
        assert_eq!(ChannelKind::from_name("temp0"), ChannelKind::Temperature);
        assert_eq!(ChannelKind::from_name("voltage8"), ChannelKind::Voltage);
        assert_eq!(ChannelKind::from_name("current0"), ChannelKind::Other);
        assert_eq!(ChannelKind::Temperature.unit(), "°C");
        assert_eq!(ChannelKind::Voltage.unit(), "V");
    }

    #[test]
    fn test_attr_file() {
        assert_eq!(attr_file("temp0", RAW_SUFFIX), "in_temp0_raw");
        assert_eq!(attr_file("voltage3_vccpint", SCALE_SUFFIX), "in_voltage3_vccpint_scale");
    }
}
