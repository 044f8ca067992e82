//! Channel catalog: discovery and calibration resolution.
//!
//! Built once from a [`SensorSource`], immutable afterwards. Discovery lists
//! the `in_*_raw` attributes, calibration resolution reads the matching
//! `_offset` (optional) and `_scale` (mandatory) attributes.

use crate::channel::{ATTR_PREFIX, Channel, OFFSET_SUFFIX, RAW_SUFFIX, SCALE_SUFFIX, attr_file};
use crate::error::{XadcError, XadcResult};
use crate::parse::{parse_float_prefix, parse_int_prefix};
use crate::source::SensorSource;
use para_common::consts::MAX_CHANNELS;
use std::io;
use tracing::{debug, error, info, warn};

/// Resolved, immutable set of channels in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    channels: heapless::Vec<Channel, MAX_CHANNELS>,
}

impl Catalog {
    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// `true` when the sensor tree published no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// All channels, index = catalog handle.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel at `index`.
    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Channel names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(Channel::name)
    }

    /// Index of the first channel whose name contains `pattern`, ignoring
    /// ASCII case. A plain substring test, not a pattern match.
    pub fn find(&self, pattern: &str) -> Option<usize> {
        let needle = pattern.to_ascii_lowercase();
        self.channels
            .iter()
            .position(|ch| ch.name().to_ascii_lowercase().contains(&needle))
    }

    /// Discover channels and resolve their calibration.
    ///
    /// At most `limit` channels (capped at [`MAX_CHANNELS`]) are kept; extra
    /// matches are dropped with a warning. A missing or empty sensor tree
    /// yields an empty catalog.
    ///
    /// # Errors
    /// - `FileError` if the tree cannot be listed, an entry name is too short
    ///   to hold a channel name, or any channel lacks a readable scale.
    /// - `OutOfMemory` if a channel name cannot be allocated.
    ///
    /// Any error discards every channel resolved so far.
    pub fn build<S: SensorSource + ?Sized>(source: &S, limit: usize) -> XadcResult<Self> {
        let names = discover(source, limit.min(MAX_CHANNELS))?;

        let channels = names
            .into_iter()
            .map(|name| resolve(source, name))
            .collect::<XadcResult<heapless::Vec<Channel, MAX_CHANNELS>>>()?;
        for (index, channel) in channels.iter().enumerate() {
            debug!(
                "Channel {}: {} (offset={}, scale={:.4})",
                index,
                channel.name(),
                channel.offset(),
                channel.scale()
            );
        }

        info!("XADC catalog ready with {} channels", channels.len());
        Ok(Self { channels })
    }
}

/// List raw-sample attributes and derive channel names, sorted by entry name.
fn discover<S: SensorSource + ?Sized>(
    source: &S,
    limit: usize,
) -> XadcResult<heapless::Vec<String, MAX_CHANNELS>> {
    let mut entries = match source.list_entries() {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("No XADC objects found: {} does not exist", source.locate(""));
            return Ok(heapless::Vec::new());
        }
        Err(e) => {
            error!("Failed to list {}: {}", source.locate(""), e);
            return Err(XadcError::file(source.locate(""), e));
        }
    };
    entries.retain(|e| e.starts_with(ATTR_PREFIX) && e.ends_with(RAW_SUFFIX));
    entries.sort_unstable();

    let mut names = heapless::Vec::new();
    if entries.is_empty() {
        warn!("No XADC objects found under {}", source.locate(""));
        return Ok(names);
    }

    for entry in &entries {
        if names.len() == limit {
            warn!(
                "Max. number of channels exceeded: keeping {} of {} raw attributes",
                limit,
                entries.len()
            );
            break;
        }

        let name = channel_name(entry).inspect_err(|e| {
            error!("Internal error while scanning {}: {}", source.locate(entry), e);
        })?;
        if names.push(name).is_err() {
            warn!("Max. number of channels exceeded at {}", entry);
            break;
        }
    }

    Ok(names)
}

/// Strip `in_` and `_raw` from a raw attribute entry name.
///
/// # Errors
/// `FileError` when the entry is shorter than prefix + suffix (the two
/// overlap, e.g. `in_raw`), `OutOfMemory` when the name cannot be stored.
fn channel_name(entry: &str) -> XadcResult<String> {
    let min_len = ATTR_PREFIX.len() + RAW_SUFFIX.len();
    if entry.len() < min_len {
        return Err(XadcError::file(
            entry,
            format!("entry name shorter than {min_len} bytes"),
        ));
    }

    let stem = &entry[ATTR_PREFIX.len()..entry.len() - RAW_SUFFIX.len()];
    let mut name = String::new();
    name.try_reserve_exact(stem.len())
        .map_err(|e| XadcError::OutOfMemory(format!("channel name '{stem}': {e}")))?;
    name.push_str(stem);
    Ok(name)
}

/// Read the calibration attributes for one channel.
fn resolve<S: SensorSource + ?Sized>(source: &S, name: String) -> XadcResult<Channel> {
    let offset_file = attr_file(&name, OFFSET_SUFFIX);
    let offset = match source.read_line(&offset_file) {
        Ok(line) => parse_int_prefix(&line),
        Err(_) => 0,
    };

    let scale_file = attr_file(&name, SCALE_SUFFIX);
    let scale = match source.read_line(&scale_file) {
        Ok(line) => parse_float_prefix(&line),
        Err(e) => {
            error!("Can't open scale file for {}: {}", name, e);
            return Err(XadcError::file(source.locate(&scale_file), e));
        }
    };

    Ok(Channel::new(name, offset, scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// In-memory attribute directory.
    #[derive(Default)]
    struct MapSource {
        files: BTreeMap<String, String>,
        missing_root: bool,
    }

    impl MapSource {
        fn with(mut self, name: &str, content: &str) -> Self {
            self.files.insert(name.to_string(), content.to_string());
            self
        }
    }

    impl SensorSource for MapSource {
        fn list_entries(&self) -> io::Result<Vec<String>> {
            if self.missing_root {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            // Reverse order: the catalog must not depend on listing order.
            Ok(self.files.keys().rev().cloned().collect())
        }

        fn read_line(&self, file_name: &str) -> io::Result<String> {
            self.files
                .get(file_name)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn parallella() -> MapSource {
        MapSource::default()
            .with("in_temp0_raw", "2603\n")
            .with("in_temp0_offset", "-2219\n")
            .with("in_temp0_scale", "123.040771484\n")
            .with("in_voltage0_vccint_raw", "1365\n")
            .with("in_voltage0_vccint_scale", "0.732421875\n")
            .with("in_voltage3_vccpint_raw", "1370\n")
            .with("in_voltage3_vccpint_scale", "0.732421875\n")
            .with("in_temp0_sampling_frequency", "961538\n")
            .with("name", "xadc\n")
    }

    #[test]
    fn test_build_sorted_with_calibration() {
        let catalog = Catalog::build(&parallella(), MAX_CHANNELS).unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["temp0", "voltage0_vccint", "voltage3_vccpint"]);

        let temp = catalog.get(0).unwrap();
        assert_eq!(temp.offset(), -2219);
        assert!((temp.scale() - 123.040771484).abs() < 1e-9);
        assert_eq!(catalog.get(1).unwrap().offset(), 0);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let source = MapSource {
            missing_root: true,
            ..MapSource::default()
        };
        let catalog = Catalog::build(&source, MAX_CHANNELS).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_no_raw_entries_is_empty() {
        let source = MapSource::default().with("name", "xadc\n");
        assert!(Catalog::build(&source, MAX_CHANNELS).unwrap().is_empty());
    }

    #[test]
    fn test_short_entry_aborts_build() {
        let source = parallella().with("in_raw", "1\n");
        let err = Catalog::build(&source, MAX_CHANNELS).unwrap_err();
        assert!(matches!(err, XadcError::FileError { ref path, .. } if path == "in_raw"));
    }

    #[test]
    fn test_empty_stem_is_accepted() {
        let source = MapSource::default()
            .with("in__raw", "5\n")
            .with("in__scale", "1000\n");
        let catalog = Catalog::build(&source, MAX_CHANNELS).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), [""]);
    }

    #[test]
    fn test_missing_scale_discards_everything() {
        let source = parallella().with("in_voltage9_raw", "1\n");
        let err = Catalog::build(&source, MAX_CHANNELS).unwrap_err();
        assert!(matches!(err, XadcError::FileError { ref path, .. } if path == "in_voltage9_scale"));
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let catalog = Catalog::build(&parallella(), 2).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["temp0", "voltage0_vccint"]);
    }

    #[test]
    fn test_truncation_skips_entries_past_limit() {
        // in_zz_raw has no scale; it sorts last and is dropped before calibration.
        let source = parallella().with("in_zz_raw", "1\n");
        let catalog = Catalog::build(&source, 3).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_full_capacity_resolves_every_channel() {
        let mut source = MapSource::default();
        for i in 0..MAX_CHANNELS + 3 {
            source = source
                .with(&format!("in_voltage{i:03}_raw"), "1\n")
                .with(&format!("in_voltage{i:03}_scale"), "1\n");
        }
        let catalog = Catalog::build(&source, usize::MAX).unwrap();
        assert_eq!(catalog.len(), MAX_CHANNELS);
        assert_eq!(catalog.get(MAX_CHANNELS - 1).unwrap().name(), "voltage063");
    }

    #[test]
    fn test_garbage_calibration_parses_as_zero() {
        let source = MapSource::default()
            .with("in_temp0_raw", "1\n")
            .with("in_temp0_offset", "n/a\n")
            .with("in_temp0_scale", "unknown\n");
        let ch = Catalog::build(&source, MAX_CHANNELS).unwrap().get(0).cloned().unwrap();
        assert_eq!(ch.offset(), 0);
        assert_eq!(ch.scale(), 0.0);
    }

    #[test]
    fn test_find_is_case_insensitive_first_match() {
        let catalog = Catalog::build(&parallella(), MAX_CHANNELS).unwrap();
        assert_eq!(catalog.find("VCC"), Some(1));
        assert_eq!(catalog.find("vccpint"), Some(2));
        assert_eq!(catalog.find("Temp"), Some(0));
        assert_eq!(catalog.find("zzz"), None);
    }
}
