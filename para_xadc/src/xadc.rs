//! XADC subsystem: lazily built catalog plus the value reader.

use crate::catalog::Catalog;
use crate::channel::{Channel, RAW_SUFFIX, Reading, attr_file};
use crate::error::{XadcError, XadcResult};
use crate::parse::parse_int_prefix;
use crate::source::{SensorSource, SysfsSource};
use para_common::config::XadcConfig;
use para_common::consts::MAX_CHANNELS;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::error;

/// Lifecycle of the catalog owned by an [`Xadc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    /// No operation has run yet.
    Uninitialized,
    /// Catalog built; immutable from now on.
    Ready,
    /// Build failed; every query reports the cached failure.
    Failed,
}

/// Access to the on-chip analog channels.
///
/// The first query of any kind builds the [`Catalog`]. The outcome, success or
/// failure, is kept for the lifetime of the value and never rebuilt. The build
/// is guarded by a [`OnceLock`], so concurrent first callers share a single
/// build attempt.
#[derive(Debug)]
pub struct Xadc<S: SensorSource = SysfsSource> {
    source: S,
    max_channels: usize,
    catalog: OnceLock<XadcResult<Catalog>>,
}

impl Xadc<SysfsSource> {
    /// XADC backed by the IIO device directory `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_source(SysfsSource::new(root))
    }

    /// XADC configured from the `[xadc]` config section.
    pub fn from_config(config: &XadcConfig) -> Self {
        Self::with_source(SysfsSource::new(config.sensor_root.clone()))
            .with_max_channels(config.max_channels)
    }
}

impl<S: SensorSource> Xadc<S> {
    /// XADC over an arbitrary attribute source.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            max_channels: MAX_CHANNELS,
            catalog: OnceLock::new(),
        }
    }

    /// Lower the channel limit; values above [`MAX_CHANNELS`] are capped.
    pub fn with_max_channels(mut self, max_channels: usize) -> Self {
        self.max_channels = max_channels.min(MAX_CHANNELS);
        self
    }

    /// Underlying attribute source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current catalog state. Does not trigger a build.
    pub fn state(&self) -> CatalogState {
        match self.catalog.get() {
            None => CatalogState::Uninitialized,
            Some(Ok(_)) => CatalogState::Ready,
            Some(Err(_)) => CatalogState::Failed,
        }
    }

    /// The catalog, building it on first use.
    ///
    /// # Errors
    /// The build failure, on this and every later call.
    pub fn catalog(&self) -> XadcResult<&Catalog> {
        self.catalog
            .get_or_init(|| Catalog::build(&self.source, self.max_channels))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of channels and their names in catalog order.
    pub fn info(&self) -> XadcResult<(usize, Vec<&str>)> {
        let catalog = self.catalog()?;
        Ok((catalog.len(), catalog.names().collect()))
    }

    /// Number of channels.
    pub fn channel_count(&self) -> XadcResult<usize> {
        Ok(self.catalog()?.len())
    }

    /// All channels in catalog order.
    pub fn channels(&self) -> XadcResult<&[Channel]> {
        Ok(self.catalog()?.channels())
    }

    /// Channel at `index`.
    pub fn channel(&self, index: usize) -> XadcResult<&Channel> {
        let catalog = self.catalog()?;
        catalog.get(index).ok_or(XadcError::OutOfRange {
            index,
            count: catalog.len(),
        })
    }

    /// Index of the first channel whose name contains `pattern`, ignoring
    /// case. `"temp"` finds `temp0`, `"BRAM"` finds `voltage2_vccbram`.
    /// The empty pattern matches the first channel.
    ///
    /// # Errors
    /// `NotFound` when no name matches (including any pattern against an
    /// empty catalog).
    pub fn find_channel(&self, pattern: &str) -> XadcResult<usize> {
        self.catalog()?
            .find(pattern)
            .ok_or_else(|| XadcError::NotFound(pattern.to_string()))
    }

    /// Read channel `index` and return the corrected value
    /// `(raw + offset) * scale / 1000`.
    ///
    /// Every call reads the raw attribute again. Consecutive calls may still
    /// return the same value if the driver has not sampled in between.
    ///
    /// # Errors
    /// - `OutOfRange` when `index` is not in the catalog (no I/O happens)
    /// - `FileError` when the raw attribute cannot be read; the catalog
    ///   stays valid and a later call may succeed
    pub fn read_channel(&self, index: usize) -> XadcResult<f64> {
        let channel = self.channel(index)?;
        let raw_file = attr_file(channel.name(), RAW_SUFFIX);
        let line = self.source.read_line(&raw_file).map_err(|e| {
            let path = self.source.locate(&raw_file);
            error!("Unable to open raw data file {}: {}", path, e);
            XadcError::file(path, e)
        })?;
        Ok(channel.correct(parse_int_prefix(&line)))
    }

    /// Read the first channel whose name contains `pattern`.
    pub fn read_by_name(&self, pattern: &str) -> XadcResult<f64> {
        let index = self.find_channel(pattern)?;
        self.read_channel(index)
    }

    /// Read every channel in catalog order. Stops at the first failing read.
    pub fn read_all(&self) -> XadcResult<Vec<Reading<'_>>> {
        let catalog = self.catalog()?;
        let mut readings = Vec::with_capacity(catalog.len());
        for (index, channel) in catalog.channels().iter().enumerate() {
            readings.push(Reading {
                index,
                name: channel.name(),
                value: self.read_channel(index)?,
            });
        }
        Ok(readings)
    }
}

/// Convert a caller-supplied signed channel id into a catalog index.
///
/// # Errors
/// `BadArgument` for negative ids.
pub fn channel_index(id: i64) -> XadcResult<usize> {
    usize::try_from(id).map_err(|_| XadcError::BadArgument(format!("channel id {id} is negative")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory attribute directory that counts every access.
    #[derive(Default)]
    struct CountingSource {
        files: Mutex<BTreeMap<String, String>>,
        listings: AtomicUsize,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn with(self, name: &str, content: &str) -> Self {
            self.set(name, content);
            self
        }

        fn set(&self, name: &str, content: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(name.to_string(), content.to_string());
        }

        fn remove(&self, name: &str) {
            self.files.lock().unwrap().remove(name);
        }

        fn listings(&self) -> usize {
            self.listings.load(Ordering::SeqCst)
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl SensorSource for CountingSource {
        fn list_entries(&self) -> io::Result<Vec<String>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }

        fn read_line(&self, file_name: &str) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.files
                .lock()
                .unwrap()
                .get(file_name)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn two_channels() -> CountingSource {
        CountingSource::default()
            .with("in_temp0_raw", "1000\n")
            .with("in_temp0_offset", "50\n")
            .with("in_temp0_scale", "0.25\n")
            .with("in_voltage3_vccpint_raw", "1370\n")
            .with("in_voltage3_vccpint_scale", "0.732421875\n")
    }

    #[test]
    fn test_lazy_build_runs_once() {
        let xadc = Xadc::with_source(two_channels());
        assert_eq!(xadc.state(), CatalogState::Uninitialized);
        assert_eq!(xadc.source().listings(), 0);

        assert_eq!(xadc.find_channel("VCC").unwrap(), 1);
        assert_eq!(xadc.state(), CatalogState::Ready);
        assert_eq!(xadc.source().listings(), 1);

        xadc.info().unwrap();
        xadc.read_channel(0).unwrap();
        xadc.channel_count().unwrap();
        assert_eq!(xadc.source().listings(), 1);
    }

    #[test]
    fn test_build_triggered_by_read() {
        let xadc = Xadc::with_source(two_channels());
        let value = xadc.read_channel(0).unwrap();
        assert!((value - 0.2625).abs() < 1e-12);
        assert_eq!(xadc.source().listings(), 1);
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let xadc = Arc::new(Xadc::with_source(two_channels()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let xadc = Arc::clone(&xadc);
                std::thread::spawn(move || xadc.channel_count().unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
        assert_eq!(xadc.source().listings(), 1);
    }

    #[test]
    fn test_info_is_idempotent() {
        let xadc = Xadc::with_source(two_channels());
        let first = xadc.info().unwrap();
        for _ in 0..5 {
            assert_eq!(xadc.info().unwrap(), first);
        }
        assert_eq!(xadc.source().listings(), 1);
        assert_eq!(first, (2, vec!["temp0", "voltage3_vccpint"]));
    }

    #[test]
    fn test_catalog_does_not_rescan() {
        let xadc = Xadc::with_source(two_channels());
        assert_eq!(xadc.channel_count().unwrap(), 2);

        xadc.source().set("in_voltage8_raw", "1\n");
        xadc.source().set("in_voltage8_scale", "1\n");
        assert_eq!(xadc.channel_count().unwrap(), 2);
    }

    #[test]
    fn test_missing_scale_failure_is_sticky() {
        let source = two_channels();
        source.remove("in_voltage3_vccpint_scale");
        let xadc = Xadc::with_source(source);

        let err = xadc.info().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileError);
        assert_eq!(xadc.state(), CatalogState::Failed);

        // Repairing the tree does not help: no retry.
        xadc.source().set("in_voltage3_vccpint_scale", "0.7\n");
        assert_eq!(xadc.find_channel("temp").unwrap_err(), err);
        assert_eq!(xadc.read_channel(0).unwrap_err(), err);
        assert_eq!(xadc.source().listings(), 1);
    }

    #[test]
    fn test_out_of_range_read_does_no_io() {
        let xadc = Xadc::with_source(two_channels());
        let count = xadc.channel_count().unwrap();
        let reads_after_build = xadc.source().reads();

        let err = xadc.read_channel(count).unwrap_err();
        assert_eq!(err, XadcError::OutOfRange { index: count, count });
        let err = xadc.read_channel(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        assert_eq!(xadc.source().reads(), reads_after_build);
    }

    #[test]
    fn test_negative_channel_id_is_bad_argument() {
        let err = channel_index(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert_eq!(channel_index(3).unwrap(), 3);
    }

    #[test]
    fn test_transient_raw_failure() {
        let xadc = Xadc::with_source(two_channels());
        xadc.channel_count().unwrap();

        xadc.source().remove("in_temp0_raw");
        let err = xadc.read_channel(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileError);
        assert_eq!(xadc.state(), CatalogState::Ready);

        xadc.source().set("in_temp0_raw", "2000\n");
        let value = xadc.read_channel(0).unwrap();
        assert!((value - 0.5125).abs() < 1e-12);
    }

    #[test]
    fn test_every_read_hits_the_source() {
        let xadc = Xadc::with_source(two_channels());
        xadc.read_channel(1).unwrap();
        let before = xadc.source().reads();
        xadc.read_channel(1).unwrap();
        xadc.read_channel(1).unwrap();
        assert_eq!(xadc.source().reads(), before + 2);
    }

    #[test]
    fn test_garbage_raw_reads_as_zero() {
        let xadc = Xadc::with_source(two_channels());
        xadc.source().set("in_voltage3_vccpint_raw", "busy\n");
        assert_eq!(xadc.read_channel(1).unwrap(), 0.0);
    }

    #[test]
    fn test_find_errors() {
        let xadc = Xadc::with_source(two_channels());
        assert_eq!(xadc.find_channel("zzz").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_debug_shows_source() {
        let xadc = Xadc::new("/nonexistent/iio:device0");
        let text = format!("{xadc:?}");
        assert!(text.contains("SysfsSource"));
        assert!(text.contains("iio:device0"));
    }

    #[test]
    fn test_empty_pattern_matches_first_channel() {
        let xadc = Xadc::with_source(two_channels());
        assert_eq!(xadc.find_channel("").unwrap(), 0);
        assert_eq!(xadc.state(), CatalogState::Ready);

        let empty = Xadc::with_source(CountingSource::default());
        assert_eq!(empty.find_channel("").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_read_by_name_and_read_all() {
        let xadc = Xadc::with_source(two_channels());
        let vccpint = xadc.read_by_name("vccPINT").unwrap();
        assert!((vccpint - 1.003417968).abs() < 1e-6);

        let readings = xadc.read_all().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].name, "temp0");
        assert_eq!(readings[1].index, 1);
    }

    #[test]
    fn test_max_channels_is_capped() {
        let xadc = Xadc::with_source(two_channels()).with_max_channels(1);
        assert_eq!(xadc.info().unwrap(), (1, vec!["temp0"]));

        let xadc = Xadc::with_source(two_channels()).with_max_channels(10_000);
        assert_eq!(xadc.max_channels, MAX_CHANNELS);
    }
}
