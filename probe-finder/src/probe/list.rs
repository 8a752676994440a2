//! Listing probes from all discovery sources.

use super::{
    registry::{Registry, DEFAULT_CAPACITY},
    selector::ProbeSelector,
    source::{ProbeSource, UsbProbeSource},
    ScanError,
};

/// Settings for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum number of probes recorded before the scan fails.
    pub max_probes: usize,
    /// List FTDI devices through the vendor bridge driver instead of libusb.
    ///
    /// Only has an effect when built with the `ftdi-d2xx` feature.
    pub vendor_bridge: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_probes: DEFAULT_CAPACITY,
            vendor_bridge: cfg!(windows),
        }
    }
}

/// Struct to list all attached debug probes
#[derive(Debug)]
pub struct Lister {
    sources: Vec<Box<dyn ProbeSource>>,
    capacity: usize,
}

impl Lister {
    /// Create a new lister with the default sources and options.
    pub fn new() -> Self {
        Self::from_options(&ScanOptions::default())
    }

    /// Create a new lister with the default sources, configured by `options`.
    pub fn from_options(options: &ScanOptions) -> Self {
        let mut sources: Vec<Box<dyn ProbeSource>> = vec![];

        #[cfg(feature = "ftdi-d2xx")]
        if options.vendor_bridge {
            sources.push(Box::new(super::bridge::BridgeSource::new(
                super::bridge::d2xx::D2xxDriver,
            )));
        }
        #[cfg(not(feature = "ftdi-d2xx"))]
        if options.vendor_bridge {
            tracing::debug!("Built without a vendor bridge driver, using libusb only");
        }

        sources.push(Box::new(UsbProbeSource::new()));

        Self {
            sources,
            capacity: options.max_probes,
        }
    }

    /// Create a new lister with custom sources.
    ///
    /// Sources run in the given order, so their probes are numbered in that
    /// order too.
    pub fn with_sources(sources: Vec<Box<dyn ProbeSource>>, capacity: usize) -> Self {
        Self { sources, capacity }
    }

    /// List all available debug probes.
    pub fn scan(&self) -> Result<Registry, ScanError> {
        self.scan_filtered(None)
    }

    /// List the debug probes matching `selector`.
    #[tracing::instrument(skip_all)]
    pub fn scan_filtered(&self, selector: Option<&ProbeSelector>) -> Result<Registry, ScanError> {
        let mut registry = Registry::with_capacity(self.capacity);

        for (index, source) in self.sources.iter().enumerate() {
            let skip_vendors: Vec<u16> = self
                .sources
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != index)
                .flat_map(|(_, other)| other.claimed_vendors().iter().copied())
                .collect();

            tracing::debug!(
                "Searching for probes using {} source, skipping vendors {:04x?}",
                source.name(),
                skip_vendors
            );

            for record in source.discover(&skip_vendors)? {
                if selector.is_some_and(|selector| !selector.matches(&record)) {
                    tracing::trace!("Ignoring {:?}, it does not match the selector", record);
                    continue;
                }

                let ordinal = registry.append(record)?;
                tracing::trace!("Registered probe {}", ordinal);
            }
        }

        tracing::debug!("Found {} probes total", registry.len());
        Ok(registry)
    }
}

impl Default for Lister {
    fn default() -> Self {
        Self::new()
    }
}
