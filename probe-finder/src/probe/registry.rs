//! The ordered result of a scan.

use std::{fmt, num::NonZeroUsize};

use serde::Serialize;

use super::{ProbeRecord, ProbeType};

/// Number of probes a [`Registry`] holds unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 32;

/// The 1-based position of a probe in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ordinal(NonZeroUsize);

impl Ordinal {
    /// The ordinal as a plain number.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An error when adding a probe to a [`Registry`].
#[derive(thiserror::Error, Debug, docsplay::Display, PartialEq, Eq)]
pub enum RegistryError {
    /// More than {capacity} probes were found.
    CapacityExceeded {
        /// The capacity of the registry.
        capacity: usize,
    },
}

/// Probes in the order they were discovered, numbered from 1.
///
/// Records are never removed or reordered.
#[derive(Debug, Clone)]
pub struct Registry {
    records: Vec<ProbeRecord>,
    capacity: usize,
}

impl Registry {
    /// Creates an empty registry holding up to [`DEFAULT_CAPACITY`] probes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry holding up to `capacity` probes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Adds a probe and returns its ordinal.
    pub fn append(&mut self, record: ProbeRecord) -> Result<Ordinal, RegistryError> {
        if self.records.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.records.push(record);

        // The vector is non-empty after the push.
        Ok(Ordinal(NonZeroUsize::MIN.saturating_add(self.records.len() - 1)))
    }

    /// Returns the probe with the given ordinal.
    pub fn get(&self, ordinal: Ordinal) -> Option<&ProbeRecord> {
        self.records.get(ordinal.get() - 1)
    }

    /// Iterates over all probes with their ordinals, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (Ordinal, &ProbeRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (Ordinal(NonZeroUsize::MIN.saturating_add(index)), record))
    }

    /// The report handed to output formatters.
    pub fn entries(&self) -> Vec<ReportEntry> {
        self.iter()
            .map(|(ordinal, record)| ReportEntry {
                ordinal,
                vendor_id: record.vendor_id,
                product_id: record.product_id,
                probe_type: record.probe_type,
                label: record.label.clone(),
                serial: record.serial.clone(),
            })
            .collect()
    }

    /// The maximum number of probes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of probes found.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no probe was found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All probes, in discovery order.
    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// One line of the scan report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Position in discovery order.
    pub ordinal: Ordinal,
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
    /// Kind of probe.
    pub probe_type: ProbeType,
    /// Probe type label.
    pub label: String,
    /// Serial number or [`UNKNOWN_SERIAL`](super::UNKNOWN_SERIAL).
    pub serial: String,
}
