//! # probe-finder
//!
//! Finds the debug probes attached to this machine over USB.
//!
//! Every device reported by the host USB stack is first matched against a
//! catalog of known vendor and product ids. Devices that are not in the catalog
//! are opened and their interface strings are searched for a CMSIS-DAP marker.
//! Each classified device gets a serial number and is numbered in discovery
//! order.
//!
//! # Example
//!
//! ```no_run
//! use probe_finder::Lister;
//!
//! let lister = Lister::new();
//! let registry = lister.scan()?;
//!
//! for (ordinal, probe) in registry.iter() {
//!     println!("{ordinal}: {probe}");
//! }
//! # Ok::<(), probe_finder::ScanError>(())
//! ```
#![warn(missing_docs)]

pub mod probe;

pub use crate::probe::{
    list::{Lister, ScanOptions},
    registry::{Ordinal, Registry, RegistryError, ReportEntry},
    selector::{ProbeSelector, ProbeSelectorParseError},
    ProbeRecord, ProbeType, ScanError, UNKNOWN_SERIAL,
};
