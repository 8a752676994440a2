//! Probe discovery and classification.

pub mod bridge;
pub mod catalog;
pub mod cmsisdap;
#[cfg(any(test, feature = "test"))]
pub mod fake_usb;
pub mod list;
pub mod registry;
pub mod selector;
pub mod serial;
pub mod source;
pub mod usb;

use std::fmt;

use serde::Serialize;

use self::registry::RegistryError;

/// Serial number reported for probes whose serial could not be read.
pub const UNKNOWN_SERIAL: &str = "Unknown";

/// Maximum length in bytes of any descriptor text kept in a [`ProbeRecord`].
pub const MAX_DESCRIPTOR_LEN: usize = 64;

/// The kind of debug probe a device was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeType {
    /// Black Magic Probe, the native probe.
    BlackMagic,
    /// ST-Link V2 and V3 family.
    StLink,
    /// Segger J-Link.
    JLink,
    /// FTDI based USB serial bridge.
    Ftdi,
    /// Any adaptor advertising CMSIS-DAP in an interface string.
    CmsisDap,
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeType::BlackMagic => "Black Magic Probe",
            ProbeType::StLink => "ST-Link",
            ProbeType::JLink => "J-Link",
            ProbeType::Ftdi => "FTDI",
            ProbeType::CmsisDap => "CMSIS-DAP",
        })
    }
}

/// How the serial number of a classified device is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialPolicy {
    /// Read the serial number string descriptor from the device.
    ReadFromDevice,
    /// Never touch the device, always report [`UNKNOWN_SERIAL`].
    ///
    /// Used for models whose serial number descriptor is garbage.
    Placeholder,
}

/// The outcome of classifying a device, before its serial number is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Kind of probe.
    pub probe_type: ProbeType,
    /// Label shown to the user.
    pub label: String,
    /// How to obtain the serial number.
    pub serial_policy: SerialPolicy,
}

/// A discovered and classified debug probe.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    /// Kind of probe.
    pub probe_type: ProbeType,
    /// Human readable probe type, either from the catalog or from the
    /// interface string that carried the CMSIS-DAP marker.
    pub label: String,
    /// Serial number, [`UNKNOWN_SERIAL`] if it could not be determined.
    pub serial: String,
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
}

impl ProbeRecord {
    /// Creates a new record.
    ///
    /// Label and serial are truncated to [`MAX_DESCRIPTOR_LEN`] bytes, and an
    /// empty serial is replaced by [`UNKNOWN_SERIAL`].
    pub fn new(
        probe_type: ProbeType,
        label: impl Into<String>,
        serial: impl Into<String>,
        vendor_id: u16,
        product_id: u16,
    ) -> Self {
        let serial = bounded(serial.into());

        Self {
            probe_type,
            label: bounded(label.into()),
            serial: if serial.is_empty() {
                UNKNOWN_SERIAL.to_owned()
            } else {
                serial
            },
            vendor_id,
            product_id,
        }
    }

    /// Returns true if no serial number is known for this probe.
    pub fn has_unknown_serial(&self) -> bool {
        self.serial == UNKNOWN_SERIAL
    }
}

impl fmt::Debug for ProbeRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (VID: {:04x}, PID: {:04x}, Serial: {}, {:?})",
            self.label, self.vendor_id, self.product_id, self.serial, self.probe_type
        )
    }
}

impl fmt::Display for ProbeRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} -- {:04x}:{:04x}:{} ({})",
            self.label, self.vendor_id, self.product_id, self.serial, self.probe_type
        )
    }
}

/// Truncates descriptor text to at most [`MAX_DESCRIPTOR_LEN`] bytes.
///
/// The cut is made at a character boundary, so the result may be shorter.
pub(crate) fn bounded(mut text: String) -> String {
    if text.len() > MAX_DESCRIPTOR_LEN {
        let mut end = MAX_DESCRIPTOR_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// An error which aborts a whole scan.
#[derive(thiserror::Error, Debug, docsplay::Display)]
pub enum ScanError {
    /// Failed to enumerate USB devices.
    Enumerate(#[source] rusb::Error),

    /// Failed to read the device descriptor of the USB device at {location}.
    DeviceDescriptor {
        /// Bus location of the device.
        location: String,
        /// The underlying USB error.
        #[source]
        source: rusb::Error,
    },

    /// Could not record the probe.
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_serial_becomes_placeholder() {
        let record = ProbeRecord::new(ProbeType::JLink, "Segger JLink", "", 0x1366, 0x0101);

        assert_eq!(record.serial, UNKNOWN_SERIAL);
        assert!(record.has_unknown_serial());
    }

    #[test]
    fn long_text_is_truncated() {
        let record = ProbeRecord::new(ProbeType::CmsisDap, "X".repeat(100), "7".repeat(65), 1, 2);

        assert_eq!(record.label.len(), MAX_DESCRIPTOR_LEN);
        assert_eq!(record.serial.len(), MAX_DESCRIPTOR_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 63 ASCII bytes followed by a two byte character straddling the limit.
        let text = format!("{}é", "a".repeat(63));

        let cut = bounded(text);

        assert_eq!(cut.len(), 63);
        assert!(cut.chars().all(|c| c == 'a'));
    }

    #[test]
    fn debug_output() {
        let record = ProbeRecord::new(ProbeType::StLink, "STLink V3", "0042", 0x0483, 0x374f);

        assert_eq!(
            format!("{record:?}"),
            "STLink V3 (VID: 0483, PID: 374f, Serial: 0042, StLink)"
        );
    }
}
