//! Selecting probes by id and serial number.

use std::fmt;

use super::ProbeRecord;

/// Selects probes by id and, optionally, serial number.
///
/// The string form is "VID:PID" or "VID:PID:SERIALNUMBER", with VID and PID
/// parsed as hexadecimal numbers. An empty serial number ("VID:PID:") selects
/// probes whose serial number is unknown.
///
/// ## Example:
///
/// ```
/// use probe_finder::ProbeSelector;
///
/// let selector: ProbeSelector = "1d50:6018:7BB180B4".parse().unwrap();
///
/// assert_eq!(selector.vendor_id, 0x1d50);
/// assert_eq!(selector.product_id, 0x6018);
/// assert_eq!(selector.serial_number.as_deref(), Some("7BB180B4"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeSelector {
    /// The USB vendor id of the probe.
    pub vendor_id: u16,
    /// The USB product id of the probe.
    pub product_id: u16,
    /// The serial number of the probe.
    pub serial_number: Option<String>,
}

impl ProbeSelector {
    /// Check if the given probe matches this selector.
    pub fn matches(&self, record: &ProbeRecord) -> bool {
        record.vendor_id == self.vendor_id
            && record.product_id == self.product_id
            && self
                .serial_number
                .as_ref()
                .map(|serial| {
                    if serial.is_empty() {
                        record.has_unknown_serial()
                    } else {
                        record.serial == *serial
                    }
                })
                .unwrap_or(true)
    }
}

impl std::str::FromStr for ProbeSelector {
    type Err = ProbeSelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Serial numbers may contain colons themselves.
        let mut split = s.splitn(3, ':');

        let vendor_id = split.next().unwrap_or_default();
        let product_id = split.next().ok_or(ProbeSelectorParseError::Format)?;
        let serial_number = split.next().map(|s| s.to_string());

        Ok(ProbeSelector {
            vendor_id: u16::from_str_radix(vendor_id, 16)?,
            product_id: u16::from_str_radix(product_id, 16)?,
            serial_number,
        })
    }
}

impl From<&ProbeRecord> for ProbeSelector {
    fn from(record: &ProbeRecord) -> Self {
        ProbeSelector {
            vendor_id: record.vendor_id,
            product_id: record.product_id,
            serial_number: Some(record.serial.clone()),
        }
    }
}

impl fmt::Display for ProbeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)?;
        if let Some(ref sn) = self.serial_number {
            write!(f, ":{sn}")?;
        }
        Ok(())
    }
}

/// An error which can occur while parsing a [`ProbeSelector`].
#[derive(thiserror::Error, Debug, docsplay::Display)]
pub enum ProbeSelectorParseError {
    /// Could not parse VID or PID: {0}
    ParseInt(#[from] std::num::ParseIntError),

    /// The format of the selector is invalid. Please use a string in the form `VID:PID:<Serial>`, where Serial is optional.
    Format,
}
