//! Discovery through a vendor specific bridge driver.
//!
//! On some platforms FTDI devices are owned by the vendor's own driver and
//! can not be inspected through libusb. Those devices are listed through the
//! driver instead, and the generic USB scan leaves the vendor alone.

#[cfg(feature = "ftdi-d2xx")]
pub mod d2xx;

use std::fmt;

use super::{source::ProbeSource, ProbeRecord, ProbeType, ScanError, UNKNOWN_SERIAL};

/// A device reported by a bridge driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeDevice {
    /// Manufacturer string.
    pub manufacturer: String,
    /// Product description string.
    pub description: String,
    /// USB product id.
    pub product_id: u16,
}

/// An error reported by a bridge driver.
#[derive(thiserror::Error, Debug, docsplay::Display)]
pub enum BridgeError {
    /// The bridge driver is not available: {0}
    Unavailable(String),

    /// The bridge driver failed to list devices: {0}
    Enumeration(String),
}

/// A vendor driver that can list its devices.
pub trait BridgeDriver: fmt::Debug {
    /// The vendor id of every device this driver reports.
    fn vendor_id(&self) -> u16;

    /// The kind of probe every device of this driver is.
    fn probe_type(&self) -> ProbeType;

    /// Lists the attached devices.
    fn enumerate(&self) -> Result<Vec<BridgeDevice>, BridgeError>;
}

/// A [`ProbeSource`] backed by a [`BridgeDriver`].
///
/// Bridge drivers do not expose a serial number, so every record carries
/// [`UNKNOWN_SERIAL`].
#[derive(Debug)]
pub struct BridgeSource<B> {
    driver: B,
    claimed: [u16; 1],
}

impl<B: BridgeDriver> BridgeSource<B> {
    /// Creates a new source for the given driver.
    pub fn new(driver: B) -> Self {
        let claimed = [driver.vendor_id()];
        Self { driver, claimed }
    }
}

impl<B: BridgeDriver> ProbeSource for BridgeSource<B> {
    fn name(&self) -> &'static str {
        "vendor bridge"
    }

    fn claimed_vendors(&self) -> &[u16] {
        &self.claimed
    }

    #[tracing::instrument(skip_all)]
    fn discover(&self, _skip_vendors: &[u16]) -> Result<Vec<ProbeRecord>, ScanError> {
        let devices = match self.driver.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!("error listing devices with {:?}: {e}", self.driver);
                return Ok(vec![]);
            }
        };

        tracing::debug!("Found {} devices using {:?}", devices.len(), self.driver);

        Ok(devices
            .into_iter()
            .map(|device| {
                let label = if device.description.is_empty() {
                    device.manufacturer
                } else {
                    device.description
                };

                ProbeRecord::new(
                    self.driver.probe_type(),
                    label,
                    UNKNOWN_SERIAL,
                    self.driver.vendor_id(),
                    device.product_id,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::probe::catalog::VENDOR_ID_FTDI;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct StaticDriver(Result<Vec<BridgeDevice>, &'static str>);

    impl BridgeDriver for StaticDriver {
        fn vendor_id(&self) -> u16 {
            VENDOR_ID_FTDI
        }

        fn probe_type(&self) -> ProbeType {
            ProbeType::Ftdi
        }

        fn enumerate(&self) -> Result<Vec<BridgeDevice>, BridgeError> {
            self.0
                .clone()
                .map_err(|e| BridgeError::Enumeration(e.to_owned()))
        }
    }

    fn device(manufacturer: &str, description: &str) -> BridgeDevice {
        BridgeDevice {
            manufacturer: manufacturer.to_owned(),
            description: description.to_owned(),
            product_id: 0x6010,
        }
    }

    #[test]
    fn claims_its_vendor() {
        let source = BridgeSource::new(StaticDriver(Ok(vec![])));

        assert_eq!(source.claimed_vendors(), &[VENDOR_ID_FTDI]);
    }

    #[test]
    fn records_use_description_and_unknown_serial() {
        let source = BridgeSource::new(StaticDriver(Ok(vec![
            device("FTDI", "Dual RS232-HS A"),
            device("Olimex", ""),
        ])));

        let records = source.discover(&[]).unwrap();

        assert_eq!(
            records,
            vec![
                ProbeRecord::new(ProbeType::Ftdi, "Dual RS232-HS A", UNKNOWN_SERIAL, 0x0403, 0x6010),
                ProbeRecord::new(ProbeType::Ftdi, "Olimex", UNKNOWN_SERIAL, 0x0403, 0x6010),
            ]
        );
    }

    #[test]
    fn driver_failure_yields_nothing() {
        let source = BridgeSource::new(StaticDriver(Err("FT_DEVICE_NOT_FOUND")));

        assert!(source.discover(&[]).unwrap().is_empty());
    }
}
