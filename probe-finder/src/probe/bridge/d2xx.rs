//! FTDI enumeration through the D2XX driver.

use crate::probe::{catalog::VENDOR_ID_FTDI, ProbeType};

use super::{BridgeDevice, BridgeDriver, BridgeError};

/// Lists FTDI devices using the proprietary D2XX driver installed by default
/// in Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct D2xxDriver;

fn ft_status_to_err(e: libftd2xx::FtStatus) -> BridgeError {
    BridgeError::Enumeration(format!("FTDI D2XX error: {e}"))
}

impl BridgeDriver for D2xxDriver {
    fn vendor_id(&self) -> u16 {
        VENDOR_ID_FTDI
    }

    fn probe_type(&self) -> ProbeType {
        ProbeType::Ftdi
    }

    fn enumerate(&self) -> Result<Vec<BridgeDevice>, BridgeError> {
        let version = libftd2xx::library_version()
            .map_err(|e| BridgeError::Unavailable(format!("FTDI D2XX error: {e}")))?;
        tracing::debug!("Using FTDI D2XX {}", version);

        let devices = libftd2xx::list_devices().map_err(ft_status_to_err)?;

        Ok(devices
            .into_iter()
            .filter(|info| info.vendor_id == VENDOR_ID_FTDI)
            .map(|info| BridgeDevice {
                // D2XX only reports FTDI parts, the EEPROM manufacturer string
                // needs the device to be opened.
                manufacturer: "FTDI".to_owned(),
                description: info.description,
                product_id: info.product_id,
            })
            .collect())
    }
}
