//! Discovery sources.

use std::fmt;

use super::{
    catalog, cmsisdap, serial,
    usb::{RusbHost, UsbDevice, UsbHost},
    ProbeRecord, ScanError,
};

/// Something that produces probe records.
///
/// A [`Lister`](super::list::Lister) runs several sources and merges their
/// results. A source can claim vendor ids: those devices are reported by it
/// alone, and every other source receives the claimed ids as `skip_vendors`.
pub trait ProbeSource: fmt::Debug {
    /// A short name used in log messages.
    fn name(&self) -> &'static str;

    /// Vendor ids this source is responsible for exclusively.
    fn claimed_vendors(&self) -> &[u16] {
        &[]
    }

    /// Lists the probes found by this source, in discovery order.
    ///
    /// Devices with a vendor id in `skip_vendors` must not be reported.
    fn discover(&self, skip_vendors: &[u16]) -> Result<Vec<ProbeRecord>, ScanError>;
}

/// The generic USB scan: catalog lookup with CMSIS-DAP detection as fallback.
#[derive(Debug, Default)]
pub struct UsbProbeSource<H> {
    host: H,
}

impl UsbProbeSource<RusbHost> {
    /// Creates a source scanning the libusb device list.
    pub fn new() -> Self {
        Self { host: RusbHost }
    }
}

impl<H: UsbHost> UsbProbeSource<H> {
    /// Creates a source scanning the devices of the given host stack.
    pub fn with_host(host: H) -> Self {
        Self { host }
    }

    /// Classifies a single device.
    ///
    /// Returns `Ok(None)` for devices which are not debug probes.
    pub fn classify(
        &self,
        device: &H::Device,
        skip_vendors: &[u16],
    ) -> Result<Option<ProbeRecord>, ScanError> {
        let identity = device
            .identity()
            .map_err(|source| ScanError::DeviceDescriptor {
                location: device.location(),
                source,
            })?;

        let (vendor_id, product_id) = (identity.vendor_id, identity.product_id);

        if skip_vendors.contains(&vendor_id) {
            tracing::trace!(
                "{:04x}:{:04x} is left to another source",
                vendor_id,
                product_id
            );
            return Ok(None);
        }

        if let Some(classification) = catalog::identify(vendor_id, product_id) {
            let serial = serial::resolve(
                device,
                None,
                identity.serial_index,
                classification.serial_policy,
            );

            return Ok(Some(ProbeRecord::new(
                classification.probe_type,
                classification.label,
                serial,
                vendor_id,
                product_id,
            )));
        }

        Ok(cmsisdap::probe_device(
            device,
            vendor_id,
            product_id,
            identity.serial_index,
        ))
    }
}

impl<H: UsbHost + fmt::Debug> ProbeSource for UsbProbeSource<H> {
    fn name(&self) -> &'static str {
        "usb"
    }

    #[tracing::instrument(skip_all)]
    fn discover(&self, skip_vendors: &[u16]) -> Result<Vec<ProbeRecord>, ScanError> {
        let devices = self.host.devices().map_err(ScanError::Enumerate)?;

        tracing::debug!("Inspecting {} USB devices", devices.len());

        let mut probes = vec![];
        for device in &devices {
            if let Some(probe) = self.classify(device, skip_vendors)? {
                tracing::debug!("Found {:?}", probe);
                probes.push(probe);
            }
        }

        Ok(probes)
    }
}
