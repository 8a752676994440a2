//! Detection of CMSIS-DAP probes by their interface strings.
//!
//! CMSIS-DAP adaptors are built by many vendors on many different ids. The
//! only thing they have in common is that one of their interfaces carries a
//! string containing "CMSIS", e.g. "CMSIS-DAP v1.0" or "Foo CMSIS-DAP".

use super::{
    bounded, serial,
    usb::{UsbDevice, UsbDeviceHandle},
    Classification, ProbeRecord, ProbeType, SerialPolicy,
};

/// The marker searched for in interface strings. Matching is case sensitive.
pub const CMSIS_MARKER: &str = "CMSIS";

/// Returns true if an interface string advertises CMSIS-DAP.
pub fn is_cmsis_dap(interface_string: &str) -> bool {
    interface_string.contains(CMSIS_MARKER)
}

/// Searches the interface strings of a device for the CMSIS-DAP marker.
///
/// The device is opened for the duration of the search and, on a match, for
/// reading the serial number. Devices that can not be opened or whose
/// configuration can not be read are skipped. Returns `None` if the device is
/// not a CMSIS-DAP probe.
pub fn probe_device<D: UsbDevice>(
    device: &D,
    vendor_id: u16,
    product_id: u16,
    serial_index: Option<u8>,
) -> Option<ProbeRecord> {
    let handle = match device.open_handle() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::debug!("failed to open {}: {}", device.location(), e);
            return None;
        }
    };

    let configuration = match device.active_configuration() {
        Ok(configuration) => configuration,
        Err(e) => {
            tracing::debug!(
                "failed to read the active configuration of {}: {}",
                device.location(),
                e
            );
            return None;
        }
    };

    let label = configuration.interfaces.iter().find_map(|interface| {
        interface.alt_settings.iter().find_map(|alt| {
            let index = alt.string_index.filter(|&index| index != 0)?;

            let interface_string = match handle.read_ascii_string(index) {
                Ok(s) => bounded(s),
                Err(e) => {
                    // A single unreadable string does not disqualify the device.
                    tracing::trace!(
                        "  Interface {} alt {}: string {} unreadable: {}",
                        interface.number,
                        alt.setting,
                        index,
                        e
                    );
                    return None;
                }
            };

            tracing::trace!(
                "  Interface {} alt {}: {}",
                interface.number,
                alt.setting,
                interface_string
            );

            is_cmsis_dap(&interface_string).then_some(interface_string)
        })
    })?;

    tracing::debug!(
        "{:04x}:{:04x} advertises {} at {}",
        vendor_id,
        product_id,
        label,
        device.location()
    );

    let classification = Classification {
        probe_type: ProbeType::CmsisDap,
        label,
        serial_policy: SerialPolicy::ReadFromDevice,
    };
    let serial = serial::resolve(
        device,
        Some(&handle),
        serial_index,
        classification.serial_policy,
    );

    Some(ProbeRecord::new(
        classification.probe_type,
        classification.label,
        serial,
        vendor_id,
        product_id,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::probe::{fake_usb::FakeDevice, UNKNOWN_SERIAL};
    use test_case::test_case;

    fn probe(device: &FakeDevice) -> Option<ProbeRecord> {
        probe_device(device, 0xc251, 0xf002, device.serial_index())
    }

    #[test_case("CMSIS-DAP", true; "plain")]
    #[test_case("CMSIS-DAP v1.0", true; "versioned")]
    #[test_case("LPC-Link CMSIS-DAP", true; "prefixed")]
    #[test_case("CMSIS_DAP", true; "underscore")]
    #[test_case("cmsis-dap", false; "lowercase")]
    #[test_case("Cmsis-Dap", false; "mixed case")]
    #[test_case("DAPLink", false; "no marker")]
    #[test_case("", false; "empty")]
    fn marker_is_case_sensitive(text: &str, expected: bool) {
        assert_eq!(is_cmsis_dap(text), expected);
    }

    #[test]
    fn marker_on_later_alt_setting() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_serial("0240000034544e45")
            .with_interface(&[Some("Mass Storage")])
            .with_interface(&[None, Some("Vendor"), Some("CMSIS-DAP v1.0")]);

        let record = probe(&device).unwrap();

        assert_eq!(record.label, "CMSIS-DAP v1.0");
        assert_eq!(record.probe_type, ProbeType::CmsisDap);
        assert_eq!(record.serial, "0240000034544e45");
        assert!(device.ledger().is_balanced());
        assert_eq!(device.ledger().opened(), 1);
    }

    #[test]
    fn scanning_stops_at_first_match() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_interface(&[Some("CMSIS-DAP first")])
            .with_interface(&[Some("CMSIS-DAP second")]);

        let record = probe(&device).unwrap();

        assert_eq!(record.label, "CMSIS-DAP first");
        // Only the first interface string was read, the device has no serial.
        assert_eq!(device.string_reads(), vec![1]);
        assert_eq!(record.serial, UNKNOWN_SERIAL);
    }

    #[test]
    fn no_marker_means_no_record() {
        let device = FakeDevice::new(0x046d, 0xc52b)
            .with_serial("ABC")
            .with_interface(&[Some("Keyboard")])
            .with_interface(&[Some("Mouse"), None]);

        assert!(probe(&device).is_none());
        assert!(device.ledger().is_balanced());
    }

    #[test]
    fn lowercase_marker_is_ignored() {
        let device = FakeDevice::new(0x1234, 0x0001).with_interface(&[Some("cmsis-dap")]);

        assert!(probe(&device).is_none());
    }

    #[test]
    fn failed_string_reads_are_skipped() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_broken_interface(2, rusb::Error::Pipe)
            .with_interface(&[Some("CMSIS-DAP")]);

        let record = probe(&device).unwrap();

        assert_eq!(record.label, "CMSIS-DAP");
        assert_eq!(device.string_reads(), vec![1, 2, 3]);
        assert!(device.ledger().is_balanced());
    }

    #[test]
    fn all_string_reads_failing_means_no_record() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_broken_interface(3, rusb::Error::Timeout)
            .with_broken_interface(1, rusb::Error::Io);

        assert!(probe(&device).is_none());
        assert_eq!(device.string_reads().len(), 4);
        assert!(device.ledger().is_balanced());
    }

    #[test]
    fn open_failure_skips_device() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_interface(&[Some("CMSIS-DAP")])
            .with_open_error(rusb::Error::Access);

        assert!(probe(&device).is_none());
        assert_eq!(device.ledger().opened(), 0);
        assert!(device.string_reads().is_empty());
    }

    #[test]
    fn configuration_failure_skips_device_and_closes_it() {
        let device = FakeDevice::new(0xc251, 0xf002).without_configuration(rusb::Error::NotFound);

        assert!(probe(&device).is_none());
        assert_eq!(device.ledger().opened(), 1);
        assert_eq!(device.ledger().closed(), 1);
    }

    #[test]
    fn serial_read_failure_gives_placeholder() {
        let device = FakeDevice::new(0xc251, 0xf002)
            .with_broken_serial(rusb::Error::Pipe)
            .with_interface(&[Some("CMSIS-DAP")]);

        let record = probe(&device).unwrap();

        assert_eq!(record.serial, UNKNOWN_SERIAL);
        assert!(device.ledger().is_balanced());
    }

    #[test]
    fn marker_past_the_length_limit_is_not_seen() {
        let padded = format!("{}CMSIS-DAP", " ".repeat(60));
        let device = FakeDevice::new(0xc251, 0xf002).with_interface(&[Some(&padded)]);

        assert!(probe(&device).is_none());
    }
}
