//! Serial number resolution.

use super::{
    bounded,
    usb::{UsbDevice, UsbDeviceHandle},
    SerialPolicy, UNKNOWN_SERIAL,
};

/// Determines the serial number of a classified device.
///
/// `handle` is used if the device is already open. Otherwise the device is
/// opened here and closed again before returning. Every failure results in
/// [`UNKNOWN_SERIAL`], this never fails.
pub fn resolve<D: UsbDevice>(
    device: &D,
    handle: Option<&D::Handle>,
    serial_index: Option<u8>,
    policy: SerialPolicy,
) -> String {
    if policy == SerialPolicy::Placeholder {
        return UNKNOWN_SERIAL.to_owned();
    }

    let Some(index) = serial_index else {
        tracing::debug!("{} has no serial number descriptor", device.location());
        return UNKNOWN_SERIAL.to_owned();
    };

    match handle {
        Some(handle) => read_serial(device, handle, index),
        None => match device.open_handle() {
            Ok(handle) => read_serial(device, &handle, index),
            Err(e) => {
                tracing::debug!(
                    "failed to open {} to read its serial number: {}",
                    device.location(),
                    e
                );
                UNKNOWN_SERIAL.to_owned()
            }
        },
    }
}

fn read_serial<D: UsbDevice>(device: &D, handle: &D::Handle, index: u8) -> String {
    match handle.read_ascii_string(index) {
        Ok(serial) if !serial.is_empty() => bounded(serial),
        Ok(_) => {
            tracing::debug!("{} reports an empty serial number", device.location());
            UNKNOWN_SERIAL.to_owned()
        }
        Err(e) => {
            tracing::debug!(
                "failed to read serial number of {} (string {}): {}",
                device.location(),
                index,
                e
            );
            UNKNOWN_SERIAL.to_owned()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::probe::{fake_usb::FakeDevice, MAX_DESCRIPTOR_LEN};

    #[test]
    fn placeholder_policy_does_not_touch_the_device() {
        let device = FakeDevice::new(0x0483, 0x3748).with_serial("066DFF123456");

        let serial = resolve(&device, None, device.serial_index(), SerialPolicy::Placeholder);

        assert_eq!(serial, UNKNOWN_SERIAL);
        assert_eq!(device.ledger().opened(), 0);
        assert!(device.string_reads().is_empty());
    }

    #[test]
    fn reads_serial_and_closes_handle() {
        let device = FakeDevice::new(0x1d50, 0x6018).with_serial("7BB180B4");

        let serial = resolve(
            &device,
            None,
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial, "7BB180B4");
        assert_eq!(device.ledger().opened(), 1);
        assert_eq!(device.ledger().closed(), 1);
    }

    #[test]
    fn open_failure_gives_placeholder() {
        let device = FakeDevice::new(0x1d50, 0x6018)
            .with_serial("7BB180B4")
            .with_open_error(rusb::Error::Access);

        let serial = resolve(
            &device,
            None,
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial, UNKNOWN_SERIAL);
        assert_eq!(device.ledger().opened(), 0);
        assert_eq!(device.ledger().closed(), 0);
    }

    #[test]
    fn read_error_gives_placeholder() {
        let device = FakeDevice::new(0x1d50, 0x6018).with_broken_serial(rusb::Error::Pipe);

        let serial = resolve(
            &device,
            None,
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial, UNKNOWN_SERIAL);
        assert_eq!(device.ledger().closed(), 1);
    }

    #[test]
    fn empty_serial_gives_placeholder() {
        let device = FakeDevice::new(0x1d50, 0x6018).with_serial("");

        let serial = resolve(
            &device,
            None,
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial, UNKNOWN_SERIAL);
    }

    #[test]
    fn missing_serial_index_gives_placeholder_without_opening() {
        let device = FakeDevice::new(0x1d50, 0x6018);

        let serial = resolve(&device, None, None, SerialPolicy::ReadFromDevice);

        assert_eq!(serial, UNKNOWN_SERIAL);
        assert_eq!(device.ledger().opened(), 0);
    }

    #[test]
    fn existing_handle_is_reused() {
        let device = FakeDevice::new(0xc251, 0xf002).with_serial("0240000034544e45");
        let handle = device.open_handle().unwrap();

        let serial = resolve(
            &device,
            Some(&handle),
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial, "0240000034544e45");
        assert_eq!(device.ledger().opened(), 1);
        assert_eq!(device.ledger().closed(), 0);

        drop(handle);
        assert_eq!(device.ledger().closed(), 1);
    }

    #[test]
    fn long_serial_is_truncated() {
        let device = FakeDevice::new(0x1d50, 0x6018).with_serial(&"S".repeat(200));

        let serial = resolve(
            &device,
            None,
            device.serial_index(),
            SerialPolicy::ReadFromDevice,
        );

        assert_eq!(serial.len(), MAX_DESCRIPTOR_LEN);
    }
}
