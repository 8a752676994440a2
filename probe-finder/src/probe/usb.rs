//! The slice of the host USB stack used during discovery.
//!
//! Discovery only needs to enumerate devices, read their descriptors and
//! read string descriptors through an open handle. These traits describe
//! exactly that, and are implemented for [`rusb`].

use rusb::UsbContext;

/// The identity part of a USB device descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
    /// Index of the serial number string descriptor, if the device has one.
    pub serial_index: Option<u8>,
}

/// An alternate setting of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltSetting {
    /// The alternate setting number.
    pub setting: u8,
    /// Index of the interface string descriptor, if any.
    pub string_index: Option<u8>,
}

/// An interface of the active configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// The interface number.
    pub number: u8,
    /// Alternate settings, in ascending order.
    pub alt_settings: Vec<AltSetting>,
}

/// The interfaces of a device's active configuration, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// All interfaces of the configuration.
    pub interfaces: Vec<InterfaceInfo>,
}

/// Enumerates the devices attached to the host.
pub trait UsbHost {
    /// The device type of this host stack.
    type Device: UsbDevice;

    /// Lists all attached devices in bus order.
    fn devices(&self) -> Result<Vec<Self::Device>, rusb::Error>;
}

/// A physical device which has not necessarily been opened.
pub trait UsbDevice {
    /// The open handle type.
    ///
    /// Dropping the handle closes the device.
    type Handle: UsbDeviceHandle;

    /// A human readable location of the device, used in log messages.
    fn location(&self) -> String;

    /// Reads the device descriptor.
    fn identity(&self) -> Result<DeviceIdentity, rusb::Error>;

    /// Reads the active configuration descriptor.
    fn active_configuration(&self) -> Result<Configuration, rusb::Error>;

    /// Opens the device.
    fn open_handle(&self) -> Result<Self::Handle, rusb::Error>;
}

/// An open device.
pub trait UsbDeviceHandle {
    /// Reads a string descriptor converted to ASCII.
    fn read_ascii_string(&self, index: u8) -> Result<String, rusb::Error>;
}

/// The libusb backed host stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusbHost;

impl UsbHost for RusbHost {
    type Device = rusb::Device<rusb::Context>;

    fn devices(&self) -> Result<Vec<Self::Device>, rusb::Error> {
        let context = rusb::Context::new()?;
        let devices = context.devices()?;

        Ok(devices.iter().collect())
    }
}

impl<T: UsbContext> UsbDevice for rusb::Device<T> {
    type Handle = rusb::DeviceHandle<T>;

    fn location(&self) -> String {
        format!("bus {:03} address {:03}", self.bus_number(), self.address())
    }

    fn identity(&self) -> Result<DeviceIdentity, rusb::Error> {
        let descriptor = self.device_descriptor()?;

        Ok(DeviceIdentity {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            serial_index: descriptor.serial_number_string_index(),
        })
    }

    fn active_configuration(&self) -> Result<Configuration, rusb::Error> {
        let config = self.active_config_descriptor()?;

        let interfaces = config
            .interfaces()
            .map(|interface| InterfaceInfo {
                number: interface.number(),
                alt_settings: interface
                    .descriptors()
                    .map(|descriptor| AltSetting {
                        setting: descriptor.setting_number(),
                        string_index: descriptor.description_string_index(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Configuration { interfaces })
    }

    fn open_handle(&self) -> Result<Self::Handle, rusb::Error> {
        rusb::Device::open(self)
    }
}

impl<T: UsbContext> UsbDeviceHandle for rusb::DeviceHandle<T> {
    fn read_ascii_string(&self, index: u8) -> Result<String, rusb::Error> {
        self.read_string_descriptor_ascii(index)
    }
}
