#![allow(missing_docs)] // Don't require docs for test code
//! An in-memory USB host stack for tests and dry runs.
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use super::usb::{
    AltSetting, Configuration, DeviceIdentity, InterfaceInfo, UsbDevice, UsbDeviceHandle, UsbHost,
};

/// Counts how often a device was opened and closed.
#[derive(Debug, Clone, Default)]
pub struct HandleLedger {
    opened: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl HandleLedger {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    /// True if every handle that was opened has been closed exactly once.
    pub fn is_balanced(&self) -> bool {
        self.opened() == self.closed()
    }
}

/// A fake device with a scripted descriptor tree.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    identity: DeviceIdentity,
    identity_error: Option<rusb::Error>,
    configuration: Result<Configuration, rusb::Error>,
    strings: BTreeMap<u8, Result<String, rusb::Error>>,
    open_error: Option<rusb::Error>,
    next_string_index: u8,
    ledger: HandleLedger,
    reads: Rc<RefCell<Vec<u8>>>,
}

impl FakeDevice {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            identity: DeviceIdentity {
                vendor_id,
                product_id,
                serial_index: None,
            },
            identity_error: None,
            configuration: Ok(Configuration::default()),
            strings: BTreeMap::new(),
            open_error: None,
            next_string_index: 1,
            ledger: HandleLedger::default(),
            reads: Rc::default(),
        }
    }

    fn add_string(&mut self, value: Result<String, rusb::Error>) -> u8 {
        let index = self.next_string_index;
        self.next_string_index += 1;
        self.strings.insert(index, value);
        index
    }

    fn push_interface(&mut self, string_indices: Vec<Option<u8>>) {
        let Ok(configuration) = &mut self.configuration else {
            return;
        };

        let number = configuration.interfaces.len() as u8;
        configuration.interfaces.push(InterfaceInfo {
            number,
            alt_settings: string_indices
                .into_iter()
                .enumerate()
                .map(|(setting, string_index)| AltSetting {
                    setting: setting as u8,
                    string_index,
                })
                .collect(),
        });
    }

    pub fn with_serial(mut self, serial: &str) -> Self {
        let index = self.add_string(Ok(serial.to_owned()));
        self.identity.serial_index = Some(index);
        self
    }

    /// The serial number descriptor exists, but reading it fails.
    pub fn with_broken_serial(mut self, error: rusb::Error) -> Self {
        let index = self.add_string(Err(error));
        self.identity.serial_index = Some(index);
        self
    }

    /// Adds an interface with one alternate setting per entry.
    ///
    /// `None` entries have no interface string.
    pub fn with_interface(mut self, alt_strings: &[Option<&str>]) -> Self {
        let indices = alt_strings
            .iter()
            .map(|s| s.map(|s| self.add_string(Ok(s.to_owned()))))
            .collect();
        self.push_interface(indices);
        self
    }

    /// Adds an interface whose interface strings all fail to read.
    pub fn with_broken_interface(mut self, alt_settings: usize, error: rusb::Error) -> Self {
        let indices = (0..alt_settings)
            .map(|_| Some(self.add_string(Err(error))))
            .collect();
        self.push_interface(indices);
        self
    }

    pub fn without_configuration(mut self, error: rusb::Error) -> Self {
        self.configuration = Err(error);
        self
    }

    pub fn with_open_error(mut self, error: rusb::Error) -> Self {
        self.open_error = Some(error);
        self
    }

    pub fn with_identity_error(mut self, error: rusb::Error) -> Self {
        self.identity_error = Some(error);
        self
    }

    pub fn serial_index(&self) -> Option<u8> {
        self.identity.serial_index
    }

    pub fn ledger(&self) -> &HandleLedger {
        &self.ledger
    }

    /// All string descriptor indices read so far, in order.
    pub fn string_reads(&self) -> Vec<u8> {
        self.reads.borrow().clone()
    }
}

impl UsbDevice for FakeDevice {
    type Handle = FakeHandle;

    fn location(&self) -> String {
        format!(
            "fake device {:04x}:{:04x}",
            self.identity.vendor_id, self.identity.product_id
        )
    }

    fn identity(&self) -> Result<DeviceIdentity, rusb::Error> {
        match self.identity_error {
            Some(error) => Err(error),
            None => Ok(self.identity),
        }
    }

    fn active_configuration(&self) -> Result<Configuration, rusb::Error> {
        self.configuration.clone()
    }

    fn open_handle(&self) -> Result<Self::Handle, rusb::Error> {
        if let Some(error) = self.open_error {
            return Err(error);
        }

        self.ledger.opened.set(self.ledger.opened() + 1);
        Ok(FakeHandle {
            device: self.clone(),
        })
    }
}

/// An open [`FakeDevice`]. Closing is recorded in the device's ledger.
#[derive(Debug)]
pub struct FakeHandle {
    device: FakeDevice,
}

impl UsbDeviceHandle for FakeHandle {
    fn read_ascii_string(&self, index: u8) -> Result<String, rusb::Error> {
        self.device.reads.borrow_mut().push(index);

        self.device
            .strings
            .get(&index)
            .cloned()
            .unwrap_or(Err(rusb::Error::InvalidParam))
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        let closed = &self.device.ledger.closed;
        closed.set(closed.get() + 1);
    }
}

/// A fake host stack reporting a fixed list of devices.
#[derive(Debug, Default, Clone)]
pub struct FakeHost {
    devices: Vec<FakeDevice>,
    error: Option<rusb::Error>,
}

impl FakeHost {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            error: None,
        }
    }

    /// A host whose device enumeration fails.
    pub fn failing(error: rusb::Error) -> Self {
        Self {
            devices: vec![],
            error: Some(error),
        }
    }
}

impl UsbHost for FakeHost {
    type Device = FakeDevice;

    fn devices(&self) -> Result<Vec<Self::Device>, rusb::Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.devices.clone()),
        }
    }
}
