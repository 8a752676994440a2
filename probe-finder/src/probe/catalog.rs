//! The catalog of debug probes known by their USB vendor and product id.

use super::{Classification, ProbeType, SerialPolicy};

/// Vendor id of the Black Magic Probe (OpenMoko).
pub const VENDOR_ID_BMP: u16 = 0x1d50;
/// Product id of the Black Magic Probe.
pub const PRODUCT_ID_BMP: u16 = 0x6018;

/// Vendor id of ST-Link probes (STMicroelectronics).
pub const VENDOR_ID_STLINK: u16 = 0x0483;
/// ST-Link V2.
pub const PRODUCT_ID_STLINKV2: u16 = 0x3748;
/// ST-Link V2-1.
pub const PRODUCT_ID_STLINKV21: u16 = 0x374b;
/// ST-Link V2-1 with mass storage.
pub const PRODUCT_ID_STLINKV21_MSD: u16 = 0x3752;
/// ST-Link V3 without mass storage.
pub const PRODUCT_ID_STLINKV3_NO_MSD: u16 = 0x3754;
/// ST-Link V3.
pub const PRODUCT_ID_STLINKV3: u16 = 0x374f;
/// ST-Link V3E.
pub const PRODUCT_ID_STLINKV3E: u16 = 0x374e;

/// Vendor id of Segger J-Link probes.
pub const VENDOR_ID_SEGGER: u16 = 0x1366;

/// Vendor id of FTDI.
pub const VENDOR_ID_FTDI: u16 = 0x0403;
/// FT2232.
pub const PRODUCT_ID_FTDI_FT2232: u16 = 0x6010;
/// FT4232.
pub const PRODUCT_ID_FTDI_FT4232: u16 = 0x6011;
/// FT232.
pub const PRODUCT_ID_FTDI_FT232: u16 = 0x6001;

/// The product id part of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductId {
    /// Matches exactly this product id.
    Exact(u16),
    /// Matches every product of the vendor.
    Any,
}

impl ProductId {
    fn matches(self, product_id: u16) -> bool {
        match self {
            ProductId::Exact(pid) => pid == product_id,
            ProductId::Any => true,
        }
    }
}

/// One known probe model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id, or [`ProductId::Any`].
    pub product_id: ProductId,
    /// Kind of probe.
    pub probe_type: ProbeType,
    /// Label shown to the user.
    pub label: &'static str,
    /// How to obtain the serial number.
    pub serial_policy: SerialPolicy,
}

impl CatalogEntry {
    const fn new(
        vendor_id: u16,
        product_id: ProductId,
        probe_type: ProbeType,
        label: &'static str,
    ) -> Self {
        Self {
            vendor_id,
            product_id,
            probe_type,
            label,
            serial_policy: SerialPolicy::ReadFromDevice,
        }
    }

    const fn with_placeholder_serial(self) -> Self {
        Self {
            serial_policy: SerialPolicy::Placeholder,
            ..self
        }
    }

    /// Returns true if this entry describes the given vendor and product id.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id.matches(product_id)
    }

    /// The classification of a device matching this entry.
    pub fn classification(&self) -> Classification {
        Classification {
            probe_type: self.probe_type,
            label: self.label.to_owned(),
            serial_policy: self.serial_policy,
        }
    }
}

/// All probes known by their ids.
///
/// Lookup is first match wins, so specific entries go before wildcard ones.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new(
        VENDOR_ID_BMP,
        ProductId::Exact(PRODUCT_ID_BMP),
        ProbeType::BlackMagic,
        "Black Magic Probe",
    ),
    // The serial number descriptor of the V2 does not hold a printable serial.
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV2),
        ProbeType::StLink,
        "STLink V2",
    )
    .with_placeholder_serial(),
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV21),
        ProbeType::StLink,
        "STLink V21",
    ),
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV21_MSD),
        ProbeType::StLink,
        "STLink V21 MSD",
    ),
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV3_NO_MSD),
        ProbeType::StLink,
        "STLink V3 No MSD",
    ),
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV3),
        ProbeType::StLink,
        "STLink V3",
    ),
    CatalogEntry::new(
        VENDOR_ID_STLINK,
        ProductId::Exact(PRODUCT_ID_STLINKV3E),
        ProbeType::StLink,
        "STLink V3E",
    ),
    CatalogEntry::new(
        VENDOR_ID_SEGGER,
        ProductId::Any,
        ProbeType::JLink,
        "Segger JLink",
    ),
    CatalogEntry::new(
        VENDOR_ID_FTDI,
        ProductId::Exact(PRODUCT_ID_FTDI_FT2232),
        ProbeType::Ftdi,
        "FTDI FT2232",
    ),
    CatalogEntry::new(
        VENDOR_ID_FTDI,
        ProductId::Exact(PRODUCT_ID_FTDI_FT4232),
        ProbeType::Ftdi,
        "FTDI FT4232",
    ),
    CatalogEntry::new(
        VENDOR_ID_FTDI,
        ProductId::Exact(PRODUCT_ID_FTDI_FT232),
        ProbeType::Ftdi,
        "FTDI FT232",
    ),
];

/// Looks up a device in the built-in [`CATALOG`].
pub fn lookup(vendor_id: u16, product_id: u16) -> Option<&'static CatalogEntry> {
    lookup_in(CATALOG, vendor_id, product_id)
}

/// Looks up a device in the given entries, returning the first match.
pub fn lookup_in(
    entries: &[CatalogEntry],
    vendor_id: u16,
    product_id: u16,
) -> Option<&CatalogEntry> {
    entries
        .iter()
        .find(|entry| entry.matches(vendor_id, product_id))
}

/// Classifies a device by its ids alone.
///
/// Returns `None` if the device is not in the catalog, in which case it may
/// still be a CMSIS-DAP probe.
pub fn identify(vendor_id: u16, product_id: u16) -> Option<Classification> {
    let entry = lookup(vendor_id, product_id)?;

    tracing::debug!(
        "{:04x}:{:04x} is a known {} ({})",
        vendor_id,
        product_id,
        entry.probe_type,
        entry.label
    );

    Some(entry.classification())
}
