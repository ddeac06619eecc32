use tracing::debug;

use crate::error::{Result, TransportError};

/// USB vendor id reported by the printers' serial bridge.
pub const NIIMBOT_VENDOR_ID: u16 = 0x3513;

/// USB product id shared by the supported models.
pub const NIIMBOT_PRODUCT_ID: u16 = 0x0002;

/// USB manufacturer string reported outside Windows.
pub const NIIMBOT_MANUFACTURER: &str = "NIIMBOT";

/// One enumerated serial port, reduced to the fields discovery looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortCandidate {
    pub port_name: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub manufacturer: Option<String>,
}

impl PortCandidate {
    /// A port with no USB metadata.
    pub fn named(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }

    /// A USB port with vendor/product ids and an optional manufacturer string.
    pub fn usb(
        port_name: impl Into<String>,
        vid: u16,
        pid: u16,
        manufacturer: Option<&str>,
    ) -> Self {
        Self {
            port_name: port_name.into(),
            vid: Some(vid),
            pid: Some(pid),
            manufacturer: manufacturer.map(str::to_owned),
        }
    }
}

/// How to recognise a printer among enumerated ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Match on USB vendor and product id.
    VendorProduct { vid: u16, pid: u16 },
    /// Match on USB manufacturer string and product id.
    ManufacturerProduct { manufacturer: String, pid: u16 },
}

impl DeviceFilter {
    /// The filter for the current platform.
    ///
    /// Windows drivers do not surface the manufacturer string reliably, so
    /// ids are used there; elsewhere the manufacturer string is.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::VendorProduct {
                vid: NIIMBOT_VENDOR_ID,
                pid: NIIMBOT_PRODUCT_ID,
            }
        } else {
            Self::ManufacturerProduct {
                manufacturer: NIIMBOT_MANUFACTURER.to_owned(),
                pid: NIIMBOT_PRODUCT_ID,
            }
        }
    }

    pub fn matches(&self, port: &PortCandidate) -> bool {
        match self {
            Self::VendorProduct { vid, pid } => port.vid == Some(*vid) && port.pid == Some(*pid),
            Self::ManufacturerProduct { manufacturer, pid } => {
                port.manufacturer.as_deref() == Some(manufacturer.as_str())
                    && port.pid == Some(*pid)
            }
        }
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Pick the port to open from an enumerated list.
///
/// An explicit `address` must name one of the enumerated ports; it is not
/// checked against the filter. Without an address the first port accepted by
/// `filter` wins.
pub fn select_port(
    candidates: &[PortCandidate],
    address: Option<&str>,
    filter: &DeviceFilter,
) -> Result<PortCandidate> {
    let found = match address {
        Some(address) => candidates.iter().find(|port| port.port_name == address),
        None => candidates.iter().find(|port| filter.matches(port)),
    };

    match found {
        Some(port) => {
            debug!(port = %port.port_name, "selected printer port");
            Ok(port.clone())
        }
        None => Err(TransportError::NotFound {
            address: address.unwrap_or("(auto detected)").to_owned(),
        }),
    }
}
