//! Discovery of Star printers on the bus.

use crate::{
    error::{Error, Result},
    host::{BusInfo, HostDevice, UsbHost, UsbPath},
    STAR_VENDOR_ID,
};

/// Snapshot of one printer taken at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: String,
    pub product_name: String,
    /// Current USB-ID; empty when the printer has none.
    pub serial_number: String,
    pub description: String,
    pub path: UsbPath,
    pub speed: String,
}

impl DeviceDescriptor {
    fn read<D: HostDevice>(device: &D) -> Self {
        let info = device.bus_info();
        DeviceDescriptor {
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            manufacturer: or_empty(device.manufacturer(), "manufacturer", info.path),
            product_name: or_empty(device.product_name(), "product", info.path),
            serial_number: or_empty(device.serial_number(), "serial number", info.path),
            description: device.description(),
            path: info.path,
            speed: device.speed(),
        }
    }

    pub fn has_serial_number(&self) -> bool {
        !self.serial_number.is_empty()
    }

    /// Whether `target` selects this device. No target selects everything.
    pub fn is_selected_by(&self, target: Option<UsbPath>) -> bool {
        target.map_or(true, |path| path == self.path)
    }
}

fn or_empty(field: rusb::Result<String>, name: &str, path: UsbPath) -> String {
    field.unwrap_or_else(|err| {
        log::debug!("could not read {} of {}: {}", name, path, err);
        String::new()
    })
}

/// Printers in discovery order.
///
/// Indices are only for display. Nothing here guarantees two entries have
/// different paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceRegistry {
    /// Takes a snapshot of every attached device with the Star vendor ID.
    ///
    /// Only a failing enumeration is an error; unreadable string descriptors
    /// are left empty.
    pub fn discover<H: UsbHost>(host: &H) -> Result<Self> {
        let devices = host
            .open_matching(&mut |info: &BusInfo| info.vendor_id == STAR_VENDOR_ID)
            .map_err(Error::DiscoveryFailed)?;

        let devices = devices.iter().map(DeviceDescriptor::read).collect();
        Ok(DeviceRegistry { devices })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeviceDescriptor> {
        self.devices.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceDescriptor> {
        self.devices.iter()
    }
}
