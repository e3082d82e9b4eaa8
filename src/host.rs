//! The USB host operations the programming tool depends on.
//!
//! [`crate::usb::RusbHost`] implements these on top of libusb; tests use an
//! in-memory fake.

use rusb::Direction;
use std::fmt;

/// Physical location of a device on the bus.
///
/// This is the only identity the tool has for a printer. It is not stable
/// across re-enumeration: a rebooted printer may come back at a new address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbPath {
    pub bus: u8,
    pub address: u8,
    pub port: u8,
}

impl UsbPath {
    pub fn new(bus: u8, address: u8, port: u8) -> Self {
        UsbPath { bus, address, port }
    }
}

impl fmt::Display for UsbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bus, self.address, self.port)
    }
}

/// Descriptor fields that are available without talking to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: UsbPath,
}

/// One endpoint of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub number: u8,
    pub address: u8,
    pub direction: Direction,
}

/// An interface claimed through [`HostDevice::claim_default_interface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedInterface {
    pub number: u8,
    /// Endpoints in descriptor order.
    pub endpoints: Vec<Endpoint>,
}

/// Enumerates and opens devices.
pub trait UsbHost {
    type Device: HostDevice;

    /// Opens every attached device whose bus info satisfies `predicate`.
    fn open_matching(
        &self,
        predicate: &mut dyn FnMut(&BusInfo) -> bool,
    ) -> rusb::Result<Vec<Self::Device>>;
}

/// An opened device. Dropping it closes the handle.
pub trait HostDevice {
    fn bus_info(&self) -> BusInfo;

    fn manufacturer(&self) -> rusb::Result<String>;

    fn product_name(&self) -> rusb::Result<String>;

    fn serial_number(&self) -> rusb::Result<String>;

    /// Human readable link speed.
    fn speed(&self) -> String;

    /// Short human readable description of the device.
    fn description(&self) -> String {
        let info = self.bus_info();
        format!(
            "vid={:04x},pid={:04x},bus={},addr={},port={}",
            info.vendor_id, info.product_id, info.path.bus, info.path.address, info.path.port
        )
    }

    /// Claims interface 0 of the active configuration.
    fn claim_default_interface(&mut self) -> rusb::Result<ClaimedInterface>;

    /// Writes all of `data` to the endpoint at `endpoint_address`.
    fn write(&mut self, endpoint_address: u8, data: &[u8]) -> rusb::Result<()>;

    /// Releases a claimed interface. Releasing twice is harmless.
    fn release_interface(&mut self, number: u8);
}
