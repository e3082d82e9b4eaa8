//! USB host backed by libusb through `rusb`.

use crate::host::{BusInfo, ClaimedInterface, Endpoint, HostDevice, UsbHost, UsbPath};
use rusb::{DeviceHandle, GlobalContext, Result, Speed};
use std::time::Duration;

/// Timeout of a single bulk write.
const WRITE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Number of the interface the printer accepts commands on.
const DEFAULT_INTERFACE: u8 = 0;

/// The system's USB bus, accessed through the global libusb context.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusbHost;

impl UsbHost for RusbHost {
    type Device = RusbDevice;

    fn open_matching(
        &self,
        predicate: &mut dyn FnMut(&BusInfo) -> bool,
    ) -> Result<Vec<RusbDevice>> {
        let mut opened = Vec::new();

        for device in rusb::devices()?.iter() {
            let descriptor = device.device_descriptor()?;
            let info = BusInfo {
                vendor_id: descriptor.vendor_id(),
                product_id: descriptor.product_id(),
                path: UsbPath::new(device.bus_number(), device.address(), device.port_number()),
            };

            if predicate(&info) {
                opened.push(RusbDevice {
                    handle: device.open()?,
                    descriptor,
                    info,
                });
            }
        }

        Ok(opened)
    }
}

/// An open libusb device handle. The handle is closed on drop.
pub struct RusbDevice {
    handle: DeviceHandle<GlobalContext>,
    descriptor: rusb::DeviceDescriptor,
    info: BusInfo,
}

impl HostDevice for RusbDevice {
    fn bus_info(&self) -> BusInfo {
        self.info
    }

    fn manufacturer(&self) -> Result<String> {
        self.handle.read_manufacturer_string_ascii(&self.descriptor)
    }

    fn product_name(&self) -> Result<String> {
        self.handle.read_product_string_ascii(&self.descriptor)
    }

    fn serial_number(&self) -> Result<String> {
        self.handle.read_serial_number_string_ascii(&self.descriptor)
    }

    fn speed(&self) -> String {
        speed_label(self.handle.device().speed()).to_owned()
    }

    fn claim_default_interface(&mut self) -> Result<ClaimedInterface> {
        // Printers are usually bound to usblp; not supported on every platform.
        if let Err(err) = self.handle.set_auto_detach_kernel_driver(true) {
            log::debug!("kernel driver auto-detach unavailable: {}", err);
        }
        self.handle.claim_interface(DEFAULT_INTERFACE)?;

        let config = match self.handle.device().active_config_descriptor() {
            Ok(config) => config,
            Err(err) => {
                self.release_interface(DEFAULT_INTERFACE);
                return Err(err);
            }
        };

        let mut endpoints = Vec::new();
        if let Some(interface) = config
            .interfaces()
            .find(|interface| interface.number() == DEFAULT_INTERFACE)
        {
            if let Some(setting) = interface.descriptors().next() {
                endpoints.extend(setting.endpoint_descriptors().map(|ep| Endpoint {
                    number: ep.number(),
                    address: ep.address(),
                    direction: ep.direction(),
                }));
            }
        }

        Ok(ClaimedInterface {
            number: DEFAULT_INTERFACE,
            endpoints,
        })
    }

    fn write(&mut self, endpoint_address: u8, data: &[u8]) -> Result<()> {
        let written = self.handle.write_bulk(endpoint_address, data, WRITE_TIMEOUT)?;
        if written != data.len() {
            log::warn!(
                "short write to {}: {} of {} bytes",
                self.info.path,
                written,
                data.len()
            );
            return Err(rusb::Error::Io);
        }
        Ok(())
    }

    fn release_interface(&mut self, number: u8) {
        if let Err(err) = self.handle.release_interface(number) {
            log::debug!("releasing interface {} of {}: {}", number, self.info.path, err);
        }
    }
}

fn speed_label(speed: Speed) -> &'static str {
    match speed {
        Speed::Low => "Low 1.5Mbit/s",
        Speed::Full => "Full 12Mbit/s",
        Speed::High => "High 480Mbit/s",
        Speed::Super => "Super 5Gbit/s",
        _ => "unknown",
    }
}
