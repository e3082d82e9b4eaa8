//! In-memory USB host for unit tests.

use crate::{
    host::{BusInfo, ClaimedInterface, Endpoint, HostDevice, UsbHost, UsbPath},
    protocol::Delay,
    registry::DeviceDescriptor,
    STAR_VENDOR_ID,
};
use rusb::Direction;
use std::{cell::RefCell, rc::Rc, time::Duration};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Write {
    pub path: UsbPath,
    pub endpoint: u8,
    pub data: Vec<u8>,
}

/// Everything the fake host observed.
#[derive(Debug, Clone, Default)]
pub(crate) struct HostLog {
    pub writes: Vec<Write>,
    pub claimed: Vec<UsbPath>,
    pub released: Vec<UsbPath>,
    pub closed: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeDevice {
    info: BusInfo,
    serial_number: String,
    strings_readable: bool,
    endpoints: Vec<Endpoint>,
    claim_error: Option<rusb::Error>,
    write_error: Option<(usize, rusb::Error)>,
}

impl FakeDevice {
    pub fn star(path: UsbPath, serial_number: &str) -> Self {
        FakeDevice {
            info: BusInfo {
                vendor_id: STAR_VENDOR_ID,
                product_id: 0x0003,
                path,
            },
            serial_number: serial_number.to_owned(),
            strings_readable: true,
            endpoints: vec![
                Endpoint {
                    number: 1,
                    address: 0x81,
                    direction: Direction::In,
                },
                Endpoint {
                    number: 2,
                    address: 0x02,
                    direction: Direction::Out,
                },
            ],
            claim_error: None,
            write_error: None,
        }
    }

    pub fn vendor(mut self, vendor_id: u16) -> Self {
        self.info.vendor_id = vendor_id;
        self
    }

    pub fn unreadable_strings(mut self) -> Self {
        self.strings_readable = false;
        self
    }

    pub fn endpoints(mut self, endpoints: &[(u8, Direction)]) -> Self {
        self.endpoints = endpoints
            .iter()
            .map(|&(address, direction)| Endpoint {
                number: address & 0x0f,
                address,
                direction,
            })
            .collect();
        self
    }

    pub fn failing_claim(mut self, error: rusb::Error) -> Self {
        self.claim_error = Some(error);
        self
    }

    /// Makes the write with index `nth` (counting from zero) fail.
    pub fn failing_write(mut self, nth: usize, error: rusb::Error) -> Self {
        self.write_error = Some((nth, error));
        self
    }
}

pub(crate) struct FakeHost {
    devices: Vec<FakeDevice>,
    enumeration_error: Option<rusb::Error>,
    log: Rc<RefCell<HostLog>>,
}

impl FakeHost {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        FakeHost {
            devices,
            enumeration_error: None,
            log: Rc::default(),
        }
    }

    pub fn failing_enumeration(mut self, error: rusb::Error) -> Self {
        self.enumeration_error = Some(error);
        self
    }

    pub fn log(&self) -> HostLog {
        self.log.borrow().clone()
    }

    /// The descriptor discovery would produce for device `index`.
    pub fn descriptor(&self, index: usize) -> DeviceDescriptor {
        let device = &self.devices[index];
        DeviceDescriptor {
            vendor_id: device.info.vendor_id,
            product_id: device.info.product_id,
            manufacturer: "STAR".into(),
            product_name: "TSP143IIIU".into(),
            serial_number: device.serial_number.clone(),
            description: String::new(),
            path: device.info.path,
            speed: "Full 12Mbit/s".into(),
        }
    }
}

impl UsbHost for FakeHost {
    type Device = OpenFakeDevice;

    fn open_matching(
        &self,
        predicate: &mut dyn FnMut(&BusInfo) -> bool,
    ) -> rusb::Result<Vec<OpenFakeDevice>> {
        if let Some(err) = self.enumeration_error {
            return Err(err);
        }
        Ok(self
            .devices
            .iter()
            .filter(|d| predicate(&d.info))
            .map(|d| OpenFakeDevice {
                device: d.clone(),
                writes: 0,
                log: Rc::clone(&self.log),
            })
            .collect())
    }
}

pub(crate) struct OpenFakeDevice {
    device: FakeDevice,
    writes: usize,
    log: Rc<RefCell<HostLog>>,
}

impl OpenFakeDevice {
    fn string(&self, value: &str) -> rusb::Result<String> {
        if self.device.strings_readable {
            Ok(value.to_owned())
        } else {
            Err(rusb::Error::Io)
        }
    }
}

impl HostDevice for OpenFakeDevice {
    fn bus_info(&self) -> BusInfo {
        self.device.info
    }

    fn manufacturer(&self) -> rusb::Result<String> {
        self.string("STAR")
    }

    fn product_name(&self) -> rusb::Result<String> {
        self.string("TSP143IIIU")
    }

    fn serial_number(&self) -> rusb::Result<String> {
        self.string(&self.device.serial_number)
    }

    fn speed(&self) -> String {
        "Full 12Mbit/s".into()
    }

    fn claim_default_interface(&mut self) -> rusb::Result<ClaimedInterface> {
        if let Some(err) = self.device.claim_error {
            return Err(err);
        }
        self.log.borrow_mut().claimed.push(self.device.info.path);
        Ok(ClaimedInterface {
            number: 0,
            endpoints: self.device.endpoints.clone(),
        })
    }

    fn write(&mut self, endpoint_address: u8, data: &[u8]) -> rusb::Result<()> {
        let nth = self.writes;
        self.writes += 1;
        match self.device.write_error {
            Some((failing, err)) if failing == nth => Err(err),
            _ => {
                self.log.borrow_mut().writes.push(Write {
                    path: self.device.info.path,
                    endpoint: endpoint_address,
                    data: data.to_vec(),
                });
                Ok(())
            }
        }
    }

    fn release_interface(&mut self, _number: u8) {
        self.log.borrow_mut().released.push(self.device.info.path);
    }
}

impl Drop for OpenFakeDevice {
    fn drop(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

/// Records delays instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub delays: Vec<Duration>,
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}
