//! Vendor command sequence that stores a new USB-ID in a Star printer.
//!
//! Programming a printer consists of:
//! 1. Opening the device at a known bus path again. Exactly one device must
//! be found there.
//! 2. Claiming the default interface and picking its output endpoint.
//! 3. Writing the USB-ID frame followed by two commit frames, with a settle
//! delay after the first two writes so the firmware can keep up.
//! 4. Optionally printing a slip that asks for a reboot.
//!
//! The sequence is not transactional. If a later write fails the printer may
//! already hold the new USB-ID without it being committed.

use crate::{
    error::{Error, Result},
    host::{BusInfo, ClaimedInterface, HostDevice, UsbHost, UsbPath},
    id::Identifier,
    registry::DeviceDescriptor,
};
use bytes::{BufMut, Bytes, BytesMut};
use rusb::Direction;
use std::{thread, time::Duration};

/// Precedes the USB-ID in the first frame.
pub const ID_PREFIX: &[u8] = b"\x1b\x23\x23\x57\x38\x2c";
/// Terminates the first frame.
pub const ID_POSTFIX: &[u8] = b"\x0a\x00";
/// First half of the commit command.
pub const COMMIT_PART1: &[u8] = b"\x1b\x1d\x23\x2b\x43\x30\x30\x30\x32\x0a\x00\x1b\x1d\x23\x54\x30";
/// Second half of the commit command.
pub const COMMIT_PART2: &[u8] = b"\x30\x30\x30\x30\x0a\x00";
/// Sounds the buzzer once.
pub const BEEP: &[u8] = b"\x1b\x61\x01";
/// Full paper cut.
pub const FULL_CUT: &[u8] = b"\x1b\x64\x32";

const REBOOT_TEXT: &str = "Please reboot me, my new USBID = ";
const BEEP_COUNT: usize = 5;

/// Time the firmware needs after each of the first two frames.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);
/// Wait before printing the reboot slip so the commit can finish.
pub const REBOOT_PROMPT_DELAY: Duration = Duration::from_secs(5);

/// Blocks the programming sequence for a fixed amount of time.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// [`Delay`] that puts the current thread to sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Builds the frame that carries the USB-ID.
pub fn id_frame(id: &Identifier) -> Bytes {
    let mut frame =
        BytesMut::with_capacity(ID_PREFIX.len() + id.as_bytes().len() + ID_POSTFIX.len());
    frame.put_slice(ID_PREFIX);
    frame.put_slice(id.as_bytes());
    frame.put_slice(ID_POSTFIX);
    frame.freeze()
}

/// Builds the human readable part of the reboot slip.
pub fn reboot_text(id: &Identifier) -> Bytes {
    let mut text = BytesMut::new();
    text.put_slice(REBOOT_TEXT.as_bytes());
    text.put_slice(id.as_bytes());
    text.freeze()
}

/// Builds the beeps and paper cut that close the reboot slip.
pub fn reboot_trailer() -> Bytes {
    let mut trailer = BytesMut::with_capacity(BEEP.len() * BEEP_COUNT + FULL_CUT.len());
    for _ in 0..BEEP_COUNT {
        trailer.put_slice(BEEP);
    }
    trailer.put_slice(FULL_CUT);
    trailer.freeze()
}

/// The endpoint frames are written to: the last output endpoint listed.
fn out_endpoint(interface: &ClaimedInterface) -> Option<u8> {
    interface
        .endpoints
        .iter()
        .rev()
        .find(|ep| ep.direction == Direction::Out)
        .map(|ep| ep.address)
}

/// Turns `candidate` into the USB-ID to write to `device`.
///
/// Refuses a candidate equal to the current USB-ID before validating it, so an
/// empty candidate is refused for a device without a USB-ID.
pub fn check_candidate(device: &DeviceDescriptor, candidate: &str) -> Result<Identifier> {
    if device.serial_number == candidate {
        return Err(Error::AlreadySet(candidate.to_owned()));
    }
    Identifier::parse(candidate)
}

/// Writes USB-IDs to printers reachable through a [`UsbHost`].
pub struct Programmer<H, D = ThreadDelay> {
    host: H,
    delay: D,
}

impl<H: UsbHost> Programmer<H> {
    pub fn new(host: H) -> Self {
        Programmer::with_delay(host, ThreadDelay)
    }
}

impl<H: UsbHost, D: Delay> Programmer<H, D> {
    pub fn with_delay(host: H, delay: D) -> Self {
        Programmer { host, delay }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Programs `candidate` into `device` unless it already carries it.
    /// See [`check_candidate`].
    pub fn set_identifier(
        &mut self,
        device: &DeviceDescriptor,
        candidate: &str,
        reboot_prompt: bool,
    ) -> Result<Identifier> {
        let id = check_candidate(device, candidate)?;
        self.send(device.path, &id, reboot_prompt)?;
        Ok(id)
    }

    /// Runs the full programming sequence against the device at `path`.
    ///
    /// Every device handle opened here is closed, and the claimed interface
    /// released, before this returns.
    pub fn send(&mut self, path: UsbPath, id: &Identifier, reboot_prompt: bool) -> Result<()> {
        let mut devices = self.host.open_matching(&mut |info: &BusInfo| info.path == path)?;

        match devices.len() {
            0 => return Err(Error::DeviceGone(path)),
            1 => {}
            count => return Err(Error::AmbiguousTarget { path, count }),
        }
        let device = &mut devices[0];

        let interface = device
            .claim_default_interface()
            .map_err(|source| Error::InterfaceClaimFailed { path, source })?;

        let result = match out_endpoint(&interface) {
            Some(endpoint) => self.transmit(device, path, endpoint, id, reboot_prompt),
            None => Err(Error::NoOutEndpoint(path)),
        };

        device.release_interface(interface.number);
        result
    }

    fn transmit<T: HostDevice>(
        &mut self,
        device: &mut T,
        path: UsbPath,
        endpoint: u8,
        id: &Identifier,
        reboot_prompt: bool,
    ) -> Result<()> {
        let mut write = |data: &[u8]| {
            log::debug!("{} <- {:02x?}", path, data);
            device
                .write(endpoint, data)
                .map_err(|source| Error::TransmitFailed { path, source })
        };

        write(&id_frame(id)[..])?;
        self.delay.delay(SETTLE_DELAY);
        write(COMMIT_PART1)?;
        self.delay.delay(SETTLE_DELAY);
        write(COMMIT_PART2)?;

        if reboot_prompt {
            log::info!("printing reboot message on {}", path);
            self.delay.delay(REBOOT_PROMPT_DELAY);
            write(&reboot_text(id)[..])?;
            write(&reboot_trailer()[..])?;
        }

        Ok(())
    }
}
