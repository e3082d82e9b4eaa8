//! `star-usbid` finds Star Micronics receipt printers on USB and programs
//! the USB-ID (the serial number string the printer reports on the bus).
//!
//! Programming a printer happens in these stages:
//! 1. [`DeviceRegistry::discover`] takes a snapshot of every device with
//! the Star vendor ID.
//! 2. [`select::run`] walks the snapshot and picks the USB-ID for every
//! printer selected by a [`select::Plan`].
//! 3. [`Programmer`] writes the vendor command frames that store the USB-ID.
//! The new USB-ID is only reported after the printer is power cycled.
//!
//! The bus itself is reached through the [`host::UsbHost`] trait;
//! [`usb::RusbHost`] implements it with libusb.

pub use rusb;

pub mod error;
pub mod host;
pub mod id;
pub mod protocol;
pub mod registry;
pub mod select;
pub mod usb;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use host::UsbPath;
pub use id::Identifier;
pub use protocol::Programmer;
pub use registry::{DeviceDescriptor, DeviceRegistry};

/// USB vendor ID of Star Micronics.
pub const STAR_VENDOR_ID: u16 = 0x0519;
