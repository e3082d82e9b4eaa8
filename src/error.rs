use crate::host::UsbPath;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not discover devices: {0}")]
    DiscoveryFailed(#[source] rusb::Error),
    #[error("USB-ID [{0}] is invalid")]
    InvalidIdentifier(String),
    #[error("device already had USB-ID [{0}] set")]
    AlreadySet(String),
    #[error("device {0} has gone away")]
    DeviceGone(UsbPath),
    #[error("multiple ({count}) devices found that match path {path}")]
    AmbiguousTarget { path: UsbPath, count: usize },
    #[error("failed to claim the default interface of {path}: {source}")]
    InterfaceClaimFailed {
        path: UsbPath,
        #[source]
        source: rusb::Error,
    },
    #[error("no output endpoint on the default interface of {0}")]
    NoOutEndpoint(UsbPath),
    #[error("failed to write to {path}: {source}")]
    TransmitFailed {
        path: UsbPath,
        #[source]
        source: rusb::Error,
    },
    #[error("due an unknown usb error: {0}")]
    Usb(#[from] rusb::Error),
}

impl Error {
    /// Whether this is the "identifier already set" guard rather than a failure.
    pub fn is_already_set(&self) -> bool {
        matches!(self, Error::AlreadySet(_))
    }
}
