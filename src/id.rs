//! USB-ID strings as accepted by Star printer firmware.

use crate::error::{Error, Result};
use rand::Rng;
use std::fmt;

/// Characters allowed in a USB-ID.
pub const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maximum length of a USB-ID.
pub const MAX_LENGTH: usize = 8;

/// What the printer is sent when an empty USB-ID is requested.
pub const PLACEHOLDER: &str = "????????";

/// A USB-ID that passed validation and can be written to a printer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validates `raw`.
    ///
    /// An empty string is accepted and becomes [`PLACEHOLDER`]. Anything longer
    /// than [`MAX_LENGTH`] or containing a character other than `0-9` and
    /// `A-Z` is rejected, lowercase included.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Identifier(PLACEHOLDER.to_owned()));
        }
        if raw.len() > MAX_LENGTH {
            return Err(Error::InvalidIdentifier(raw.to_owned()));
        }
        if !raw.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()) {
            return Err(Error::InvalidIdentifier(raw.to_owned()));
        }
        Ok(Identifier(raw.to_owned()))
    }

    /// Draws [`MAX_LENGTH`] characters uniformly from [`ALPHABET`].
    ///
    /// Not suitable for anything security related.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..MAX_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Identifier(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
