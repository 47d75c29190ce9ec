//! Error types for the GU-7000 VFD driver.

use crate::gpio::PinRole;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when encoding, converting or transmitting.
#[derive(Error, Debug)]
pub enum Error {
    /// Numeric parameter outside its closed hardware range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    Range {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Value is not a member of a closed set.
    #[error("Invalid {field}: {value}")]
    InvalidEnum { field: &'static str, value: String },

    /// Mutually exclusive parameters were supplied together.
    #[error("Invalid parameter combination: {0}")]
    InvalidCombination(&'static str),

    /// Bitmap dimensions and data do not agree.
    #[error("Malformed bitmap: {0}")]
    MalformedBitmap(String),

    /// XBM source text could not be parsed or validated.
    #[error("Malformed XBM source: {0}")]
    MalformedSourceFile(#[from] SourceFileError),

    /// A required pin role has no binding.
    #[error("Pin {0} is not bound")]
    MissingPinBinding(PinRole),

    /// A binding names a role the bus does not have.
    #[error("Unknown pin role: {0}")]
    UnknownPinRole(String),

    /// The same physical pin is bound to two roles.
    #[error("Pin {pin} bound to both {first} and {second}")]
    DuplicatePin {
        pin: u32,
        first: PinRole,
        second: PinRole,
    },

    /// The busy line stayed asserted past the session deadline before a
    /// command started. Nothing of that command was sent.
    #[error("Display busy for longer than {waited:?}")]
    BusyTimeout { waited: Duration },

    /// The busy wait before a command was cancelled by the caller. Nothing
    /// of that command was sent.
    #[error("Transfer cancelled while waiting for the display")]
    Cancelled,

    /// The GPIO backend failed.
    #[error("GPIO error: {0}")]
    Gpio(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn range(field: &'static str, value: impl Into<i64>, min: i64, max: i64) -> Self {
        Error::Range {
            field,
            value: value.into(),
            min,
            max,
        }
    }

    pub(crate) fn gpio<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Gpio(Box::new(err))
    }
}

/// Structural problems in an XBM source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFileError {
    /// Fewer lines than the three header lines plus data.
    #[error("file is too short ({0} lines)")]
    TooShort(usize),

    /// First line is not a `#define <name>_width` directive.
    #[error("cannot find image width")]
    MissingWidth,

    /// Width token is not an integer in 1-65535.
    #[error("bad image width \"{0}\"")]
    InvalidWidth(String),

    /// Second line is not a `#define <name>_height` directive.
    #[error("cannot find image height")]
    MissingHeight,

    /// Height token is not an integer in 1-65535.
    #[error("bad image height \"{0}\"")]
    InvalidHeight(String),

    /// Third line is not the `static char <name>_bits[] = {` marker.
    #[error("cannot find image data")]
    MissingDataMarker,

    /// Data does not end with `};`.
    #[error("image data is not terminated (cropped file?)")]
    MissingTerminator,

    /// Number of data bytes does not match the declared dimensions.
    #[error("image data length incorrect: expected {expected} bytes, got {actual}")]
    ByteCount { expected: usize, actual: usize },

    /// A data token is not a number.
    #[error("unparsable image data value \"{token}\" at index {index}")]
    InvalidByte { index: usize, token: String },

    /// A data value does not fit in a byte.
    #[error("image data value {value} at index {index} is outside 0-255")]
    ByteOutOfRange { index: usize, value: u64 },
}
