//! GU-7000 VFD Hardware Library
//!
//! Drives Noritake GU-7000 series vacuum fluorescent display modules over
//! their 8-bit parallel interface, and converts XBM images into the module's
//! bit image layout.
//!
//! The GPIO backend is pluggable through [`gpio::Gpio`]; [`SimulatedDisplay`]
//! records the byte stream for testing without hardware.

pub mod bitmap;
pub mod error;
pub mod gpio;
pub mod vfd;

pub use bitmap::{NativeBitmap, SourceBitmap};
pub use error::{Error, Result, SourceFileError};
pub use gpio::{Gpio, PinId, PinRole, PinSet, SimulatedDisplay};
pub use vfd::{AutoScrollMode, BusOptions, BusyWait, CancelToken, OverlayMode, Vfd};

