//! VFD module.
//!
//! Drives a GU-7000 series vacuum fluorescent display over its 8-bit
//! parallel interface.

mod bus;
mod device;

pub mod params;
pub mod protocol;

pub use bus::{BusOptions, BusyWait, CancelToken, ParallelBus};
pub use device::Vfd;
pub use params::{AutoScrollMode, OverlayMode};
pub use protocol::Command;
