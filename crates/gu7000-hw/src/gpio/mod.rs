//! GPIO collaborator interface.
//!
//! The driver never touches hardware directly. Anything that can configure,
//! read and write a numbered pin (a GPIO expander, a USB GPIO board, a
//! simulator) implements [`Gpio`] and is handed to the session.

mod pins;
mod sim;

pub use pins::{PinRole, PinSet};
pub use sim::SimulatedDisplay;

/// Physical pin identifier as understood by the GPIO backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(pub u32);

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

impl From<u32> for PinId {
    fn from(value: u32) -> Self {
        PinId(value)
    }
}

/// Input bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Pin direction and its initial electrical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Input with the given bias.
    Input(Pull),
    /// Output driven to `initial` (true = high) as soon as it is configured.
    Output { initial: bool },
}

/// Digital pin access used by the parallel bus.
pub trait Gpio {
    /// Backend-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sets the direction (and bias or initial level) of a pin.
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error>;

    /// Reads the current level of a pin (true = high).
    fn read(&mut self, pin: PinId) -> Result<bool, Self::Error>;

    /// Drives an output pin high or low.
    fn write(&mut self, pin: PinId, high: bool) -> Result<(), Self::Error>;
}

impl<G: Gpio + ?Sized> Gpio for &mut G {
    type Error = G::Error;

    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error> {
        (**self).configure(pin, mode)
    }

    fn read(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        (**self).read(pin)
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), Self::Error> {
        (**self).write(pin, high)
    }
}
