//! In-memory stand-in for a GU-7000 module.
//!
//! Latches the data lines on every rising edge of Write, the same way the
//! module does, so the byte stream a session produced can be inspected
//! without hardware. Busy can be held high for a number of polls to exercise
//! the handshake.

use super::{Gpio, PinId, PinMode, PinSet};
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::trace;

/// Simulated module attached to a [`PinSet`].
#[derive(Debug, Clone)]
pub struct SimulatedDisplay {
    pins: PinSet,
    levels: HashMap<PinId, bool>,
    modes: Vec<(PinId, PinMode)>,
    received: Vec<u8>,
    busy_polls_left: u64,
    busy_forever: bool,
    stall: Option<(usize, u64)>,
    busy_reads: u64,
    overruns: usize,
}

impl SimulatedDisplay {
    /// Creates an idle module wired to `pins`.
    pub fn new(pins: PinSet) -> Self {
        Self {
            pins,
            levels: HashMap::new(),
            modes: Vec::new(),
            received: Vec::new(),
            busy_polls_left: 0,
            busy_forever: false,
            stall: None,
            busy_reads: 0,
            overruns: 0,
        }
    }

    /// Keeps Busy high for the next `polls` reads.
    pub fn busy_for(&mut self, polls: u64) {
        self.busy_polls_left = polls;
    }

    /// Keeps Busy high for `polls` reads once `bytes` more bytes have been
    /// latched.
    pub fn busy_after(&mut self, bytes: usize, polls: u64) {
        self.stall = Some((self.received.len() + bytes, polls));
    }

    /// Holds Busy high until released.
    pub fn hold_busy(&mut self, busy: bool) {
        self.busy_forever = busy;
    }

    /// Bytes latched so far.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Drains the latched bytes.
    pub fn take_received(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.received)
    }

    /// Pin configurations in the order they were applied.
    pub fn configured(&self) -> &[(PinId, PinMode)] {
        &self.modes
    }

    /// Number of times Busy was sampled.
    pub fn busy_reads(&self) -> u64 {
        self.busy_reads
    }

    /// Bytes strobed while Busy was high.
    pub fn overruns(&self) -> usize {
        self.overruns
    }

    /// Current driven level of a pin, if it has been configured or written.
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.levels.get(&pin).copied()
    }

    fn busy_level(&self) -> bool {
        self.busy_forever || self.busy_polls_left > 0
    }

    fn latch(&mut self) {
        let byte = (0..8).fold(0u8, |acc, bit| {
            let high = self.level(self.pins.data(bit)).unwrap_or(false);
            acc | (u8::from(high) << bit)
        });
        if self.busy_level() {
            self.overruns += 1;
        }
        trace!("Latched 0x{:02X}", byte);
        self.received.push(byte);
        if let Some((at, polls)) = self.stall {
            if self.received.len() == at {
                self.busy_polls_left = polls;
                self.stall = None;
            }
        }
    }
}

impl Gpio for SimulatedDisplay {
    type Error = Infallible;

    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error> {
        if let PinMode::Output { initial } = mode {
            self.levels.insert(pin, initial);
        }
        self.modes.push((pin, mode));
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        if pin != self.pins.busy() {
            return Ok(self.level(pin).unwrap_or(false));
        }
        self.busy_reads += 1;
        let busy = self.busy_level();
        if self.busy_polls_left > 0 {
            self.busy_polls_left -= 1;
        }
        Ok(busy)
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), Self::Error> {
        let was_high = self.levels.insert(pin, high).unwrap_or(false);
        if pin == self.pins.write() && !was_high && high {
            self.latch();
        }
        Ok(())
    }
}
