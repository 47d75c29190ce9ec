//! 8-bit parallel bus with busy/write handshake.
//!
//! Per byte: wait until Busy is low, drive D0-D7 from bits 0-7, then pulse
//! Write low and back high. The module latches the data on the rising edge.
//! Bit image data may skip the busy wait since the module consumes it faster
//! than the bus can deliver.
//!
//! A command is never cut short: the deadline and cancellation token only
//! apply while waiting for its first byte. Once that byte is latched the rest
//! follows with an unbounded wait.

use crate::gpio::{Gpio, PinMode, PinRole, PinSet, Pull};
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// How long to wait for Busy to clear before each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyWait {
    /// Poll until the module is ready, however long that takes.
    #[default]
    Forever,
    /// Give up with [`Error::BusyTimeout`] if the module stays busy this long
    /// before a command starts.
    Deadline(Duration),
}

/// Shared flag that aborts a pending busy wait before the next command.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Session-wide transfer options.
#[derive(Debug, Clone, Default)]
pub struct BusOptions {
    pub busy_wait: BusyWait,
    pub cancel: Option<CancelToken>,
}

/// The parallel interface bound to a GPIO backend.
pub struct ParallelBus<G> {
    gpio: G,
    pins: PinSet,
    options: BusOptions,
}

impl<G: Gpio> ParallelBus<G> {
    pub fn new(gpio: G, pins: PinSet, options: BusOptions) -> Self {
        Self {
            gpio,
            pins,
            options,
        }
    }

    /// Puts every bound pin into its idle state: Busy as a pulled-down input,
    /// Write high, data lines low.
    pub fn configure(&mut self) -> Result<()> {
        for (role, pin) in self.pins.iter() {
            let mode = match role {
                PinRole::Busy => PinMode::Input(Pull::Down),
                PinRole::Write => PinMode::Output { initial: true },
                _ => PinMode::Output { initial: false },
            };
            self.gpio.configure(pin, mode).map_err(Error::gpio)?;
            debug!("Configured {} on {} as {:?}", role, pin, mode);
        }
        Ok(())
    }

    /// Sends one command with the full handshake.
    pub fn send(&mut self, command: &[u8]) -> Result<()> {
        let Some((&first, rest)) = command.split_first() else {
            return Ok(());
        };
        self.wait_ready(true)?;
        self.send_byte(first)?;
        for &byte in rest {
            self.wait_ready(false)?;
            self.send_byte(byte)?;
        }
        Ok(())
    }

    /// Sends bytes without waiting on Busy.
    pub fn stream(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.send_byte(byte)?;
        }
        Ok(())
    }

    fn send_byte(&mut self, value: u8) -> Result<()> {
        for bit in 0..8 {
            let high = value & (1 << bit) != 0;
            self.gpio
                .write(self.pins.data(bit), high)
                .map_err(Error::gpio)?;
        }

        self.strobe()?;
        trace!("Sent 0x{:02X}", value);
        Ok(())
    }

    fn strobe(&mut self) -> Result<()> {
        let write = self.pins.write();
        self.gpio.write(write, false).map_err(Error::gpio)?;
        self.gpio.write(write, true).map_err(Error::gpio)
    }

    /// Polls Busy until low. `abortable` applies the deadline and the cancel
    /// token; it is only set before the first byte of a command.
    fn wait_ready(&mut self, abortable: bool) -> Result<()> {
        let busy = self.pins.busy();
        let started = match self.options.busy_wait {
            BusyWait::Deadline(_) if abortable => Some(Instant::now()),
            _ => None,
        };

        let cancel = match &self.options.cancel {
            Some(token) if abortable => Some(token.clone()),
            _ => None,
        };

        while self.gpio.read(busy).map_err(Error::gpio)? {
            if cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(Error::Cancelled);
            }
            if let (BusyWait::Deadline(limit), Some(started)) = (self.options.busy_wait, started) {
                let waited = started.elapsed();
                if waited >= limit {
                    warn!("Busy line still high after {:?}", waited);
                    return Err(Error::BusyTimeout { waited });
                }
            }
            std::hint::spin_loop();
        }
        Ok(())
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn options(&self) -> &BusOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BusOptions) {
        self.options = options;
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn into_inner(self) -> G {
        self.gpio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{PinId, SimulatedDisplay};

    fn pins() -> PinSet {
        PinSet::new(
            PinId(4),
            PinId(17),
            [18, 27, 22, 23, 24, 25, 5, 6].map(PinId),
        )
        .unwrap()
    }

    fn bus(options: BusOptions) -> ParallelBus<SimulatedDisplay> {
        let pins = pins();
        ParallelBus::new(SimulatedDisplay::new(pins.clone()), pins, options)
    }

    #[test]
    fn test_configure_idle_levels() {
        let mut bus = bus(BusOptions::default());
        bus.configure().unwrap();

        let configured = bus.gpio().configured();
        assert_eq!(configured.len(), 10);
        assert_eq!(configured[0], (PinId(4), PinMode::Input(Pull::Down)));
        assert_eq!(configured[1], (PinId(17), PinMode::Output { initial: true }));
        for (_, mode) in &configured[2..] {
            assert_eq!(*mode, PinMode::Output { initial: false });
        }
        assert!(bus.gpio().received().is_empty());
    }

    #[test]
    fn test_bit_order() {
        let mut bus = bus(BusOptions::default());
        bus.configure().unwrap();
        bus.send(&[0x01, 0x80, 0xA5]).unwrap();

        assert_eq!(bus.gpio().received(), &[0x01, 0x80, 0xA5]);
        assert_eq!(bus.gpio().level(PinId(18)), Some(true)); // D0 of 0xA5
        assert_eq!(bus.gpio().level(PinId(6)), Some(true)); // D7 of 0xA5
        assert_eq!(bus.gpio().level(PinId(27)), Some(false)); // D1 of 0xA5
    }

    #[test]
    fn test_waits_for_busy() {
        let mut bus = bus(BusOptions::default());
        bus.configure().unwrap();
        bus.gpio_mut().busy_for(100);
        bus.send(&[0x0C]).unwrap();

        assert_eq!(bus.gpio().received(), &[0x0C]);
        assert_eq!(bus.gpio().busy_reads(), 101);
        assert_eq!(bus.gpio().overruns(), 0);
    }

    #[test]
    fn test_stream_skips_busy() {
        let mut bus = bus(BusOptions::default());
        bus.configure().unwrap();
        bus.gpio_mut().busy_for(5);
        bus.stream(&[1, 2, 3]).unwrap();

        assert_eq!(bus.gpio().received(), &[1, 2, 3]);
        assert_eq!(bus.gpio().busy_reads(), 0);
    }

    #[test]
    fn test_deadline() {
        let mut bus = bus(BusOptions {
            busy_wait: BusyWait::Deadline(Duration::from_millis(5)),
            cancel: None,
        });
        bus.configure().unwrap();
        bus.gpio_mut().hold_busy(true);

        let err = bus.send(&[0x0C]).unwrap_err();
        assert!(matches!(err, Error::BusyTimeout { waited } if waited >= Duration::from_millis(5)));
        assert!(bus.gpio().received().is_empty());
    }

    #[test]
    fn test_cancel() {
        let token = CancelToken::new();
        let mut bus = bus(BusOptions {
            busy_wait: BusyWait::Forever,
            cancel: Some(token.clone()),
        });
        bus.configure().unwrap();
        bus.gpio_mut().hold_busy(true);
        token.cancel();

        assert!(matches!(bus.send(&[0x0C]), Err(Error::Cancelled)));
        assert!(bus.gpio().received().is_empty());
    }

    #[test]
    fn test_deadline_does_not_split_command() {
        let mut bus = bus(BusOptions {
            busy_wait: BusyWait::Deadline(Duration::ZERO),
            cancel: None,
        });
        bus.configure().unwrap();
        bus.gpio_mut().busy_after(3, 100);

        let command = [0x1F, 0x24, 0x2C, 0x01, 0x01, 0x00];
        bus.send(&command).unwrap();
        assert_eq!(bus.gpio().received(), &command);
        assert_eq!(bus.gpio().overruns(), 0);

        bus.gpio_mut().hold_busy(true);
        assert!(matches!(
            bus.send(&[0x1F, 0x58, 0x01]),
            Err(Error::BusyTimeout { .. })
        ));
        assert_eq!(bus.gpio().received(), &command);
    }

    #[test]
    fn test_cancel_does_not_split_command() {
        let token = CancelToken::new();
        let mut bus = bus(BusOptions {
            busy_wait: BusyWait::Forever,
            cancel: Some(token.clone()),
        });
        bus.configure().unwrap();
        token.cancel();
        bus.gpio_mut().busy_after(1, 20);

        // Busy is clear for the first byte, so the command starts and finishes.
        bus.send(&[0x1F, 0x72, 0x01]).unwrap();
        assert_eq!(bus.gpio().received(), &[0x1F, 0x72, 0x01]);
        assert_eq!(bus.gpio().busy_reads(), 3 + 20);

        bus.gpio_mut().hold_busy(true);
        assert!(matches!(bus.send(&[0x0C]), Err(Error::Cancelled)));
        assert_eq!(bus.gpio().received().len(), 3);
    }
}
