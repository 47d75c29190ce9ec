//! GU-7000 session over the parallel bus.

use crate::bitmap::NativeBitmap;
use crate::gpio::{Gpio, PinSet};
use crate::Result;
use tracing::{debug, info};

use super::bus::{BusOptions, ParallelBus};
use super::params::{
    AutoScrollMode, Brightness, Column, Font, ImageHeight, ImageWidth, OverlayMode, Row,
    ScrollSpec, ScrollSpeed, UserWindowId, Window, WindowId,
};
use super::protocol::{self, Command};

/// VFD module controller.
///
/// Every operation validates all of its parameters before the first byte is
/// put on the bus, so a rejected call sends nothing.
pub struct Vfd<G> {
    bus: ParallelBus<G>,
    selected_window: WindowId,
}

impl<G: Gpio> Vfd<G> {
    /// Configures the pins and resets the module, waiting on Busy forever.
    pub fn initialize(gpio: G, pins: PinSet) -> Result<Self> {
        Self::initialize_with(gpio, pins, BusOptions::default())
    }

    /// Configures the pins and resets the module with explicit bus options.
    pub fn initialize_with(gpio: G, pins: PinSet, options: BusOptions) -> Result<Self> {
        let mut bus = ParallelBus::new(gpio, pins, options);
        bus.configure()?;

        let mut vfd = Self {
            bus,
            selected_window: WindowId::BASE,
        };
        vfd.reset()?;
        info!("VFD initialised ({:?})", vfd.bus.options().busy_wait);
        Ok(vfd)
    }

    fn send(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            debug!("Command {:02X?}", command.as_bytes());
            self.bus.send(command.as_bytes())?;
        }
        Ok(())
    }

    /// Initialises the module: clears the display and restores default settings.
    pub fn reset(&mut self) -> Result<()> {
        self.send(&[protocol::reset()])?;
        self.selected_window = WindowId::BASE;
        Ok(())
    }

    pub fn power(&mut self, on: bool) -> Result<()> {
        self.send(&[protocol::power(on)])
    }

    /// Sets the brightness, 0 (off) to 8 (max).
    pub fn brightness(&mut self, level: u8) -> Result<()> {
        let level = Brightness::new(level)?;
        self.send(&[protocol::brightness(level)])
    }

    pub fn screensaver(&mut self, on: bool) -> Result<()> {
        self.send(&[protocol::screensaver(on)])
    }

    pub fn inverse(&mut self, on: bool) -> Result<()> {
        self.send(&[protocol::inverse(on)])
    }

    pub fn overlay(&mut self, mode: OverlayMode) -> Result<()> {
        self.send(&[protocol::overlay(mode)])
    }

    /// Enables or disables character wrapping at the window edge.
    pub fn wrap(&mut self, on: bool) -> Result<()> {
        self.send(&[protocol::wrap(on)])
    }

    /// Sets the auto-scroll mode; `speed` (0-31) only with horizontal mode.
    pub fn auto_scroll(&mut self, mode: AutoScrollMode, speed: Option<u8>) -> Result<()> {
        let speed = speed.map(ScrollSpeed::new).transpose()?;
        let commands = protocol::auto_scroll(mode, speed)?;
        self.send(&commands)
    }

    /// Scrolls the display `amount` dot rows (0-4095), `repeat` times,
    /// pausing `delay` between steps.
    ///
    /// To scroll horizontally, multiply the column count by the number of rows.
    pub fn scroll(&mut self, amount: u16, repeat: u16, delay: u8) -> Result<()> {
        let spec = ScrollSpec::new(amount, repeat, delay)?;
        self.send(&[protocol::scroll(&spec)])
    }

    pub fn cursor_show(&mut self, on: bool) -> Result<()> {
        self.send(&[protocol::cursor_show(on)])
    }

    /// Moves the cursor to dot column `x` (0-511) and row `y` (0-7).
    pub fn cursor_position(&mut self, x: u16, y: u8) -> Result<()> {
        let x = Column::new(x)?;
        let y = Row::new(y)?;
        self.send(&[protocol::cursor_position(x, y)])
    }

    pub fn cursor_left(&mut self) -> Result<()> {
        self.send(&[protocol::cursor_left()])
    }

    pub fn cursor_right(&mut self) -> Result<()> {
        self.send(&[protocol::cursor_right()])
    }

    pub fn home(&mut self) -> Result<()> {
        self.send(&[protocol::home()])
    }

    pub fn clear(&mut self) -> Result<()> {
        self.send(&[protocol::clear()])
    }

    /// Sets the font style (wide, proportional) and magnification.
    pub fn font(&mut self, wide: bool, proportional: bool, scale_x: u8, scale_y: u8) -> Result<()> {
        let font = Font::new(wide, proportional, scale_x, scale_y)?;
        self.send(&protocol::font(&font))
    }

    /// Selects a window, 0 being the base window.
    pub fn window_select(&mut self, id: u8) -> Result<()> {
        let id = WindowId::new(id)?;
        self.send(&[protocol::window_select(id)])?;
        self.selected_window = id;
        Ok(())
    }

    /// Defines user window `id` (1-4).
    pub fn window_create(&mut self, id: u8, x: u16, y: u8, width: u16, height: u8) -> Result<()> {
        let window = Window::new(id, x, y, width, height)?;
        self.send(&[protocol::window_create(&window)])
    }

    /// Cancels user window `id` (1-4). Deleting a window that was never
    /// created is left for the module to ignore.
    pub fn window_delete(&mut self, id: u8) -> Result<()> {
        let id = UserWindowId::new(id)?;
        self.send(&[protocol::window_delete(id)])?;
        if self.selected_window == WindowId::from(id) {
            debug!("Deleted the selected window {}", id.get());
        }
        Ok(())
    }

    /// Last window selected through this session.
    ///
    /// Only a record of what was sent; the module may disagree if it was
    /// driven from elsewhere.
    pub fn selected_window(&self) -> WindowId {
        self.selected_window
    }

    /// Writes text at the cursor. Line breaks are sent as `LF CR`.
    pub fn output(&mut self, text: &str) -> Result<()> {
        self.send(&[protocol::text(text)])
    }

    /// Displays a bit image at the cursor.
    ///
    /// The header goes out with the handshake; image data is streamed without
    /// polling Busy.
    pub fn image(&mut self, bitmap: &NativeBitmap) -> Result<()> {
        let width = ImageWidth::try_from_i64(bitmap.width() as i64)?;
        let height = ImageHeight::try_from_i64(bitmap.height() as i64)?;

        let header = protocol::image_header(width, height);
        debug!(
            "Image {}x{} ({} bytes)",
            width.get(),
            height.get(),
            bitmap.data().len()
        );
        self.bus.send(header.as_bytes())?;
        self.bus.stream(bitmap.data())
    }

    /// Sends arbitrary bytes with the handshake. An empty slice sends nothing.
    pub fn raw_command(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.send(&[Command::new(bytes)])
    }

    /// Replaces the busy-wait deadline and cancellation token.
    pub fn set_bus_options(&mut self, options: BusOptions) {
        self.bus.set_options(options);
    }

    pub fn pins(&self) -> &PinSet {
        self.bus.pins()
    }

    pub fn gpio(&self) -> &G {
        self.bus.gpio()
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        self.bus.gpio_mut()
    }

    /// Ends the session and hands back the GPIO backend.
    pub fn release(self) -> G {
        self.bus.into_inner()
    }
}
