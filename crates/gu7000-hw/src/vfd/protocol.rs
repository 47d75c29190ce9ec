//! GU-7000 command grammar.
//!
//! Command structure:
//! - Opcode: a control code (`0x08`-`0x1F`) optionally followed by a
//!   function selector (`0x28 group function` for extended commands)
//! - Parameters: one byte each; 16-bit values are sent low byte first
//!
//! Builders here are pure: they take already-validated parameters and return
//! the exact bytes to put on the bus.

use super::params::{
    AutoScrollMode, Brightness, Column, Font, ImageHeight, ImageWidth, OverlayMode, Row,
    ScrollSpec, ScrollSpeed, UserWindowId, Window, WindowId,
};
use crate::{Error, Result};

/// Backspace: move cursor left.
pub const BS: u8 = 0x08;
/// Horizontal tab: move cursor right.
pub const HT: u8 = 0x09;
/// Line feed.
pub const LF: u8 = 0x0A;
/// Home position.
pub const HOM: u8 = 0x0B;
/// Clear display.
pub const CLR: u8 = 0x0C;
/// Carriage return.
pub const CR: u8 = 0x0D;
/// Window select, base window id added.
pub const WINDOW_SELECT: u8 = 0x10;
/// Escape prefix.
pub const ESC: u8 = 0x1B;
/// Unit separator, prefix for most commands.
pub const US: u8 = 0x1F;
/// Extended command introducer following `US`.
pub const EXT: u8 = 0x28;

/// Extended command groups (byte after `US 0x28`).
pub mod group {
    pub const DISPLAY: u8 = 0x61;
    pub const BIT_IMAGE: u8 = 0x66;
    pub const FONT: u8 = 0x67;
    pub const WINDOW: u8 = 0x77;
}

/// Display action parameters for `US ( a @`.
const DISPLAY_OFF: u8 = 0x00;
const DISPLAY_ON: u8 = 0x01;
const ALL_DOTS_OFF: u8 = 0x02;
const BLINK: u8 = 0x04;

/// One encoded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(Vec<u8>);

impl Command {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Splits a 16-bit parameter into `[low, high]`.
#[inline]
pub fn split(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Initialise the display (`ESC @`).
pub fn reset() -> Command {
    Command::new([ESC, 0x40])
}

/// Display power on/off.
pub fn power(on: bool) -> Command {
    let action = if on { DISPLAY_ON } else { DISPLAY_OFF };
    Command::new([US, EXT, group::DISPLAY, 0x40, action])
}

/// Screen saver: blink when on, all dots off otherwise.
pub fn screensaver(on: bool) -> Command {
    let action = if on { BLINK } else { ALL_DOTS_OFF };
    Command::new([US, EXT, group::DISPLAY, 0x40, action])
}

pub fn brightness(level: Brightness) -> Command {
    Command::new([US, 0x58, level.get()])
}

/// Reverse video.
pub fn inverse(on: bool) -> Command {
    Command::new([US, 0x72, u8::from(on)])
}

/// Character write mixture mode.
pub fn overlay(mode: OverlayMode) -> Command {
    Command::new([US, 0x77, mode as u8])
}

/// Character wrapping. The module's flag is inverted: 0 means wrap.
pub fn wrap(on: bool) -> Command {
    Command::new([US, EXT, group::WINDOW, 0x10, u8::from(!on)])
}

/// Auto-scroll mode, followed by the horizontal scroll speed when given.
///
/// A speed is only meaningful for [`AutoScrollMode::Horizontal`].
pub fn auto_scroll(mode: AutoScrollMode, speed: Option<ScrollSpeed>) -> Result<Vec<Command>> {
    let mut commands = vec![Command::new([US, mode as u8])];
    match (mode, speed) {
        (AutoScrollMode::Horizontal, Some(speed)) => {
            commands.push(Command::new([US, 0x73, speed.get()]));
        }
        (_, Some(_)) => {
            return Err(Error::InvalidCombination(
                "scroll speed can only be set for horizontal auto-scroll",
            ));
        }
        (_, None) => {}
    }
    Ok(commands)
}

/// Display scroll action.
pub fn scroll(spec: &ScrollSpec) -> Command {
    let [amount_lo, amount_hi] = split(spec.amount.get());
    let [repeat_lo, repeat_hi] = split(spec.repeat);
    Command::new([
        US,
        EXT,
        group::DISPLAY,
        0x10,
        amount_lo,
        amount_hi,
        repeat_lo,
        repeat_hi,
        spec.delay,
    ])
}

pub fn cursor_show(on: bool) -> Command {
    Command::new([US, 0x43, u8::from(on)])
}

pub fn cursor_left() -> Command {
    Command::new([BS])
}

pub fn cursor_right() -> Command {
    Command::new([HT])
}

pub fn home() -> Command {
    Command::new([HOM])
}

pub fn clear() -> Command {
    Command::new([CLR])
}

/// Cursor set. Both coordinates go out as 16-bit pairs even though `y` fits a byte.
pub fn cursor_position(x: Column, y: Row) -> Command {
    let [x_lo, x_hi] = split(x.get());
    let [y_lo, y_hi] = split(u16::from(y.get()));
    Command::new([US, 0x24, x_lo, x_hi, y_lo, y_hi])
}

/// Font style then font magnification.
pub fn font(font: &Font) -> [Command; 2] {
    [
        Command::new([US, EXT, group::FONT, 0x03, font.style()]),
        Command::new([
            US,
            EXT,
            group::FONT,
            0x40,
            font.scale_x.get(),
            font.scale_y.get(),
        ]),
    ]
}

pub fn window_select(id: WindowId) -> Command {
    Command::new([WINDOW_SELECT + id.get()])
}

/// User window define.
pub fn window_create(window: &Window) -> Command {
    let [x_lo, x_hi] = split(window.x.get());
    let [y_lo, y_hi] = split(u16::from(window.y.get()));
    let [w_lo, w_hi] = split(window.width.get());
    let [h_lo, h_hi] = split(u16::from(window.height.get()));
    Command::new([
        US,
        EXT,
        group::WINDOW,
        0x02,
        window.id.get(),
        0x01,
        x_lo,
        x_hi,
        y_lo,
        y_hi,
        w_lo,
        w_hi,
        h_lo,
        h_hi,
    ])
}

/// User window cancel.
pub fn window_delete(id: UserWindowId) -> Command {
    Command::new([US, EXT, group::WINDOW, 0x02, id.get(), 0x00])
}

/// Number of 8-dot rows needed for `height` dots.
#[inline]
pub fn rows_for(height: u16) -> u16 {
    height.div_ceil(8)
}

/// Real-time bit image display header; image data follows.
pub fn image_header(width: ImageWidth, height: ImageHeight) -> Command {
    let [w_lo, w_hi] = split(width.get());
    // at most 8 rows, so the high byte is always zero
    let rows = rows_for(height.get()) as u8;
    Command::new([US, EXT, group::BIT_IMAGE, 0x11, w_lo, w_hi, rows, 0x00, 0x01])
}

/// Text as sent to the module, with every line break turned into `LF CR`.
pub fn text(text: &str) -> Command {
    Command::new(normalize_line_endings(text.as_bytes()))
}

/// Rewrites line breaks to the `LF CR` pair the module expects.
///
/// A bare `LF`, `CR LF` and `LF CR` each become exactly one `LF CR`. A lone
/// `CR` is left alone.
pub fn normalize_line_endings(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    let mut bytes = input.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        match byte {
            LF => {
                out.extend_from_slice(&[LF, CR]);
                bytes.next_if_eq(&CR);
            }
            CR if bytes.peek() == Some(&LF) => {
                bytes.next();
                out.extend_from_slice(&[LF, CR]);
                bytes.next_if_eq(&CR);
            }
            other => out.push(other),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_commands() {
        assert_eq!(reset().as_bytes(), &[0x1B, 0x40]);
        assert_eq!(cursor_left().as_bytes(), &[0x08]);
        assert_eq!(cursor_right().as_bytes(), &[0x09]);
        assert_eq!(home().as_bytes(), &[0x0B]);
        assert_eq!(clear().as_bytes(), &[0x0C]);
    }

    #[test]
    fn test_boolean_commands() {
        assert_eq!(power(true).as_bytes(), &[0x1F, 0x28, 0x61, 0x40, 0x01]);
        assert_eq!(power(false).as_bytes(), &[0x1F, 0x28, 0x61, 0x40, 0x00]);
        assert_eq!(screensaver(true).as_bytes(), &[0x1F, 0x28, 0x61, 0x40, 0x04]);
        assert_eq!(screensaver(false).as_bytes(), &[0x1F, 0x28, 0x61, 0x40, 0x02]);
        assert_eq!(inverse(true).as_bytes(), &[0x1F, 0x72, 0x01]);
        assert_eq!(cursor_show(false).as_bytes(), &[0x1F, 0x43, 0x00]);
    }

    #[test]
    fn test_wrap_is_inverted() {
        assert_eq!(wrap(true).as_bytes(), &[0x1F, 0x28, 0x77, 0x10, 0x00]);
        assert_eq!(wrap(false).as_bytes(), &[0x1F, 0x28, 0x77, 0x10, 0x01]);
    }

    #[test]
    fn test_brightness() {
        for level in 0..=8 {
            let cmd = brightness(Brightness::new(level).unwrap());
            assert_eq!(cmd.as_bytes(), &[0x1F, 0x58, level]);
        }
    }

    #[test]
    fn test_overlay() {
        assert_eq!(overlay(OverlayMode::Xor).as_bytes(), &[0x1F, 0x77, 0x03]);
        assert_eq!(overlay(OverlayMode::None).as_bytes(), &[0x1F, 0x77, 0x00]);
    }

    #[test]
    fn test_auto_scroll() {
        let cmds = auto_scroll(AutoScrollMode::Vertical, None).unwrap();
        assert_eq!(cmds, vec![Command::new([0x1F, 0x02])]);

        let speed = ScrollSpeed::new(31).unwrap();
        let cmds = auto_scroll(AutoScrollMode::Horizontal, Some(speed)).unwrap();
        assert_eq!(
            cmds,
            vec![Command::new([0x1F, 0x03]), Command::new([0x1F, 0x73, 31])]
        );

        let speed = ScrollSpeed::new(5).unwrap();
        assert!(matches!(
            auto_scroll(AutoScrollMode::Wrap, Some(speed)),
            Err(Error::InvalidCombination(_))
        ));
    }

    #[test]
    fn test_scroll_split() {
        let spec = ScrollSpec::new(4095, 65535, 255).unwrap();
        assert_eq!(
            scroll(&spec).as_bytes(),
            &[0x1F, 0x28, 0x61, 0x10, 0xFF, 0x0F, 0xFF, 0xFF, 0xFF]
        );

        let spec = ScrollSpec::new(8, 300, 10).unwrap();
        assert_eq!(
            scroll(&spec).as_bytes(),
            &[0x1F, 0x28, 0x61, 0x10, 8, 0, 44, 1, 10]
        );
    }

    #[test]
    fn test_cursor_position() {
        let cmd = cursor_position(Column::new(511).unwrap(), Row::new(7).unwrap());
        assert_eq!(cmd.as_bytes(), &[0x1F, 0x24, 0xFF, 0x01, 0x07, 0x00]);
    }

    #[test]
    fn test_font() {
        let [style, scale] = font(&Font::new(true, true, 2, 2).unwrap());
        assert_eq!(style.as_bytes(), &[0x1F, 0x28, 0x67, 0x03, 0x03]);
        assert_eq!(scale.as_bytes(), &[0x1F, 0x28, 0x67, 0x40, 0x02, 0x02]);
    }

    #[test]
    fn test_windows() {
        assert_eq!(window_select(WindowId::BASE).as_bytes(), &[0x10]);
        assert_eq!(window_select(WindowId::new(4).unwrap()).as_bytes(), &[0x14]);

        let window = Window::new(2, 511, 7, 512, 8).unwrap();
        assert_eq!(
            window_create(&window).as_bytes(),
            &[0x1F, 0x28, 0x77, 0x02, 2, 0x01, 255, 1, 7, 0, 0, 2, 8, 0]
        );

        let id = UserWindowId::new(3).unwrap();
        assert_eq!(
            window_delete(id).as_bytes(),
            &[0x1F, 0x28, 0x77, 0x02, 3, 0x00]
        );
    }

    #[test]
    fn test_image_header() {
        let header = image_header(ImageWidth::new(256).unwrap(), ImageHeight::new(64).unwrap());
        assert_eq!(
            header.as_bytes(),
            &[0x1F, 0x28, 0x66, 0x11, 0x00, 0x01, 8, 0x00, 0x01]
        );

        let header = image_header(ImageWidth::new(10).unwrap(), ImageHeight::new(9).unwrap());
        assert_eq!(header.as_bytes()[6], 2);
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(normalize_line_endings(b"a\nb"), b"a\n\rb");
        assert_eq!(normalize_line_endings(b"a\r\nb"), b"a\n\rb");
        assert_eq!(normalize_line_endings(b"a\n\rb"), b"a\n\rb");
        assert_eq!(normalize_line_endings(b"a\n\nb"), b"a\n\r\n\rb");
        assert_eq!(normalize_line_endings(b"a\rb"), b"a\rb");
        assert_eq!(normalize_line_endings(b"\n"), b"\n\r");
        assert_eq!(normalize_line_endings(b""), b"");
    }

    #[test]
    fn test_text_passes_bytes_through() {
        assert_eq!(text("Hello").as_bytes(), b"Hello");
    }
}
