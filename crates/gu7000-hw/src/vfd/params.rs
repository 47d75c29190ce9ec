//! Validated command parameters.
//!
//! Every numeric field the module accepts has a closed range fixed by the
//! hardware. Each one gets a newtype whose constructor enforces the range, so
//! the command builders in [`super::protocol`] can never encode an
//! out-of-range value.

use crate::{Error, Result};
use std::str::FromStr;

macro_rules! bounded {
    ($(#[$meta:meta])* $name:ident($repr:ty), $field:literal, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($repr);

        impl $name {
            /// Smallest accepted value.
            pub const MIN: $repr = $min;
            /// Largest accepted value.
            pub const MAX: $repr = $max;

            /// Validates `value` against the hardware range.
            pub fn new(value: $repr) -> Result<Self> {
                Self::try_from_i64(i64::from(value))
            }

            /// Validates a value that may not even fit the field's width.
            pub fn try_from_i64(value: i64) -> Result<Self> {
                if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
                    return Err(Error::range(
                        $field,
                        value,
                        i64::from(Self::MIN),
                        i64::from(Self::MAX),
                    ));
                }
                Ok(Self(value as $repr))
            }

            pub fn get(self) -> $repr {
                self.0
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = Error;

            fn try_from(value: $repr) -> Result<Self> {
                Self::new(value)
            }
        }
    };
}

bounded!(
    /// Brightness level, 0 (off) to 8 (max).
    Brightness(u8), "brightness", 0, 8
);
bounded!(
    /// Horizontal auto-scroll speed, 0 (fast) to 31 (slow).
    ScrollSpeed(u8), "scroll speed", 0, 31
);
bounded!(
    /// Scroll shift amount in rows of dots.
    ScrollAmount(u16), "scroll amount", 0, 4095
);
bounded!(
    /// Horizontal cursor position in dots.
    Column(u16), "x", 0, 511
);
bounded!(
    /// Vertical cursor position in 8-dot rows.
    Row(u8), "y", 0, 7
);
bounded!(
    /// Window width in dots.
    WindowWidth(u16), "width", 1, 512
);
bounded!(
    /// Window height in 8-dot rows.
    WindowHeight(u8), "height", 1, 8
);
bounded!(
    /// Horizontal character magnification.
    ScaleX(u8), "scale x", 1, 4
);
bounded!(
    /// Vertical character magnification.
    ScaleY(u8), "scale y", 1, 2
);
bounded!(
    /// Any window, 0 being the base window.
    WindowId(u8), "window", 0, 4
);
bounded!(
    /// A user-defined window (the base window cannot be created or deleted).
    UserWindowId(u8), "window", 1, 4
);
bounded!(
    /// Bit image width in dots.
    ImageWidth(u16), "image width", 1, 512
);
bounded!(
    /// Bit image height in dots.
    ImageHeight(u16), "image height", 1, 64
);

impl WindowId {
    /// The base window, always present.
    pub const BASE: WindowId = WindowId(0);
}

impl From<UserWindowId> for WindowId {
    fn from(id: UserWindowId) -> Self {
        WindowId(id.0)
    }
}

/// How newly written characters combine with what is already displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OverlayMode {
    /// Overwrite.
    #[default]
    None = 0,
    Or = 1,
    And = 2,
    Xor = 3,
}

impl TryFrom<u8> for OverlayMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(OverlayMode::None),
            1 => Ok(OverlayMode::Or),
            2 => Ok(OverlayMode::And),
            3 => Ok(OverlayMode::Xor),
            _ => Err(Error::InvalidEnum {
                field: "overlay mode",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for OverlayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(OverlayMode::None),
            "or" => Ok(OverlayMode::Or),
            "and" => Ok(OverlayMode::And),
            "xor" => Ok(OverlayMode::Xor),
            _ => Err(Error::InvalidEnum {
                field: "overlay mode",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayMode::None => write!(f, "none"),
            OverlayMode::Or => write!(f, "or"),
            OverlayMode::And => write!(f, "and"),
            OverlayMode::Xor => write!(f, "xor"),
        }
    }
}

/// What happens when text reaches the bottom-right of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AutoScrollMode {
    /// Overwrite from the top-left.
    #[default]
    Wrap = 1,
    /// Scroll up one row.
    Vertical = 2,
    /// Scroll the bottom row sideways.
    Horizontal = 3,
}

impl TryFrom<u8> for AutoScrollMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(AutoScrollMode::Wrap),
            2 => Ok(AutoScrollMode::Vertical),
            3 => Ok(AutoScrollMode::Horizontal),
            _ => Err(Error::InvalidEnum {
                field: "auto-scroll mode",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for AutoScrollMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wrap" => Ok(AutoScrollMode::Wrap),
            "vertical" => Ok(AutoScrollMode::Vertical),
            "horizontal" => Ok(AutoScrollMode::Horizontal),
            _ => Err(Error::InvalidEnum {
                field: "auto-scroll mode",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AutoScrollMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutoScrollMode::Wrap => write!(f, "wrap"),
            AutoScrollMode::Vertical => write!(f, "vertical"),
            AutoScrollMode::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Display scroll: shift by `amount` dot rows, `repeat` times, waiting `delay` between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSpec {
    pub amount: ScrollAmount,
    pub repeat: u16,
    pub delay: u8,
}

impl ScrollSpec {
    pub fn new(amount: u16, repeat: u16, delay: u8) -> Result<Self> {
        Ok(Self {
            amount: ScrollAmount::new(amount)?,
            repeat,
            delay,
        })
    }
}

/// Character font settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font {
    /// Use the wide (6x8 with spacing) character cell.
    pub wide: bool,
    /// Proportional spacing.
    pub proportional: bool,
    pub scale_x: ScaleX,
    pub scale_y: ScaleY,
}

impl Font {
    pub fn new(wide: bool, proportional: bool, scale_x: u8, scale_y: u8) -> Result<Self> {
        Ok(Self {
            wide,
            proportional,
            scale_x: ScaleX::new(scale_x)?,
            scale_y: ScaleY::new(scale_y)?,
        })
    }

    /// Font style parameter: bit 0 wide, bit 1 proportional.
    pub fn style(&self) -> u8 {
        u8::from(self.wide) + u8::from(self.proportional) * 2
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            wide: true,
            proportional: false,
            scale_x: ScaleX(1),
            scale_y: ScaleY(1),
        }
    }
}

/// User window definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub id: UserWindowId,
    pub x: Column,
    pub y: Row,
    pub width: WindowWidth,
    pub height: WindowHeight,
}

impl Window {
    /// Validates fields in argument order, so the first bad field is reported.
    pub fn new(id: u8, x: u16, y: u8, width: u16, height: u8) -> Result<Self> {
        Ok(Self {
            id: UserWindowId::new(id)?,
            x: Column::new(x)?,
            y: Row::new(y)?,
            width: WindowWidth::new(width)?,
            height: WindowHeight::new(height)?,
        })
    }
}
