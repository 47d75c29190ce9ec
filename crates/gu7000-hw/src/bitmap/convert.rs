//! Monochrome bitmap layouts and the transpose between them.
//!
//! Source (XBM) layout: horizontal 8-dot blocks, row-major, bit `x % 8` is
//! the dot at `x`. Native (GU-7000) layout: vertical 8-dot blocks,
//! column-major, MSB is the top dot.

use crate::{Error, Result};

/// Bytes needed for a `width` x `height` source bitmap.
pub fn source_len(width: usize, height: usize) -> Result<usize> {
    width
        .div_ceil(8)
        .checked_mul(height)
        .ok_or_else(|| too_large(width, height))
}

/// Bytes needed for a `width` x `height` native bitmap.
pub fn native_len(width: usize, height: usize) -> Result<usize> {
    height
        .div_ceil(8)
        .checked_mul(width)
        .ok_or_else(|| too_large(width, height))
}

fn too_large(width: usize, height: usize) -> Error {
    Error::MalformedBitmap(format!("{}x{} is too large to address", width, height))
}

/// Checks that both layouts of the bitmap are addressable and that `len`
/// matches the layout the data is in.
fn check_dimensions(
    width: usize,
    height: usize,
    len: usize,
    layout_len: fn(usize, usize) -> Result<usize>,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::MalformedBitmap(format!(
            "dimensions must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    source_len(width, height)?;
    native_len(width, height)?;

    let expected = layout_len(width, height)?;
    if len != expected {
        return Err(Error::MalformedBitmap(format!(
            "{}x{} needs {} data bytes, got {}",
            width, height, expected, len
        )));
    }
    Ok(())
}

/// Transposes source-layout bytes into native-layout bytes.
pub fn convert(width: usize, height: usize, source: &[u8]) -> Result<Vec<u8>> {
    check_dimensions(width, height, source.len(), source_len)?;
    Ok(transpose(width, height, source))
}

/// Bit-by-bit transpose; dimensions must already have passed `check_dimensions`.
fn transpose(width: usize, height: usize, source: &[u8]) -> Vec<u8> {
    let source_stride = width.div_ceil(8);
    let native_stride = height.div_ceil(8);
    let mut native = vec![0u8; native_stride * width];

    for x in 0..width {
        for y in 0..height {
            let source_byte = source[x / 8 + y * source_stride];
            if source_byte & (1 << (x % 8)) != 0 {
                native[y / 8 + x * native_stride] |= 0x80 >> (y % 8);
            }
        }
    }

    native
}

/// Bitmap in XBM layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl SourceBitmap {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, data.len(), source_len)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Dot at (x, y), `None` outside the bitmap.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x < self.width && y < self.height {
            let byte = self.data[x / 8 + y * self.width.div_ceil(8)];
            Some(byte & (1 << (x % 8)) != 0)
        } else {
            None
        }
    }

    /// Converts to the module's layout.
    pub fn to_native(&self) -> NativeBitmap {
        NativeBitmap::from(self)
    }
}

/// Bitmap in the module's bit image layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl NativeBitmap {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, data.len(), native_len)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Blank bitmap.
    pub fn with_dimensions(width: usize, height: usize) -> Result<Self> {
        let len = native_len(width, height)?;
        Self::new(width, height, vec![0; len])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, x: usize, y: usize) -> (usize, u8) {
        (y / 8 + x * self.height.div_ceil(8), 0x80 >> (y % 8))
    }

    /// Dot at (x, y), `None` outside the bitmap.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x < self.width && y < self.height {
            let (byte, mask) = self.index(x, y);
            Some(self.data[byte] & mask != 0)
        } else {
            None
        }
    }

    /// Sets or clears the dot at (x, y). Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            let (byte, mask) = self.index(x, y);
            if on {
                self.data[byte] |= mask;
            } else {
                self.data[byte] &= !mask;
            }
        }
    }

    /// Number of lit dots.
    pub fn count_on(&self) -> usize {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .filter(|&(x, y)| self.get_pixel(x, y) == Some(true))
            .count()
    }
}

impl From<&SourceBitmap> for NativeBitmap {
    fn from(source: &SourceBitmap) -> Self {
        Self {
            width: source.width,
            height: source.height,
            data: transpose(source.width, source.height, &source.data),
        }
    }
}
