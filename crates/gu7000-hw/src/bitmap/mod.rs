//! Bitmap handling.
//!
//! Loads XBM images and converts them into the GU-7000 bit image layout.

mod convert;
pub mod xbm;

pub use convert::{convert, native_len, source_len, NativeBitmap, SourceBitmap};
pub use xbm::{load_xbm, parse_xbm, read_xbm, XbmDocument};
