//! XBM source files.
//!
//! Accepted format (as written by GIMP and `bitmap(1)`):
//!
//! ```text
//! #define logo_width 16
//! #define logo_height 8
//! static char logo_bits[] = {
//!   0x00, 0xff, ... };
//! ```
//!
//! The image name may be empty (`#define _width 16`). Parsing only checks
//! the layout and splits out the tokens; [`XbmDocument::validate`] then turns
//! the tokens into a [`SourceBitmap`].

use super::convert::{source_len, SourceBitmap};
use crate::error::SourceFileError;
use crate::Result;
use std::path::Path;
use tracing::debug;

/// Tokens pulled out of an XBM file, not yet checked for meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XbmDocument {
    /// Image name prefix shared by the `_width`/`_height`/`_bits` identifiers.
    pub name: String,
    pub width: String,
    pub height: String,
    pub values: Vec<String>,
}

/// Splits XBM text into its header tokens and data values.
pub fn parse_xbm(text: &str) -> std::result::Result<XbmDocument, SourceFileError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 4 {
        return Err(SourceFileError::TooShort(lines.len()));
    }

    let (name, width) = define(lines[0], "_width").ok_or(SourceFileError::MissingWidth)?;
    let (_, height) = define(lines[1], "_height").ok_or(SourceFileError::MissingHeight)?;

    if !is_data_marker(lines[2]) {
        return Err(SourceFileError::MissingDataMarker);
    }

    let body = lines[3..].concat();
    let body = body
        .trim()
        .strip_suffix("};")
        .ok_or(SourceFileError::MissingTerminator)?;

    let mut values: Vec<String> = body.split(',').map(|v| v.trim().to_string()).collect();
    // trailing comma before the brace
    if values.last().is_some_and(String::is_empty) {
        values.pop();
    }

    Ok(XbmDocument {
        name: name.to_string(),
        width: width.to_string(),
        height: height.to_string(),
        values,
    })
}

/// Matches `#define <name><suffix> <value>`.
fn define<'a>(line: &'a str, suffix: &str) -> Option<(&'a str, &'a str)> {
    let mut parts = line.trim().strip_prefix("#define ")?.split_whitespace();
    let name = parts.next()?.strip_suffix(suffix)?;
    let value = parts.next().unwrap_or("");
    Some((name, value))
}

/// Matches `static [unsigned] char <name>_bits[] = {`.
fn is_data_marker(line: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("static ") else {
        return false;
    };
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("unsigned ").map_or(rest, str::trim_start);
    let Some(rest) = rest.strip_prefix("char ") else {
        return false;
    };
    let compact: String = rest.split_whitespace().collect();
    compact.ends_with("_bits[]={")
}

impl XbmDocument {
    /// Checks the dimensions and data values and builds the bitmap.
    pub fn validate(&self) -> Result<SourceBitmap> {
        let width = dimension(&self.width)
            .ok_or_else(|| SourceFileError::InvalidWidth(self.width.clone()))?;
        let height = dimension(&self.height)
            .ok_or_else(|| SourceFileError::InvalidHeight(self.height.clone()))?;

        let expected = source_len(width, height)?;
        if self.values.len() != expected {
            return Err(SourceFileError::ByteCount {
                expected,
                actual: self.values.len(),
            }
            .into());
        }

        let data = self
            .values
            .iter()
            .enumerate()
            .map(|(index, token)| byte(index, token))
            .collect::<std::result::Result<Vec<u8>, _>>()?;

        SourceBitmap::new(width, height, data)
    }
}

/// XBM dimensions are positive 16-bit values.
fn dimension(token: &str) -> Option<usize> {
    token
        .parse::<u16>()
        .ok()
        .filter(|&v| v >= 1)
        .map(usize::from)
}

fn byte(index: usize, token: &str) -> std::result::Result<u8, SourceFileError> {
    let value = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    }
    .map_err(|_| SourceFileError::InvalidByte {
        index,
        token: token.to_string(),
    })?;

    u8::try_from(value).map_err(|_| SourceFileError::ByteOutOfRange { index, value })
}

/// Parses and validates XBM text.
pub fn read_xbm(text: &str) -> Result<SourceBitmap> {
    parse_xbm(text)?.validate()
}

/// Loads an XBM file from disk.
pub fn load_xbm<P: AsRef<Path>>(path: P) -> Result<SourceBitmap> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let bitmap = read_xbm(&text)?;
    debug!(
        "Loaded {} ({}x{})",
        path.as_ref().display(),
        bitmap.width(),
        bitmap.height()
    );
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    const ARROW: &str = "#define arrow_width 10
#define arrow_height 3
static char arrow_bits[] = {
   0x01, 0x02, 0xff, 0x03,
   255, 0x00 };
";

    fn source_error(text: &str) -> SourceFileError {
        match read_xbm(text) {
            Err(Error::MalformedSourceFile(err)) => err,
            other => panic!("expected MalformedSourceFile, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tokens() {
        let doc = parse_xbm(ARROW).unwrap();
        assert_eq!(doc.name, "arrow");
        assert_eq!(doc.width, "10");
        assert_eq!(doc.height, "3");
        assert_eq!(doc.values, ["0x01", "0x02", "0xff", "0x03", "255", "0x00"]);
    }

    #[test]
    fn test_validate() {
        let bitmap = read_xbm(ARROW).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (10, 3));
        assert_eq!(bitmap.data(), &[0x01, 0x02, 0xFF, 0x03, 0xFF, 0x00]);
        assert_eq!(bitmap.get_pixel(0, 0), Some(true));
        assert_eq!(bitmap.get_pixel(9, 0), Some(true));
        assert_eq!(bitmap.get_pixel(8, 0), Some(false));
    }

    #[test]
    fn test_unnamed_unsigned_and_trailing_comma() {
        let text = "#define _width 8\r\n#define _height 2\r\nstatic unsigned char _bits[] = {\r\n0x80, 0x01,\r\n};\r\n";
        let bitmap = read_xbm(text).unwrap();
        assert_eq!(bitmap.data(), &[0x80, 0x01]);
    }

    #[test]
    fn test_header_errors() {
        assert_eq!(source_error("#define a_width 8\n"), SourceFileError::TooShort(1));

        let text = ARROW.replace("arrow_width", "arrow_wide");
        assert_eq!(source_error(&text), SourceFileError::MissingWidth);

        let text = ARROW.replace("_width 10", "_width ten");
        assert_eq!(source_error(&text), SourceFileError::InvalidWidth("ten".into()));

        let text = ARROW.replace("_width 10", "_width 0");
        assert_eq!(source_error(&text), SourceFileError::InvalidWidth("0".into()));

        let text = ARROW.replace("_width 10", "_width 70000");
        assert_eq!(source_error(&text), SourceFileError::InvalidWidth("70000".into()));

        let text = ARROW.replace("_height 3", "_height 18446744073709551615");
        assert_eq!(
            source_error(&text),
            SourceFileError::InvalidHeight("18446744073709551615".into())
        );

        let text = ARROW.replace("#define arrow_height", "#undef arrow_height");
        assert_eq!(source_error(&text), SourceFileError::MissingHeight);

        let text = ARROW.replace("_height 3", "_height");
        assert_eq!(source_error(&text), SourceFileError::InvalidHeight("".into()));

        let text = ARROW.replace("static char", "static int");
        assert_eq!(source_error(&text), SourceFileError::MissingDataMarker);
    }

    #[test]
    fn test_huge_header_without_data() {
        let text = "#define a_width 18446744073709551615\n\
                    #define a_height 8\n\
                    static char a_bits[] = {\n };\n";
        assert_eq!(
            source_error(text),
            SourceFileError::InvalidWidth("18446744073709551615".into())
        );
    }

    #[test]
    fn test_data_errors() {
        let text = ARROW.replace(" };", "");
        assert_eq!(source_error(&text), SourceFileError::MissingTerminator);

        let text = ARROW.replace("255, ", "");
        assert_eq!(
            source_error(&text),
            SourceFileError::ByteCount {
                expected: 6,
                actual: 5
            }
        );

        let text = ARROW.replace("255", "256");
        assert_eq!(
            source_error(&text),
            SourceFileError::ByteOutOfRange {
                index: 4,
                value: 256
            }
        );

        let text = ARROW.replace("0x03", "0xzz");
        assert_eq!(
            source_error(&text),
            SourceFileError::InvalidByte {
                index: 3,
                token: "0xzz".into()
            }
        );
    }

    #[test]
    fn test_load_xbm() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARROW.as_bytes()).unwrap();
        let bitmap = load_xbm(file.path()).unwrap();
        assert_eq!(bitmap.width(), 10);

        assert!(matches!(
            load_xbm(file.path().with_extension("missing")),
            Err(Error::Io(_))
        ));
    }
}
