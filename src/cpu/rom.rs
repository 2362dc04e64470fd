//! HP-45 instruction memory.
//!
//! The calculator's firmware lives in 2048 words of ROM organised as
//! 8 pages of 256 words. Words are 10 bits wide on the real chips; they are
//! stored here as `u16` and the upper bits are ignored by the decoder.

use std::path::Path;
use thiserror::Error;

/// Number of words in the instruction memory.
pub const ROM_SIZE: usize = 2048;

/// Words per ROM page.
pub const PAGE_SIZE: usize = 256;

/// Immutable instruction memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Rom {
    words: Box<[u16; ROM_SIZE]>,
}

impl Rom {
    /// A ROM filled with zero words (all NOPs).
    pub fn blank() -> Self {
        Self {
            words: Box::new([0; ROM_SIZE]),
        }
    }

    /// Build a ROM from a word image starting at address 0.
    /// Images shorter than the full ROM are padded with zeros.
    pub fn from_words(image: &[u16]) -> Result<Self, RomError> {
        if image.len() > ROM_SIZE {
            return Err(RomError::TooLarge(image.len()));
        }
        let mut words = Box::new([0u16; ROM_SIZE]);
        words[..image.len()].copy_from_slice(image);
        Ok(Self { words })
    }

    /// Build a ROM from a binary image of little-endian 16-bit words.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, RomError> {
        if bytes.len() % 2 != 0 {
            return Err(RomError::OddLength(bytes.len()));
        }
        let image: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_words(&image)
    }

    /// Parse a text listing of ROM words.
    ///
    /// Words are separated by commas or whitespace and may be written as
    /// `0x`-prefixed hex, leading-zero octal or decimal, so a C array body
    /// can be loaded as-is. `//`, `;` and `#` start a comment that runs to the
    /// end of the line.
    pub fn parse(source: &str) -> Result<Self, RomError> {
        let mut image = Vec::with_capacity(ROM_SIZE);

        for (line_num, line) in source.lines().enumerate() {
            let code = strip_comment(line);
            for token in code.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                let word = parse_word(token).ok_or_else(|| RomError::ParseError {
                    line: line_num + 1,
                    token: token.to_string(),
                })?;
                image.push(word);
            }
        }

        Self::from_words(&image)
    }

    /// Load a ROM image from disk. Files ending in `.bin` or `.rom` are read
    /// as binary, anything else as a text listing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();
        let binary = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("bin") | Some("rom")
        );

        let rom = if binary {
            let bytes = std::fs::read(path).map_err(|e| RomError::IoError(e.to_string()))?;
            Self::from_le_bytes(&bytes)?
        } else {
            let text = std::fs::read_to_string(path).map_err(|e| RomError::IoError(e.to_string()))?;
            Self::parse(&text)?
        };

        tracing::debug!(
            "Loaded ROM {:?} ({} non-zero words)",
            path,
            rom.words.iter().filter(|&&w| w != 0).count()
        );
        Ok(rom)
    }

    /// Read the word at an 11-bit address. Higher address bits are ignored.
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.words[addr as usize % ROM_SIZE]
    }

    /// The words of one page.
    pub fn page(&self, page: u8) -> &[u16] {
        let start = (page as usize % 8) * PAGE_SIZE;
        &self.words[start..start + PAGE_SIZE]
    }

    /// All words.
    pub fn words(&self) -> &[u16] {
        &self.words[..]
    }
}

impl Default for Rom {
    fn default() -> Self {
        Self::blank()
    }
}

impl std::fmt::Debug for Rom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.words.iter().filter(|&&w| w != 0).count();
        f.debug_struct("Rom")
            .field("non_zero_words", &used)
            .field("total_words", &ROM_SIZE)
            .finish()
    }
}

fn strip_comment(line: &str) -> &str {
    let cut = [line.find("//"), line.find(';'), line.find('#')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..cut]
}

fn parse_word(token: &str) -> Option<u16> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if token.len() > 1 && token.starts_with('0') {
        u16::from_str_radix(&token[1..], 8).ok()
    } else {
        token.parse().ok()
    }
}

/// Errors that can occur while building a ROM image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("image of {0} words exceeds the 2048-word ROM")]
    TooLarge(usize),

    #[error("binary image has odd length {0}")]
    OddLength(usize),

    #[error("parse error on line {line}: invalid word '{token}'")]
    ParseError { line: usize, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_c_array_body() {
        let rom = Rom::parse("0x0FF, 0377, 255, // comment 0x123\n  12 ; more\n# whole line\n").unwrap();
        assert_eq!(&rom.words()[..4], &[0xFF, 0xFF, 0xFF, 12]);
        assert_eq!(rom.read(4), 0);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = Rom::parse("1, 2\n3, zz\n").unwrap_err();
        assert_eq!(err, RomError::ParseError { line: 2, token: "zz".into() });
    }

    #[test]
    fn test_from_words_bounds() {
        assert!(Rom::from_words(&[0; ROM_SIZE]).is_ok());
        assert_eq!(Rom::from_words(&[0; ROM_SIZE + 1]), Err(RomError::TooLarge(ROM_SIZE + 1)));
    }

    #[test]
    fn test_le_bytes() {
        let rom = Rom::from_le_bytes(&[0x34, 0x12, 0xFF, 0x03]).unwrap();
        assert_eq!(rom.read(0), 0x1234);
        assert_eq!(rom.read(1), 0x03FF);
        assert_eq!(Rom::from_le_bytes(&[1, 2, 3]), Err(RomError::OddLength(3)));
    }

    #[test]
    fn test_page_view() {
        let mut image = vec![0u16; ROM_SIZE];
        image[2 * PAGE_SIZE + 5] = 0x155;
        let rom = Rom::from_words(&image).unwrap();
        assert_eq!(rom.page(2)[5], 0x155);
        assert_eq!(rom.read(0x205), 0x155);
    }
}
