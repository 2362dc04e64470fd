//! The 14-digit BCD register.
//!
//! Every HP-45 register holds 14 decimal digits, one per 4-bit cell:
//!
//! ```text
//!  13  12 ......... 3   2   1   0
//! [ S ][ mantissa (10) ][XS][ X  ]
//! ```
//!
//! - cells 0-1: two-digit exponent
//! - cell 2: exponent sign (0 = positive, 9 = negative)
//! - cells 3-12: ten-digit mantissa
//! - cell 13: mantissa sign (0 = positive, 9 = negative)

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of digit cells in a register.
pub const CELLS: usize = 14;

/// Index of the most significant cell (the mantissa sign).
pub const MSD: usize = CELLS - 1;

/// A 14-digit BCD register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DigitReg {
    /// Digits stored from least significant (index 0) to most significant (index 13)
    cells: [u8; CELLS],
}

impl DigitReg {
    /// The all-zero register.
    pub const ZERO: Self = Self { cells: [0; CELLS] };

    /// Create a register with every cell cleared.
    #[inline]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Create a register from cells (least significant first).
    ///
    /// # Panics
    /// Panics if any cell is not a decimal digit.
    pub fn from_cells(cells: [u8; CELLS]) -> Self {
        assert!(
            cells.iter().all(|&d| d <= 9),
            "BCD cells must be 0-9, got {:?}",
            cells
        );
        Self { cells }
    }

    /// Get the underlying cells (least significant first).
    #[inline]
    pub const fn cells(&self) -> &[u8; CELLS] {
        &self.cells
    }

    /// Get a single cell (0 = least significant).
    #[inline]
    pub const fn get(&self, index: usize) -> u8 {
        self.cells[index]
    }

    /// Set a single cell (0 = least significant).
    #[inline]
    pub fn set(&mut self, index: usize, digit: u8) {
        debug_assert!(digit <= 9, "BCD digit out of range: {}", digit);
        self.cells[index] = digit;
    }

    /// True if every cell is zero.
    pub fn is_zero(&self) -> bool {
        self.cells.iter().all(|&d| d == 0)
    }

    /// True if every cell holds a decimal digit.
    pub fn is_valid(&self) -> bool {
        self.cells.iter().all(|&d| d <= 9)
    }

    /// Parse a register from a string of digits written most significant first,
    /// the way the register is usually drawn. Spaces and underscores are ignored
    /// and short strings are zero-extended on the left.
    pub fn parse(s: &str) -> Result<Self, DigitParseError> {
        let digits: Vec<u8> = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_'))
            .map(|c| c.to_digit(10).map(|d| d as u8).ok_or(DigitParseError::InvalidChar(c)))
            .collect::<Result<_, _>>()?;

        if digits.len() > CELLS {
            return Err(DigitParseError::TooLong(digits.len()));
        }

        let mut cells = [0u8; CELLS];
        for (i, &d) in digits.iter().rev().enumerate() {
            cells[i] = d;
        }
        Ok(Self { cells })
    }
}

impl fmt::Display for DigitReg {
    /// Most significant cell first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.cells.iter().rev().map(|&d| char::from(b'0' + d)).collect();
        f.pad(&s)
    }
}

impl fmt::Debug for DigitReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sign | mantissa | exponent sign | exponent
        write!(f, "{}", self.cells[13])?;
        write!(f, " ")?;
        for i in (3..13).rev() {
            write!(f, "{}", self.cells[i])?;
        }
        write!(f, " {} {}{}", self.cells[2], self.cells[1], self.cells[0])
    }
}

/// Errors from [`DigitReg::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigitParseError {
    #[error("invalid digit '{0}'")]
    InvalidChar(char),

    #[error("{0} digits do not fit in a 14-digit register")]
    TooLong(usize),
}
