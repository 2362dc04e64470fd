//! Word-select: the field of a register an arithmetic instruction acts on.
//!
//! Every arithmetic/register instruction carries a 3-bit word-select code that
//! narrows the operation to a contiguous run of cells. Two of the codes depend
//! on the pointer register P.

use serde::{Serialize, Deserialize};
use crate::bcd::digits::MSD;

/// Word-select codes, in instruction-encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WordSelect {
    /// The single cell at P
    #[default]
    P,
    /// Mantissa (cells 3-12)
    M,
    /// Exponent and exponent sign (cells 0-2)
    X,
    /// Whole register (cells 0-13)
    W,
    /// Cell 0 up to and including P
    Wp,
    /// Mantissa and sign (cells 3-13)
    Ms,
    /// Exponent sign (cell 2)
    Xs,
    /// Mantissa sign (cell 13)
    S,
}

impl WordSelect {
    /// All codes in encoding order.
    pub const ALL: [WordSelect; 8] = [
        WordSelect::P,
        WordSelect::M,
        WordSelect::X,
        WordSelect::W,
        WordSelect::Wp,
        WordSelect::Ms,
        WordSelect::Xs,
        WordSelect::S,
    ];

    /// Decode from the low 3 bits of `bits`.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    /// The 3-bit encoding.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Resolve to an inclusive cell range for the given pointer value.
    pub fn resolve(self, p: u8) -> Field {
        let p = p & 0x0F;
        let (start, end) = match self {
            WordSelect::P => (p, p),
            WordSelect::M => (3, 12),
            WordSelect::X => (0, 2),
            WordSelect::W => (0, 13),
            WordSelect::Wp => (0, p),
            WordSelect::Ms => (3, 13),
            WordSelect::Xs => (2, 2),
            WordSelect::S => (13, 13),
        };
        Field { start, end }
    }

    /// Assembler-style mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            WordSelect::P => "p",
            WordSelect::M => "m",
            WordSelect::X => "x",
            WordSelect::W => "w",
            WordSelect::Wp => "wp",
            WordSelect::Ms => "ms",
            WordSelect::Xs => "xs",
            WordSelect::S => "s",
        }
    }
}

/// An inclusive range of register cells.
///
/// `start` and `end` are kept exactly as resolved, so with P at 14 or 15 they
/// may name cells that do not exist. [`Field::cells`] only yields real cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub start: u8,
    pub end: u8,
}

impl Field {
    /// The whole register.
    pub const WHOLE: Field = Field { start: 0, end: MSD as u8 };

    /// Create a field from inclusive bounds.
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Cell indices in the field, low to high, limited to cells that exist.
    pub fn cells(self) -> std::ops::RangeInclusive<usize> {
        let end = (self.end as usize).min(MSD);
        self.start as usize..=end
    }

    /// Number of real cells in the field.
    pub fn len(self) -> usize {
        self.cells().count()
    }

    /// True if the field covers no real cell.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_modes() {
        assert_eq!(WordSelect::P.resolve(5), Field::new(5, 5));
        assert_eq!(WordSelect::Wp.resolve(7), Field::new(0, 7));
    }

    #[test]
    fn test_whole_ignores_pointer() {
        for p in 0..16 {
            assert_eq!(WordSelect::W.resolve(p), Field::new(0, 13));
        }
    }

    #[test]
    fn test_fixed_table() {
        assert_eq!(WordSelect::M.resolve(0), Field::new(3, 12));
        assert_eq!(WordSelect::X.resolve(0), Field::new(0, 2));
        assert_eq!(WordSelect::Ms.resolve(0), Field::new(3, 13));
        assert_eq!(WordSelect::Xs.resolve(0), Field::new(2, 2));
        assert_eq!(WordSelect::S.resolve(0), Field::new(13, 13));
    }

    #[test]
    fn test_from_bits_masks_high_bits() {
        assert_eq!(WordSelect::from_bits(0b1011), WordSelect::W);
        for ws in WordSelect::ALL {
            assert_eq!(WordSelect::from_bits(ws.bits()), ws);
        }
    }

    #[test]
    fn test_out_of_register_pointer() {
        // P = 14 names a cell that does not exist.
        assert!(WordSelect::P.resolve(14).is_empty());
        assert_eq!(WordSelect::Wp.resolve(15).len(), 14);
    }
}
