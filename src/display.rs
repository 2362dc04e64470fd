//! Seven-segment display adapter.
//!
//! The HP-45 drives its 14 LED positions straight from registers A and B:
//! A holds the digit, B holds a mask. Cells 13 and 2 are the mantissa and
//! exponent sign positions and can only show a minus sign.

use crate::bcd::{DigitReg, CELLS, MSD};
use crate::cpu::Registers;

pub const SEG_A: u8 = 0x01;
pub const SEG_B: u8 = 0x02;
pub const SEG_C: u8 = 0x04;
pub const SEG_D: u8 = 0x08;
pub const SEG_E: u8 = 0x10;
pub const SEG_F: u8 = 0x20;
pub const SEG_G: u8 = 0x40;
/// Decimal point.
pub const SEG_H: u8 = 0x80;

/// Segment patterns for the digits 0-9.
pub const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,         // 0
    SEG_B | SEG_C,                                         // 1
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,                 // 2
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,                 // 3
    SEG_B | SEG_C | SEG_F | SEG_G,                         // 4
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,                 // 5
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,         // 6
    SEG_A | SEG_B | SEG_C,                                 // 7
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G, // 8
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,         // 9
];

/// Mask value in B that blanks a position.
const MASK_BLANK: u8 = 9;
/// Mask value in B that lights the decimal point.
const MASK_POINT: u8 = 2;
/// Sign digit that shows a minus.
const SIGN_NEGATIVE: u8 = 9;

const fn is_sign_position(cell: usize) -> bool {
    cell == MSD || cell == 2
}

/// Render A and B as 14 segment bitmaps, leftmost position (cell 13) first.
pub fn render(a: &DigitReg, b: &DigitReg) -> [u8; CELLS] {
    let mut out = [0u8; CELLS];

    for (pos, cell) in (0..CELLS).rev().enumerate() {
        let mask = b.get(cell);
        if mask == MASK_BLANK {
            continue;
        }

        let digit = a.get(cell);
        let mut segments = if is_sign_position(cell) {
            if digit == SIGN_NEGATIVE { SEG_G } else { 0 }
        } else {
            DIGIT_SEGMENTS[digit as usize % 10]
        };

        if mask == MASK_POINT {
            segments |= SEG_H;
        }
        out[pos] = segments;
    }

    out
}

/// Render the display of a processor, or a blank display when it is off.
pub fn render_registers(regs: &Registers) -> [u8; CELLS] {
    if regs.display_on {
        render(&regs.a, &regs.b)
    } else {
        [0; CELLS]
    }
}

/// Text form of one segment bitmap, without the decimal point.
pub fn glyph(segments: u8) -> char {
    let body = segments & !SEG_H;
    if body == 0 {
        return ' ';
    }
    if body == SEG_G {
        return '-';
    }
    DIGIT_SEGMENTS
        .iter()
        .position(|&s| s == body)
        .and_then(|d| char::from_digit(d as u32, 10))
        .unwrap_or('?')
}

/// Render segment bitmaps as text: digits, `-`, spaces, and `.` after any
/// position with the decimal point lit.
pub fn display_text(segments: &[u8]) -> String {
    let mut text = String::with_capacity(segments.len() * 2);
    for &s in segments {
        text.push(glyph(s));
        if s & SEG_H != 0 {
            text.push('.');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(s: &str) -> DigitReg {
        DigitReg::parse(s).unwrap()
    }

    #[test]
    fn test_digit_table_matches_bit_layout() {
        assert_eq!(DIGIT_SEGMENTS, [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F]);
    }

    #[test]
    fn test_negative_number_with_point() {
        // -1.5 with a blanked exponent
        let a = reg("9 1500000000 0 00");
        let b = reg("0 2000000000 9 99");
        let segs = render(&a, &b);

        assert_eq!(segs[0], SEG_G);
        assert_eq!(segs[1], DIGIT_SEGMENTS[1] | SEG_H);
        assert_eq!(segs[2], DIGIT_SEGMENTS[5]);
        assert_eq!(&segs[11..], &[0, 0, 0]);
        assert_eq!(display_text(&segs), "-1.500000000   ");
    }

    #[test]
    fn test_sign_positions_only_show_minus() {
        let a = reg("5 0000000000 3 00");
        let b = DigitReg::zero();
        let segs = render(&a, &b);
        assert_eq!(segs[0], 0);
        assert_eq!(segs[11], 0);
        assert_eq!(segs[12], DIGIT_SEGMENTS[0]);
    }

    #[test]
    fn test_display_off_is_blank() {
        let mut regs = Registers::new();
        regs.a = reg("1");
        assert_eq!(render_registers(&regs), [0; CELLS]);
        regs.display_on = true;
        assert_eq!(render_registers(&regs)[13], DIGIT_SEGMENTS[1]);
    }
}
