//! Field-scoped BCD primitives.
//!
//! Each primitive works only on the cells of a [`Field`]; cells outside it are
//! left untouched. Operations that affect the carry flag return the new carry
//! instead of writing it, so callers decide how it lands in the processor.
//!
//! Source operands are taken by value. A register is 14 bytes, and copying lets
//! the destination alias either source (`C + C -> C`).

use crate::bcd::{DigitReg, Field};

/// `dst := src` over the field.
pub fn copy(dst: &mut DigitReg, src: &DigitReg, field: Field) {
    for i in field.cells() {
        dst.set(i, src.get(i));
    }
}

/// Swap the field between two registers.
pub fn exchange(r1: &mut DigitReg, r2: &mut DigitReg, field: Field) {
    for i in field.cells() {
        let t = r1.get(i);
        r1.set(i, r2.get(i));
        r2.set(i, t);
    }
}

/// Shift the field one cell toward the most significant end. The lowest cell
/// of the field becomes 0 and the highest cell is lost.
pub fn shift_left(r: &mut DigitReg, field: Field) {
    let cells = field.cells();
    let (s, e) = (*cells.start(), *cells.end());
    if s > e {
        return;
    }
    for i in (s + 1..=e).rev() {
        r.set(i, r.get(i - 1));
    }
    r.set(s, 0);
}

/// Shift the field one cell toward the least significant end. The highest
/// cell of the field becomes 0 and the lowest cell is lost.
pub fn shift_right(r: &mut DigitReg, field: Field) {
    let cells = field.cells();
    let (s, e) = (*cells.start(), *cells.end());
    if s > e {
        return;
    }
    for i in s..e {
        r.set(i, r.get(i + 1));
    }
    r.set(e, 0);
}

/// `z := x + y` over the field, returning the decimal carry out of its top.
pub fn add(x: DigitReg, y: DigitReg, z: &mut DigitReg, field: Field) -> bool {
    let mut carry = 0u8;
    for i in field.cells() {
        let mut sum = x.get(i) + y.get(i) + carry;
        if sum >= 10 {
            sum -= 10;
            carry = 1;
        } else {
            carry = 0;
        }
        z.set(i, sum);
    }
    carry != 0
}

/// `z := x - y` over the field, returning the borrow out of its top.
pub fn subtract(x: DigitReg, y: DigitReg, z: &mut DigitReg, field: Field) -> bool {
    let mut borrow = 0i8;
    for i in field.cells() {
        let mut diff = x.get(i) as i8 - y.get(i) as i8 - borrow;
        if diff < 0 {
            diff += 10;
            borrow = 1;
        } else {
            borrow = 0;
        }
        z.set(i, diff as u8);
    }
    borrow != 0
}

/// Write the constant 1 into the field: the lowest cell becomes 1, the rest 0.
pub fn set_one(r: &mut DigitReg, field: Field) {
    let mut digit = 1;
    for i in field.cells() {
        r.set(i, digit);
        digit = 0;
    }
}

/// Compare `r1 >= r2` over the field, most significant cell first.
///
/// Returns the carry: `true` when `r1 < r2`, `false` when `r1 >= r2`.
pub fn compare_ge(r1: &DigitReg, r2: &DigitReg, field: Field) -> bool {
    for i in field.cells().rev() {
        let (a, b) = (r1.get(i), r2.get(i));
        if a != b {
            return a < b;
        }
    }
    false
}

/// Returns the carry for a zero test: `true` if any cell in the field is nonzero.
pub fn compare_zero(r: &DigitReg, field: Field) -> bool {
    field.cells().any(|i| r.get(i) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcd::WordSelect;

    fn reg(s: &str) -> DigitReg {
        DigitReg::parse(s).unwrap()
    }

    #[test]
    fn test_add_carries_between_cells() {
        let mut z = DigitReg::zero();
        let carry = add(reg("19"), reg("01"), &mut z, Field::WHOLE);
        assert_eq!(z, reg("20"));
        assert!(!carry);
    }

    #[test]
    fn test_add_carry_out_of_field() {
        let mut z = DigitReg::zero();
        let carry = add(reg("999"), reg("001"), &mut z, WordSelect::X.resolve(0));
        assert_eq!(z, DigitReg::zero());
        assert!(carry);
    }

    #[test]
    fn test_add_aliasing_doubles() {
        let mut c = reg("45");
        let carry = add(c, c, &mut c, Field::WHOLE);
        assert_eq!(c, reg("90"));
        assert!(!carry);
    }

    #[test]
    fn test_subtract_borrow() {
        let mut z = DigitReg::zero();
        let borrow = subtract(reg("0"), reg("1"), &mut z, Field::WHOLE);
        assert!(borrow);
        assert_eq!(z, reg("99999999999999"));
    }

    #[test]
    fn test_field_limits_effect() {
        let mut z = reg("55555555555555");
        add(reg("11111111111111"), reg("11111111111111"), &mut z, WordSelect::M.resolve(0));
        assert_eq!(z, reg("52222222222555"));
    }

    #[test]
    fn test_shift_within_field() {
        let mut r = reg("12345678901234");
        shift_right(&mut r, WordSelect::M.resolve(0));
        assert_eq!(r, reg("10234567890234"));

        let mut r = reg("12345678901234");
        shift_left(&mut r, WordSelect::M.resolve(0));
        assert_eq!(r, reg("13456789010234"));
    }

    #[test]
    fn test_shift_single_cell_clears_it() {
        let mut r = reg("77");
        shift_left(&mut r, WordSelect::P.resolve(0));
        assert_eq!(r, reg("70"));
    }

    #[test]
    fn test_set_one() {
        let mut r = reg("99999999999999");
        set_one(&mut r, WordSelect::M.resolve(0));
        assert_eq!(r, reg("90000000001999"));
    }

    #[test]
    fn test_compare_ge() {
        let field = Field::WHOLE;
        assert!(!compare_ge(&reg("5"), &reg("5"), field));
        assert!(!compare_ge(&reg("51"), &reg("49"), field));
        assert!(compare_ge(&reg("49"), &reg("51"), field));
    }

    #[test]
    fn test_compare_zero() {
        assert!(!compare_zero(&DigitReg::zero(), Field::WHOLE));
        assert!(compare_zero(&reg("100"), Field::WHOLE));
        // Nonzero cell outside the field is ignored.
        assert!(!compare_zero(&reg("100"), WordSelect::P.resolve(0)));
    }

    #[test]
    fn test_exchange() {
        let mut a = reg("12");
        let mut b = reg("34");
        exchange(&mut a, &mut b, WordSelect::P.resolve(0));
        assert_eq!(a, reg("14"));
        assert_eq!(b, reg("32"));
    }

    #[test]
    fn test_empty_field_is_noop() {
        let field = WordSelect::P.resolve(14);
        let mut r = reg("12345678901234");
        shift_left(&mut r, field);
        shift_right(&mut r, field);
        set_one(&mut r, field);
        assert_eq!(r, reg("12345678901234"));
        assert!(!add(r, r, &mut r.clone(), field));
    }
}
