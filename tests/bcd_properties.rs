use hp45::bcd::{arith, DigitReg, WordSelect, CELLS};
use proptest::prelude::*;

fn digit_reg() -> impl Strategy<Value = DigitReg> {
    prop::array::uniform14(0u8..10).prop_map(DigitReg::from_cells)
}

fn word_select() -> impl Strategy<Value = WordSelect> {
    (0u8..8).prop_map(WordSelect::from_bits)
}

proptest! {
    #[test]
    fn add_and_subtract_stay_decimal(x in digit_reg(), y in digit_reg(), ws in word_select(), p in 0u8..16) {
        let field = ws.resolve(p);
        let mut z = DigitReg::zero();
        arith::add(x, y, &mut z, field);
        prop_assert!(z.is_valid());
        arith::subtract(x, y, &mut z, field);
        prop_assert!(z.is_valid());
    }

    #[test]
    fn subtract_undoes_add(x in digit_reg(), y in digit_reg(), ws in word_select(), p in 0u8..16) {
        let field = ws.resolve(p);
        let mut sum = x;
        let carry = arith::add(x, y, &mut sum, field);
        let mut back = sum;
        let borrow = arith::subtract(sum, y, &mut back, field);
        prop_assert_eq!(back, x);
        prop_assert_eq!(carry, borrow);
    }

    #[test]
    fn cells_outside_field_untouched(x in digit_reg(), y in digit_reg(), ws in word_select(), p in 0u8..16) {
        let field = ws.resolve(p);
        let mut z = y;
        arith::add(x, y, &mut z, field);
        for i in 0..CELLS {
            if !field.cells().contains(&i) {
                prop_assert_eq!(z.get(i), y.get(i));
            }
        }
    }

    #[test]
    fn compare_with_self_clears_carry(x in digit_reg(), ws in word_select(), p in 0u8..16) {
        prop_assert!(!arith::compare_ge(&x, &x, ws.resolve(p)));
    }

    #[test]
    fn compare_zero_matches_field_contents(x in digit_reg(), ws in word_select(), p in 0u8..16) {
        let field = ws.resolve(p);
        let any_nonzero = field.cells().any(|i| x.get(i) != 0);
        prop_assert_eq!(arith::compare_zero(&x, field), any_nonzero);
    }

    #[test]
    fn exchange_twice_is_identity(x in digit_reg(), y in digit_reg(), ws in word_select(), p in 0u8..16) {
        let field = ws.resolve(p);
        let (mut a, mut b) = (x, y);
        arith::exchange(&mut a, &mut b, field);
        arith::exchange(&mut a, &mut b, field);
        prop_assert_eq!((a, b), (x, y));
    }
}
