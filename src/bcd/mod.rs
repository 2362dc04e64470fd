//! Binary-coded decimal register primitives.
//!
//! This module provides the data path of the HP-45 arithmetic unit:
//! - [`DigitReg`] - A 14-digit BCD register
//! - [`WordSelect`] / [`Field`] - The cell range an instruction acts on
//! - [`arith`] - Copy, exchange, shift, add, subtract and compare over a field

mod digits;
mod field;
pub mod arith;

pub use digits::{DigitReg, DigitParseError, CELLS, MSD};
pub use field::{WordSelect, Field};
