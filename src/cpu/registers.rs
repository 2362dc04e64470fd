//! HP-45 processor state.
//!
//! The arithmetic and register circuit holds seven 14-digit registers:
//! - A, B: scratch registers for arithmetic
//! - C: the X register, shown on the display and the only path to storage
//! - D, E, F: the user stack levels Y, Z and T
//! - M: a scratch register reachable only through C
//!
//! The control and timing circuit adds the program counter, 12 status flags,
//! a one-level return address, the pointer P and the latched key code. The
//! auxiliary data storage circuit adds ten more registers selected through a
//! bank address.

use serde::{Serialize, Deserialize};
use crate::bcd::{DigitReg, Field, WordSelect};

/// Number of auxiliary data storage registers.
pub const STORAGE_REGS: usize = 10;

/// Number of programmable status flags.
pub const STATUS_FLAGS: u8 = 12;

/// Program counter page bits (8-10).
pub const PAGE_MASK: u16 = 0x700;

/// Program counter offset bits (0-7).
pub const OFFSET_MASK: u16 = 0x0FF;

/// Pointer register width mask.
pub const POINTER_MASK: u8 = 0x0F;

/// The seven arithmetic-circuit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegId {
    A,
    B,
    C,
    D,
    E,
    F,
    M,
}

impl RegId {
    /// All registers in display order.
    pub const ALL: [RegId; 7] = [RegId::A, RegId::B, RegId::C, RegId::D, RegId::E, RegId::F, RegId::M];

    /// Single-letter name.
    pub fn name(self) -> &'static str {
        match self {
            RegId::A => "A",
            RegId::B => "B",
            RegId::C => "C",
            RegId::D => "D",
            RegId::E => "E",
            RegId::F => "F",
            RegId::M => "M",
        }
    }
}

/// The HP-45 register file.
///
/// A zeroed record is the power-on state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: DigitReg,
    pub b: DigitReg,
    /// C: the X register (display value)
    pub c: DigitReg,
    /// D: stack level Y
    pub d: DigitReg,
    /// E: stack level Z
    pub e: DigitReg,
    /// F: stack level T
    pub f: DigitReg,
    pub m: DigitReg,

    /// Auxiliary data storage
    pub storage: [DigitReg; STORAGE_REGS],

    /// 11-bit program counter: page in bits 8-10, offset in bits 0-7
    pub pc: u16,

    /// 12 status flags; bit 0 mirrors the key-down line every cycle
    pub status: u16,

    /// Return offset of the last subroutine call (page is not saved)
    pub ret: u8,

    /// Latched code of the last key pressed
    pub key_code: u8,

    /// 4-bit pointer register
    pub p: u8,

    /// Selected storage register; 10 and above select nothing
    pub data_addr: u8,

    /// Word-select field of the current arithmetic instruction
    pub ws: WordSelect,

    pub carry: bool,
    pub key_down: bool,
    pub display_on: bool,
}

impl Registers {
    /// Create a register file in the power-on state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Borrow a register by id.
    pub fn reg(&self, id: RegId) -> &DigitReg {
        match id {
            RegId::A => &self.a,
            RegId::B => &self.b,
            RegId::C => &self.c,
            RegId::D => &self.d,
            RegId::E => &self.e,
            RegId::F => &self.f,
            RegId::M => &self.m,
        }
    }

    /// Mutably borrow a register by id.
    pub fn reg_mut(&mut self, id: RegId) -> &mut DigitReg {
        match id {
            RegId::A => &mut self.a,
            RegId::B => &mut self.b,
            RegId::C => &mut self.c,
            RegId::D => &mut self.d,
            RegId::E => &mut self.e,
            RegId::F => &mut self.f,
            RegId::M => &mut self.m,
        }
    }

    /// The cell range selected by the current word-select field and pointer.
    #[inline]
    pub fn field(&self) -> Field {
        self.ws.resolve(self.p)
    }

    /// ROM page (0-7).
    #[inline]
    pub fn page(&self) -> u8 {
        ((self.pc & PAGE_MASK) >> 8) as u8
    }

    /// Offset within the page.
    #[inline]
    pub fn offset(&self) -> u8 {
        (self.pc & OFFSET_MASK) as u8
    }

    /// Advance the offset by one, wrapping within the page.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u16 {
        let old = self.pc;
        self.pc = (self.pc & PAGE_MASK) | (self.pc.wrapping_add(1) & OFFSET_MASK);
        old
    }

    /// Jump to an offset within the current page.
    #[inline]
    pub fn jump(&mut self, offset: u8) {
        self.pc = (self.pc & PAGE_MASK) | offset as u16;
    }

    /// Select a ROM page, keeping the offset.
    #[inline]
    pub fn select_page(&mut self, page: u8) {
        self.pc = (self.pc & OFFSET_MASK) | (((page & 7) as u16) << 8);
    }

    /// Copy the key-down line into status bit 0.
    #[inline]
    pub fn latch_key_status(&mut self) {
        self.status = (self.status & !1) | self.key_down as u16;
    }

    /// Read status flag `n`.
    #[inline]
    pub fn flag(&self, n: u8) -> bool {
        self.status & (1 << n) != 0
    }

    /// Move the pointer by `delta` with 4-bit wraparound.
    #[inline]
    pub fn step_pointer(&mut self, delta: i8) {
        self.p = (self.p as i8).wrapping_add(delta) as u8 & POINTER_MASK;
    }

    /// The selected storage register, if the bank address is valid.
    pub fn selected_storage(&mut self) -> Option<&mut DigitReg> {
        self.storage.get_mut(self.data_addr as usize)
    }

    /// Latch a key code and raise the key-down line.
    pub fn key_down(&mut self, code: u8) {
        self.key_code = code;
        self.key_down = true;
    }

    /// Drop the key-down line. The latched code is kept.
    pub fn key_up(&mut self) {
        self.key_down = false;
    }

    /// True if every register cell holds a decimal digit and the counters
    /// fit their hardware widths.
    pub fn is_consistent(&self) -> bool {
        RegId::ALL.iter().all(|&id| self.reg(id).is_valid())
            && self.storage.iter().all(DigitReg::is_valid)
            && self.pc <= PAGE_MASK | OFFSET_MASK
            && self.p <= POINTER_MASK
            && self.status >> STATUS_FLAGS == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_pc_wraps_in_page() {
        let mut regs = Registers::new();
        regs.pc = 0x2FF;

        let old = regs.advance_pc();
        assert_eq!(old, 0x2FF);
        assert_eq!(regs.pc, 0x200);
        assert_eq!(regs.page(), 2);
        assert_eq!(regs.offset(), 0);
    }

    #[test]
    fn test_jump_and_select_page() {
        let mut regs = Registers::new();
        regs.pc = 0x312;

        regs.jump(0x3A);
        assert_eq!(regs.pc, 0x33A);

        regs.select_page(5);
        assert_eq!(regs.pc, 0x53A);
    }

    #[test]
    fn test_pointer_wraps_through_15() {
        let mut regs = Registers::new();
        regs.step_pointer(-1);
        assert_eq!(regs.p, 15);
        regs.step_pointer(1);
        assert_eq!(regs.p, 0);
    }

    #[test]
    fn test_key_status_latch() {
        let mut regs = Registers::new();
        regs.status = 0b1010;

        regs.key_down(0x24);
        regs.latch_key_status();
        assert_eq!(regs.status, 0b1011);

        regs.key_up();
        regs.latch_key_status();
        assert_eq!(regs.status, 0b1010);
        assert_eq!(regs.key_code, 0x24);
    }

    #[test]
    fn test_selected_storage_ignores_bad_bank() {
        let mut regs = Registers::new();
        regs.data_addr = 9;
        assert!(regs.selected_storage().is_some());
        regs.data_addr = 10;
        assert!(regs.selected_storage().is_none());
    }

    #[test]
    fn test_reset_is_power_on() {
        let mut regs = Registers::new();
        regs.c.set(3, 7);
        regs.pc = 0x123;
        regs.display_on = true;
        regs.reset();
        assert_eq!(regs, Registers::default());
        assert!(regs.is_consistent());
    }
}
