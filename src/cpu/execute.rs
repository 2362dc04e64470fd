//! CPU execution engine for the HP-45.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.
//! One call to [`Cpu::step`] is one word cycle of the real machine; pacing
//! (about 3500 cycles per second) is left to the caller.

use std::sync::Arc;
use crate::bcd::{arith, DigitReg};
use crate::cpu::{Registers, Rom};
use crate::cpu::decode::{self, Instruction, ArithOp, StatusOp, PointerOp, DataOp, MiscOp, DecodeError};
use crate::cpu::registers::RegId;
use thiserror::Error;

/// The HP-45 processor.
#[derive(Clone)]
pub struct Cpu {
    /// Processor state.
    pub regs: Registers,
    /// Instruction memory, shared between engines running the same firmware.
    rom: Arc<Rom>,
    /// Word cycles executed since reset.
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a processor in the power-on state running `rom`.
    pub fn new(rom: Arc<Rom>) -> Self {
        Self {
            regs: Registers::new(),
            rom,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset to the power-on state. The ROM is kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.cycles = 0;
        self.last_instr = None;
    }

    /// The instruction memory.
    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Press a key: latch its code and raise the key-down line.
    pub fn key_down(&mut self, code: u8) {
        self.regs.key_down(code);
    }

    /// Release the key. The latched code is kept.
    pub fn key_up(&mut self) {
        self.regs.key_up();
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or the decode error for an
    /// undefined word. On error the program counter advance, key latch and
    /// carry clear have already happened; nothing else is touched.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        // Fetch
        let addr = self.regs.pc;
        let word = self.rom.read(addr);

        // Advance PC before execute (jumps and branches will override)
        self.regs.advance_pc();
        self.regs.latch_key_status();
        self.cycles += 1;

        // Decode
        let instr = match decode::decode(word) {
            Ok(instr) => instr,
            Err(source) => {
                self.regs.carry = false;
                return Err(CpuError::Undefined { addr, word, source });
            }
        };

        // A branch tests the carry left by the previous instruction
        if !matches!(instr, Instruction::Branch { .. }) {
            self.regs.carry = false;
        }

        // Execute
        self.execute(instr);
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Execute a single instruction and report it as a status code:
    /// 0 on success, the decoder's negative code for an undefined word.
    pub fn step_status(&mut self) -> i32 {
        match self.step() {
            Ok(_) => 0,
            Err(e) => e.code(),
        }
    }

    /// Run for at most `max_cycles` instructions, stopping at the first
    /// undefined word.
    ///
    /// Returns the number of instructions executed.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: Instruction) {
        match instr {
            Instruction::Misc(op) => self.exec_misc(op),
            Instruction::Status(op) => self.exec_status(op),
            Instruction::Data(op) => self.exec_data(op),
            Instruction::Pointer(op) => self.exec_pointer(op),

            Instruction::Call { target } => {
                self.regs.ret = self.regs.offset();
                self.regs.jump(target);
            }

            Instruction::Arith { op, ws } => {
                self.regs.ws = ws;
                self.exec_arith(op);
            }

            Instruction::Branch { target } => {
                if !self.regs.carry {
                    self.regs.jump(target);
                }
                self.regs.carry = false;
            }
        }
    }

    fn exec_arith(&mut self, op: ArithOp) {
        let field = self.regs.field();
        let r = &mut self.regs;

        // Scratch field for the constant 1, local to this instruction.
        let one = || {
            let mut t = DigitReg::zero();
            arith::set_one(&mut t, field);
            t
        };

        match op {
            // ==================== Clear ====================
            ArithOp::ClearA => arith::copy(&mut r.a, &DigitReg::ZERO, field),
            ArithOp::ClearB => arith::copy(&mut r.b, &DigitReg::ZERO, field),
            ArithOp::ClearC => arith::copy(&mut r.c, &DigitReg::ZERO, field),

            // ==================== Transfer / Exchange ====================
            ArithOp::CopyAToB => arith::copy(&mut r.b, &r.a, field),
            ArithOp::CopyBToC => arith::copy(&mut r.c, &r.b, field),
            ArithOp::CopyCToA => arith::copy(&mut r.a, &r.c, field),
            ArithOp::ExchangeAB => arith::exchange(&mut r.a, &mut r.b, field),
            ArithOp::ExchangeBC => arith::exchange(&mut r.b, &mut r.c, field),
            ArithOp::ExchangeCA => arith::exchange(&mut r.a, &mut r.c, field),

            // ==================== Add / Subtract ====================
            ArithOp::AddACToC => r.carry = arith::add(r.a, r.c, &mut r.c, field),
            ArithOp::SubACToC => r.carry = arith::subtract(r.a, r.c, &mut r.c, field),
            ArithOp::AddABToA => r.carry = arith::add(r.a, r.b, &mut r.a, field),
            ArithOp::SubABToA => r.carry = arith::subtract(r.a, r.b, &mut r.a, field),
            ArithOp::AddACToA => r.carry = arith::add(r.a, r.c, &mut r.a, field),
            ArithOp::SubACToA => r.carry = arith::subtract(r.a, r.c, &mut r.a, field),
            ArithOp::DoubleC => r.carry = arith::add(r.c, r.c, &mut r.c, field),

            // ==================== Compare ====================
            ArithOp::TestBZero => r.carry |= arith::compare_zero(&r.b, field),
            ArithOp::TestCZero => r.carry |= arith::compare_zero(&r.c, field),
            ArithOp::CompareAC => r.carry |= arith::compare_ge(&r.a, &r.c, field),
            ArithOp::CompareAB => r.carry |= arith::compare_ge(&r.a, &r.b, field),
            ArithOp::CompareAOne => r.carry |= arith::compare_ge(&r.a, &one(), field),
            ArithOp::CompareCOne => r.carry |= arith::compare_ge(&r.c, &one(), field),

            // ==================== Complement ====================
            ArithOp::NegateC => {
                r.carry = arith::subtract(DigitReg::ZERO, r.c, &mut r.c, field);
            }
            ArithOp::ComplementC => {
                arith::subtract(DigitReg::ZERO, r.c, &mut r.c, field);
                r.carry = arith::subtract(r.c, one(), &mut r.c, field);
            }

            // ==================== Increment / Decrement ====================
            ArithOp::IncrementA => r.carry = arith::add(r.a, one(), &mut r.a, field),
            ArithOp::IncrementC => r.carry = arith::add(r.c, one(), &mut r.c, field),
            ArithOp::DecrementA => r.carry = arith::subtract(r.a, one(), &mut r.a, field),
            ArithOp::DecrementC => r.carry = arith::subtract(r.c, one(), &mut r.c, field),

            // ==================== Shift ====================
            ArithOp::ShiftRightA => arith::shift_right(&mut r.a, field),
            ArithOp::ShiftRightB => arith::shift_right(&mut r.b, field),
            ArithOp::ShiftRightC => arith::shift_right(&mut r.c, field),
            ArithOp::ShiftLeftA => arith::shift_left(&mut r.a, field),
        }
    }

    fn exec_status(&mut self, op: StatusOp) {
        let r = &mut self.regs;
        match op {
            StatusOp::Set(n) => r.status |= 1 << n,
            StatusOp::Test(n) => {
                if r.flag(n) {
                    r.carry = true;
                }
            }
            StatusOp::Clear(n) => r.status &= !(1 << n),
            StatusOp::ClearAll => r.status = 0,
        }
    }

    fn exec_pointer(&mut self, op: PointerOp) {
        let r = &mut self.regs;
        match op {
            PointerOp::Set(n) => r.p = n,
            PointerOp::Decrement => r.step_pointer(-1),
            PointerOp::Test(n) => r.carry = r.p == n,
            PointerOp::Increment => r.step_pointer(1),
        }
    }

    fn exec_data(&mut self, op: DataOp) {
        let r = &mut self.regs;
        match op {
            DataOp::LoadConstant(n) => {
                if (r.p as usize) < crate::bcd::CELLS {
                    r.c.set(r.p as usize, n);
                }
                r.step_pointer(-1);
            }
            DataOp::ToggleDisplay => r.display_on = !r.display_on,
            DataOp::ExchangeCM => std::mem::swap(&mut r.c, &mut r.m),
            DataOp::StackUp => {
                r.f = r.e;
                r.e = r.d;
                r.d = r.c;
            }
            DataOp::StackDown => {
                r.a = r.d;
                r.d = r.e;
                r.e = r.f;
            }
            DataOp::DisplayOff => r.display_on = false,
            DataOp::RecallM => r.c = r.m,
            DataOp::ReadStorage => {
                if let Some(&value) = r.storage.get(r.data_addr as usize) {
                    r.c = value;
                }
            }
            DataOp::RotateDown => {
                let t = r.c;
                r.c = r.d;
                r.d = r.e;
                r.e = r.f;
                r.f = t;
            }
            DataOp::ClearRegisters => {
                for id in RegId::ALL {
                    *r.reg_mut(id) = DigitReg::ZERO;
                }
            }
        }
    }

    fn exec_misc(&mut self, op: MiscOp) {
        let r = &mut self.regs;
        match op {
            MiscOp::Nop => {}
            MiscOp::RomSelect(page) => r.select_page(page),
            MiscOp::Return => {
                let ret = r.ret;
                r.jump(ret);
            }
            MiscOp::KeyEntry => {
                let key = r.key_code;
                r.jump(key);
            }
            MiscOp::SendAddress => r.data_addr = r.c.get(12),
            MiscOp::SendData => {
                let value = r.c;
                if let Some(slot) = r.selected_storage() {
                    *slot = value;
                }
            }
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("rom", &self.rom)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, Error)]
pub enum CpuError {
    #[error("undefined instruction {word:#05x} at {addr:#05x}: {source}")]
    Undefined {
        addr: u16,
        word: u16,
        source: DecodeError,
    },
}

impl CpuError {
    /// The negative status code of the hardware contract.
    pub fn code(&self) -> i32 {
        match self {
            CpuError::Undefined { source, .. } => source.code(),
        }
    }
}
