//! Disassembler for HP-45 firmware.
//!
//! Renders instructions in the register-transfer notation of the
//! calculator's own microcode listings (`a + c -> c[m]`, `if no carry go to`).

use std::fmt;
use crate::cpu::decode::{decode, Instruction, ArithOp, StatusOp, PointerOp, DataOp, MiscOp};
use crate::cpu::rom::{Rom, PAGE_SIZE};

impl ArithOp {
    /// Register-transfer text without the field suffix.
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::ClearA => "0 -> a",
            ArithOp::ClearB => "0 -> b",
            ArithOp::ClearC => "0 -> c",
            ArithOp::CopyAToB => "a -> b",
            ArithOp::CopyBToC => "b -> c",
            ArithOp::CopyCToA => "c -> a",
            ArithOp::ExchangeAB => "a exchange b",
            ArithOp::ExchangeBC => "b exchange c",
            ArithOp::ExchangeCA => "c exchange a",
            ArithOp::AddACToC => "a + c -> c",
            ArithOp::SubACToC => "a - c -> c",
            ArithOp::AddABToA => "a + b -> a",
            ArithOp::SubABToA => "a - b -> a",
            ArithOp::AddACToA => "a + c -> a",
            ArithOp::SubACToA => "a - c -> a",
            ArithOp::DoubleC => "c + c -> c",
            ArithOp::TestBZero => "if b = 0",
            ArithOp::TestCZero => "if c = 0",
            ArithOp::CompareAC => "if a >= c",
            ArithOp::CompareAB => "if a >= b",
            ArithOp::CompareAOne => "if a >= 1",
            ArithOp::CompareCOne => "if c >= 1",
            ArithOp::NegateC => "0 - c -> c",
            ArithOp::ComplementC => "0 - c - 1 -> c",
            ArithOp::IncrementA => "a + 1 -> a",
            ArithOp::IncrementC => "c + 1 -> c",
            ArithOp::DecrementA => "a - 1 -> a",
            ArithOp::DecrementC => "c - 1 -> c",
            ArithOp::ShiftRightA => "shift right a",
            ArithOp::ShiftRightB => "shift right b",
            ArithOp::ShiftRightC => "shift right c",
            ArithOp::ShiftLeftA => "shift left a",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Misc(op) => match op {
                MiscOp::Nop => write!(f, "no operation"),
                MiscOp::RomSelect(n) => write!(f, "select rom {}", n),
                MiscOp::Return => write!(f, "return"),
                MiscOp::KeyEntry => write!(f, "keys -> rom address"),
                MiscOp::SendAddress => write!(f, "c -> data address"),
                MiscOp::SendData => write!(f, "c -> data"),
            },
            Instruction::Status(op) => match op {
                StatusOp::Set(n) => write!(f, "1 -> s{}", n),
                StatusOp::Test(n) => write!(f, "if s{} = 0", n),
                StatusOp::Clear(n) => write!(f, "0 -> s{}", n),
                StatusOp::ClearAll => write!(f, "clear status"),
            },
            Instruction::Data(op) => match op {
                DataOp::LoadConstant(n) => write!(f, "load constant {}", n),
                DataOp::ToggleDisplay => write!(f, "display toggle"),
                DataOp::ExchangeCM => write!(f, "c exchange m"),
                DataOp::StackUp => write!(f, "c -> stack"),
                DataOp::StackDown => write!(f, "stack -> a"),
                DataOp::DisplayOff => write!(f, "display off"),
                DataOp::RecallM => write!(f, "m -> c"),
                DataOp::ReadStorage => write!(f, "data -> c"),
                DataOp::RotateDown => write!(f, "down rotate"),
                DataOp::ClearRegisters => write!(f, "clear registers"),
            },
            Instruction::Pointer(op) => match op {
                PointerOp::Set(n) => write!(f, "{} -> p", n),
                PointerOp::Decrement => write!(f, "p - 1 -> p"),
                PointerOp::Test(n) => write!(f, "if p # {}", n),
                PointerOp::Increment => write!(f, "p + 1 -> p"),
            },
            Instruction::Call { target } => write!(f, "jsb {:#04x}", target),
            Instruction::Arith { op, ws } => write!(f, "{}[{}]", op.mnemonic(), ws.mnemonic()),
            Instruction::Branch { target } => write!(f, "if no carry go to {:#04x}", target),
        }
    }
}

/// Disassemble a single ROM word.
pub fn disassemble_word(word: u16) -> String {
    match decode(word) {
        Ok(instr) => instr.to_string(),
        Err(e) => format!("??? ; {}", e.code()),
    }
}

/// Listing of one ROM page: address, octal word and mnemonic per line.
pub fn disassemble_page(rom: &Rom, page: u8) -> String {
    let mut output = String::new();
    output.push_str(&format!("; HP-45 ROM page {}\n", page & 7));
    output.push_str("; ----------------\n\n");

    let base = (page as usize & 7) * PAGE_SIZE;
    for (offset, &word) in rom.page(page).iter().enumerate() {
        output.push_str(&format!(
            "{:04o}: {:04o}  {}\n",
            base + offset,
            word,
            disassemble_word(word)
        ));
    }

    output
}

/// Listing of the whole ROM.
pub fn disassemble(rom: &Rom) -> String {
    (0..8).map(|page| disassemble_page(rom, page)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcd::WordSelect;
    use crate::cpu::decode::encode;

    #[test]
    fn test_arith_with_field() {
        let word = encode(&Instruction::Arith { op: ArithOp::AddACToC, ws: WordSelect::M });
        assert_eq!(disassemble_word(word), "a + c -> c[m]");
    }

    #[test]
    fn test_branch_and_call() {
        assert_eq!(disassemble_word(0x0EB), "if no carry go to 0x3a");
        assert_eq!(disassemble_word(0x0E9), "jsb 0x3a");
    }

    #[test]
    fn test_undefined_shows_code() {
        // set flag 12
        assert_eq!(disassemble_word((12 << 4 | 0b01) << 2), "??? ; -2");
    }

    #[test]
    fn test_page_listing() {
        let mut image = vec![0u16; 0x102];
        image[0x101] = encode(&Instruction::Pointer(PointerOp::Set(13)));
        let rom = Rom::from_words(&image).unwrap();

        let listing = disassemble_page(&rom, 1);
        assert!(listing.contains("0401:"));
        assert!(listing.contains("13 -> p"));
        assert_eq!(listing.lines().filter(|l| l.contains("no operation")).count(), PAGE_SIZE - 1);
    }
}
