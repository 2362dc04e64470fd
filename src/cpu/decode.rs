//! Instruction decoder for the HP-45.
//!
//! Instructions are 10-bit words. The two low bits select the type:
//!
//! ```text
//! .... .... 01   subroutine call      (bits 2-9: target offset)
//! .... .... 11   conditional branch   (bits 2-9: target offset)
//! ..... ... 10   arithmetic/register  (bits 5-9: operation, bits 2-4: word select)
//! .... ..00 00   ROM select / misc
//! .... ..01 00   status operations
//! .... ..10 00   data entry / display
//! .... ..11 00   pointer operations
//! ```
//!
//! Each class decoder works on the 8-bit fragment in bits 2-9 and maps it
//! through a fixed table to a named operation. Fragments the hardware does not
//! define in the four strict classes decode to a [`DecodeError`] carrying the
//! class-specific negative status code.

use crate::bcd::WordSelect;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Arithmetic/register operations, one per 5-bit operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    // ==================== Clear ====================
    /// 0 -> A
    ClearA,
    /// 0 -> B
    ClearB,
    /// 0 -> C
    ClearC,

    // ==================== Transfer / Exchange ====================
    /// A -> B
    CopyAToB,
    /// B -> C
    CopyBToC,
    /// C -> A
    CopyCToA,
    /// A <-> B
    ExchangeAB,
    /// B <-> C
    ExchangeBC,
    /// C <-> A
    ExchangeCA,

    // ==================== Add / Subtract ====================
    /// A + C -> C
    AddACToC,
    /// A - C -> C
    SubACToC,
    /// A + B -> A
    AddABToA,
    /// A - B -> A
    SubABToA,
    /// A + C -> A
    AddACToA,
    /// A - C -> A
    SubACToA,
    /// C + C -> C
    DoubleC,

    // ==================== Compare ====================
    /// 0 - B: carry if B is nonzero
    TestBZero,
    /// 0 - C: carry if C is nonzero
    TestCZero,
    /// A - C: carry if A < C
    CompareAC,
    /// A - B: carry if A < B
    CompareAB,
    /// A - 1: carry if A < 1
    CompareAOne,
    /// C - 1: carry if C < 1
    CompareCOne,

    // ==================== Complement ====================
    /// 0 - C -> C (tens complement)
    NegateC,
    /// 0 - C - 1 -> C (nines complement)
    ComplementC,

    // ==================== Increment / Decrement ====================
    /// A + 1 -> A
    IncrementA,
    /// C + 1 -> C
    IncrementC,
    /// A - 1 -> A
    DecrementA,
    /// C - 1 -> C
    DecrementC,

    // ==================== Shift ====================
    ShiftRightA,
    ShiftRightB,
    ShiftRightC,
    ShiftLeftA,
}

impl ArithOp {
    /// Operation table indexed by the 5-bit operation code.
    pub const TABLE: [ArithOp; 32] = [
        ArithOp::TestBZero,   // 0
        ArithOp::ClearB,      // 1
        ArithOp::CompareAC,   // 2
        ArithOp::CompareCOne, // 3
        ArithOp::CopyBToC,    // 4
        ArithOp::NegateC,     // 5
        ArithOp::ClearC,      // 6
        ArithOp::ComplementC, // 7
        ArithOp::ShiftLeftA,  // 8
        ArithOp::CopyAToB,    // 9
        ArithOp::SubACToC,    // 10
        ArithOp::DecrementC,  // 11
        ArithOp::CopyCToA,    // 12
        ArithOp::TestCZero,   // 13
        ArithOp::AddACToC,    // 14
        ArithOp::IncrementC,  // 15
        ArithOp::CompareAB,   // 16
        ArithOp::ExchangeBC,  // 17
        ArithOp::ShiftRightC, // 18
        ArithOp::CompareAOne, // 19
        ArithOp::ShiftRightB, // 20
        ArithOp::DoubleC,     // 21
        ArithOp::ShiftRightA, // 22
        ArithOp::ClearA,      // 23
        ArithOp::SubABToA,    // 24
        ArithOp::ExchangeAB,  // 25
        ArithOp::SubACToA,    // 26
        ArithOp::DecrementA,  // 27
        ArithOp::AddABToA,    // 28
        ArithOp::ExchangeCA,  // 29
        ArithOp::AddACToA,    // 30
        ArithOp::IncrementA,  // 31
    ];

    /// Look up an operation code. `None` for codes outside the table.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::TABLE.get(code as usize).copied()
    }

    /// The 5-bit operation code.
    pub fn code(self) -> u8 {
        Self::TABLE
            .iter()
            .position(|&op| op == self)
            .map_or(0, |i| i as u8)
    }
}

/// Status flag operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusOp {
    /// 1 -> S(n)
    Set(u8),
    /// if S(n) = 1: carry
    Test(u8),
    /// 0 -> S(n)
    Clear(u8),
    /// Clear all 12 flags
    ClearAll,
}

/// Pointer register operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerOp {
    /// n -> P
    Set(u8),
    /// P - 1 -> P (4-bit wrap)
    Decrement,
    /// carry = (P = n)
    Test(u8),
    /// P + 1 -> P (4-bit wrap)
    Increment,
}

/// Data entry and display operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataOp {
    /// n -> C[P], then P - 1 -> P
    LoadConstant(u8),
    /// Toggle the display on/off
    ToggleDisplay,
    /// C <-> M
    ExchangeCM,
    /// C -> stack: F = E, E = D, D = C
    StackUp,
    /// stack -> A: A = D, D = E, E = F
    StackDown,
    /// Turn the display off
    DisplayOff,
    /// M -> C
    RecallM,
    /// storage[data address] -> C
    ReadStorage,
    /// C = D, D = E, E = F, F = old C
    RotateDown,
    /// 0 -> A, B, C, D, E, F, M
    ClearRegisters,
}

/// ROM select and miscellaneous operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MiscOp {
    /// No operation (all-zero word)
    Nop,
    /// Switch to ROM page n
    RomSelect(u8),
    /// Return to the saved offset in the current page
    Return,
    /// Jump to the latched key code in the current page
    KeyEntry,
    /// C[12] -> data address
    SendAddress,
    /// C -> storage[data address]
    SendData,
}

/// Decoded HP-45 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// ROM select / misc class
    Misc(MiscOp),
    /// Status class
    Status(StatusOp),
    /// Data entry / display class
    Data(DataOp),
    /// Pointer class
    Pointer(PointerOp),
    /// Subroutine call within the current page
    Call { target: u8 },
    /// Arithmetic/register class
    Arith { op: ArithOp, ws: WordSelect },
    /// Branch to target if carry is clear
    Branch { target: u8 },
}

impl Instruction {
    /// The all-zero word.
    pub const NOP: Instruction = Instruction::Misc(MiscOp::Nop);
}

/// Decode a ROM word.
pub fn decode(word: u16) -> Result<Instruction, DecodeError> {
    let fragment = (word >> 2) as u8;

    match word & 0b11 {
        0 => match fragment & 0b11 {
            0 => decode_misc(fragment).map(Instruction::Misc),
            1 => decode_status(fragment).map(Instruction::Status),
            2 => decode_data(fragment).map(Instruction::Data),
            _ => Ok(Instruction::Pointer(decode_pointer(fragment))),
        },
        1 => Ok(Instruction::Call { target: fragment }),
        2 => Ok(decode_arith(fragment)),
        _ => Ok(Instruction::Branch { target: fragment }),
    }
}

/// Arithmetic/register class. Codes missing from the table fall through as
/// a no-op rather than an error.
fn decode_arith(fragment: u8) -> Instruction {
    let ws = WordSelect::from_bits(fragment);
    match ArithOp::from_code(fragment >> 3) {
        Some(op) => Instruction::Arith { op, ws },
        None => Instruction::NOP,
    }
}

fn decode_status(fragment: u8) -> Result<StatusOp, DecodeError> {
    let n = fragment >> 4;
    let valid = n < crate::cpu::registers::STATUS_FLAGS;

    match (fragment >> 2) & 0b11 {
        0 if valid => Ok(StatusOp::Set(n)),
        0 => Err(DecodeError::SetFlag(n)),
        1 if valid => Ok(StatusOp::Test(n)),
        1 => Err(DecodeError::TestFlag(n)),
        2 if valid => Ok(StatusOp::Clear(n)),
        2 => Err(DecodeError::ClearFlag(n)),
        _ if n == 0 => Ok(StatusOp::ClearAll),
        _ => Err(DecodeError::ClearAllOperand(n)),
    }
}

fn decode_pointer(fragment: u8) -> PointerOp {
    let n = fragment >> 4;

    match (fragment >> 2) & 0b11 {
        0 => PointerOp::Set(n),
        1 => PointerOp::Decrement,
        2 => PointerOp::Test(n),
        _ => PointerOp::Increment,
    }
}

fn decode_data(fragment: u8) -> Result<DataOp, DecodeError> {
    let n = fragment >> 4;

    match (fragment >> 2) & 0b11 {
        0 => Err(DecodeError::DataEntryUnused(fragment)),
        1 if n < 10 => Ok(DataOp::LoadConstant(n)),
        1 => Err(DecodeError::ConstantOutOfRange(n)),
        _ => match n {
            0 => Ok(DataOp::ToggleDisplay),
            2 => Ok(DataOp::ExchangeCM),
            4 => Ok(DataOp::StackUp),
            6 => Ok(DataOp::StackDown),
            8 => Ok(DataOp::DisplayOff),
            10 => Ok(DataOp::RecallM),
            11 => Ok(DataOp::ReadStorage),
            12 => Ok(DataOp::RotateDown),
            14 => Ok(DataOp::ClearRegisters),
            1 | 5 | 9 | 13 => Err(DecodeError::InputToA(n)),
            _ => Err(DecodeError::BcdToC(n)),
        },
    }
}

fn decode_misc(fragment: u8) -> Result<MiscOp, DecodeError> {
    let n = fragment >> 5;

    if fragment & 0x04 != 0 {
        match (fragment >> 3) & 0b11 {
            0 => Ok(MiscOp::RomSelect(n)),
            1 => Ok(MiscOp::Return),
            2 if n & 1 != 0 => Ok(MiscOp::KeyEntry),
            2 => Err(DecodeError::ExternalKeyEntry(fragment)),
            _ if n & 0b101 == 0b100 => Ok(MiscOp::SendAddress),
            _ if n == 0b101 => Ok(MiscOp::SendData),
            _ => Err(DecodeError::StorageOperation(fragment)),
        }
    } else if fragment & 0x08 != 0 {
        Err(DecodeError::MiscType7(fragment))
    } else if fragment & 0x10 != 0 {
        Err(DecodeError::MiscType8(fragment))
    } else if fragment != 0 {
        Err(DecodeError::MiscType9(fragment))
    } else {
        Ok(MiscOp::Nop)
    }
}

/// Encode an instruction back to a ROM word.
///
/// Fields the hardware ignores (the operand of pointer increment and
/// decrement, the page bits of keyboard entry) encode as their canonical
/// values, so `encode(decode(w))` may differ from `w` in those bits.
pub fn encode(instr: &Instruction) -> u16 {
    let (fragment, tag): (u8, u16) = match *instr {
        Instruction::Misc(op) => {
            let fragment = match op {
                MiscOp::Nop => 0,
                MiscOp::RomSelect(n) => (n & 7) << 5 | 0b0_0100,
                MiscOp::Return => 0b0_1100,
                MiscOp::KeyEntry => 1 << 5 | 0b1_0100,
                MiscOp::SendAddress => 4 << 5 | 0b1_1100,
                MiscOp::SendData => 5 << 5 | 0b1_1100,
            };
            (fragment, 0)
        }
        Instruction::Status(op) => {
            let (n, sub) = match op {
                StatusOp::Set(n) => (n, 0),
                StatusOp::Test(n) => (n, 1),
                StatusOp::Clear(n) => (n, 2),
                StatusOp::ClearAll => (0, 3),
            };
            ((n & 0xF) << 4 | sub << 2 | 0b01, 0)
        }
        Instruction::Data(op) => {
            let (n, sub) = match op {
                DataOp::LoadConstant(n) => (n, 1),
                DataOp::ToggleDisplay => (0, 2),
                DataOp::ExchangeCM => (2, 2),
                DataOp::StackUp => (4, 2),
                DataOp::StackDown => (6, 2),
                DataOp::DisplayOff => (8, 2),
                DataOp::RecallM => (10, 2),
                DataOp::ReadStorage => (11, 2),
                DataOp::RotateDown => (12, 2),
                DataOp::ClearRegisters => (14, 2),
            };
            ((n & 0xF) << 4 | sub << 2 | 0b10, 0)
        }
        Instruction::Pointer(op) => {
            let (n, sub) = match op {
                PointerOp::Set(n) => (n, 0),
                PointerOp::Decrement => (0, 1),
                PointerOp::Test(n) => (n, 2),
                PointerOp::Increment => (0, 3),
            };
            ((n & 0xF) << 4 | sub << 2 | 0b11, 0)
        }
        Instruction::Call { target } => (target, 1),
        Instruction::Arith { op, ws } => (op.code() << 3 | ws.bits(), 2),
        Instruction::Branch { target } => (target, 3),
    };

    (fragment as u16) << 2 | tag
}

/// Undefined instruction fragments, one variant per hardware case.
///
/// Each variant maps to the negative status code returned by [`code`](Self::code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    // ==================== ROM select / misc ====================
    #[error("external key code entry is not supported (fragment {0:#04x})")]
    ExternalKeyEntry(u8),

    #[error("undefined data storage operation (fragment {0:#04x})")]
    StorageOperation(u8),

    #[error("undefined type 7 instruction (fragment {0:#04x})")]
    MiscType7(u8),

    #[error("undefined type 8 instruction (fragment {0:#04x})")]
    MiscType8(u8),

    #[error("undefined type 9/10 instruction (fragment {0:#04x})")]
    MiscType9(u8),

    // ==================== Status ====================
    #[error("set flag {0}: no such status flag")]
    SetFlag(u8),

    #[error("interrogate flag {0}: no such status flag")]
    TestFlag(u8),

    #[error("reset flag {0}: no such status flag")]
    ClearFlag(u8),

    #[error("clear status takes no operand, got {0}")]
    ClearAllOperand(u8),

    // ==================== Data entry / display ====================
    #[error("undefined data entry instruction (fragment {0:#04x})")]
    DataEntryUnused(u8),

    #[error("load constant {0}: not a decimal digit")]
    ConstantOutOfRange(u8),

    #[error("Is -> A transfer is not supported (n = {0})")]
    InputToA(u8),

    #[error("BCD -> C transfer is not supported (n = {0})")]
    BcdToC(u8),
}

impl DecodeError {
    /// Negative status code for this case, distinct within its class.
    pub fn code(&self) -> i32 {
        match self {
            DecodeError::ExternalKeyEntry(_) => -1,
            DecodeError::StorageOperation(_) => -2,
            DecodeError::MiscType7(_) => -3,
            DecodeError::MiscType8(_) => -4,
            DecodeError::MiscType9(_) => -5,

            DecodeError::SetFlag(_) => -2,
            DecodeError::TestFlag(_) => -4,
            DecodeError::ClearFlag(_) => -7,
            DecodeError::ClearAllOperand(_) => -10,

            DecodeError::DataEntryUnused(_) => -1,
            DecodeError::ConstantOutOfRange(_) => -2,
            DecodeError::InputToA(_) => -3,
            DecodeError::BcdToC(_) => -4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zero_is_nop() {
        assert_eq!(decode(0).unwrap(), Instruction::NOP);
    }

    #[test]
    fn test_arith_table_is_complete() {
        for code in 0..32u8 {
            let op = ArithOp::from_code(code).unwrap();
            assert_eq!(op.code(), code);
        }
        assert_eq!(ArithOp::from_code(32), None);
    }

    #[test]
    fn test_known_words() {
        // 0 -> A[w]: op 23, ws 3
        assert_eq!(
            decode(0x2EE).unwrap(),
            Instruction::Arith { op: ArithOp::ClearA, ws: WordSelect::W }
        );
        assert_eq!(decode(0x028).unwrap(), Instruction::Data(DataOp::ToggleDisplay));
        assert_eq!(decode(0x3A8).unwrap(), Instruction::Data(DataOp::ClearRegisters));
        assert_eq!(decode(0x034).unwrap(), Instruction::Status(StatusOp::ClearAll));
        assert_eq!(decode(0x030).unwrap(), Instruction::Misc(MiscOp::Return));
        assert_eq!(decode(0x0EB).unwrap(), Instruction::Branch { target: 0x3A });
    }

    #[test]
    fn test_call_and_branch_targets() {
        assert_eq!(decode(0x3FD).unwrap(), Instruction::Call { target: 0xFF });
        assert_eq!(decode(0x3FF).unwrap(), Instruction::Branch { target: 0xFF });
    }

    #[test]
    fn test_status_errors() {
        let set12 = (12 << 4 | 0b01) << 2;
        assert_eq!(decode(set12), Err(DecodeError::SetFlag(12)));
        assert_eq!(DecodeError::SetFlag(12).code(), -2);

        let test15 = (15 << 4 | 1 << 2 | 0b01) << 2;
        assert_eq!(decode(test15).map_err(|e| e.code()), Err(-4));

        let clear13 = (13 << 4 | 2 << 2 | 0b01) << 2;
        assert_eq!(decode(clear13).map_err(|e| e.code()), Err(-7));

        let clear_all_3 = (3 << 4 | 3 << 2 | 0b01) << 2;
        assert_eq!(decode(clear_all_3).map_err(|e| e.code()), Err(-10));
    }

    #[test]
    fn test_data_entry_errors() {
        assert_eq!(decode(0b10 << 2).map_err(|e| e.code()), Err(-1));
        assert_eq!(decode((10 << 4 | 1 << 2 | 0b10) << 2).map_err(|e| e.code()), Err(-2));
        for n in [1u16, 5, 9, 13] {
            assert_eq!(decode((n << 4 | 2 << 2 | 0b10) << 2).map_err(|e| e.code()), Err(-3));
        }
        for n in [3u16, 7, 15] {
            assert_eq!(decode((n << 4 | 3 << 2 | 0b10) << 2).map_err(|e| e.code()), Err(-4));
        }
    }

    #[test]
    fn test_misc_errors() {
        // External key entry: type 6 sub 2 with even n
        assert_eq!(decode(0b1_0100 << 2).map_err(|e| e.code()), Err(-1));
        // Storage sub-op with n = 1
        assert_eq!(decode((1 << 5 | 0b1_1100) << 2).map_err(|e| e.code()), Err(-2));
        assert_eq!(decode(0b1000 << 2).map_err(|e| e.code()), Err(-3));
        assert_eq!(decode(0b1_0000 << 2).map_err(|e| e.code()), Err(-4));
        assert_eq!(decode(0b10_0000 << 2).map_err(|e| e.code()), Err(-5));
    }

    #[test]
    fn test_send_address_accepts_both_encodings() {
        for n in [4u16, 6] {
            assert_eq!(
                decode((n << 5 | 0b1_1100) << 2).unwrap(),
                Instruction::Misc(MiscOp::SendAddress)
            );
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let test_cases = [
            Instruction::NOP,
            Instruction::Misc(MiscOp::RomSelect(6)),
            Instruction::Misc(MiscOp::KeyEntry),
            Instruction::Misc(MiscOp::SendData),
            Instruction::Status(StatusOp::Test(11)),
            Instruction::Pointer(PointerOp::Set(13)),
            Instruction::Pointer(PointerOp::Increment),
            Instruction::Data(DataOp::LoadConstant(9)),
            Instruction::Data(DataOp::RotateDown),
            Instruction::Call { target: 0x80 },
            Instruction::Arith { op: ArithOp::ComplementC, ws: WordSelect::Ms },
            Instruction::Branch { target: 0x12 },
        ];

        for instr in test_cases {
            assert_eq!(decode(encode(&instr)).unwrap(), instr);
        }
    }
}
