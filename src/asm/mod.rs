//! Disassembler for HP-45 ROM images.
//!
//! Provides mnemonic rendering of decoded instructions ([`std::fmt::Display`]
//! for [`Instruction`](crate::cpu::Instruction)) and ROM page listings.

pub mod disasm;

pub use disasm::{disassemble, disassemble_page, disassemble_word};
