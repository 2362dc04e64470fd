//! CPU emulation for the HP-45 calculator.
//!
//! This module implements the HP-45 (1973) processor:
//! - 2048 ten-bit ROM words in 8 pages of 256
//! - 7 fourteen-digit BCD registers (A, B, C, D, E, F, M) and 10 storage registers
//! - 12 status flags, a 4-bit pointer and a one-level return address
//! - Instruction classes: call, branch, arithmetic and four register-control groups

pub mod rom;
pub mod registers;
pub mod decode;
pub mod execute;
pub mod snapshot;

pub use rom::{Rom, RomError, ROM_SIZE, PAGE_SIZE};
pub use registers::{Registers, RegId};
pub use decode::{decode, encode, Instruction, ArithOp, StatusOp, PointerOp, DataOp, MiscOp, DecodeError};
pub use execute::{Cpu, CpuError};
pub use snapshot::{save_state, load_state, SnapshotError};
