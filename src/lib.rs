//! # HP-45 Emulator
//!
//! An emulator of the processor inside the Hewlett-Packard HP-45 (1973)
//! scientific calculator.
//!
//! The HP-45 runs its firmware on a serial BCD processor: 14-digit decimal
//! registers, 10-bit instruction words and a ROM of eight 256-word pages.
//! This crate models that processor one word cycle at a time, plus the
//! seven-segment display it drives.

pub mod bcd;
pub mod cpu;
pub mod asm;
pub mod display;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use bcd::{DigitReg, WordSelect, Field};
pub use cpu::{Cpu, CpuError, Rom, RomError, Registers, Instruction, DecodeError};
pub use cpu::{save_state, load_state, SnapshotError};
pub use config::{FrontendConfig, ConfigError};

#[cfg(feature = "tui")]
pub use tui::run_front_panel;
