//! Terminal front panel for the HP-45 emulator.
//!
//! Provides an interactive terminal calculator with:
//! - Seven-segment display rendered as text
//! - Register, status and pointer view
//! - Paced execution at the configured cycle rate
//! - Keymap input, raw `#xx` key codes, step and breakpoint controls

mod app;
mod ui;

pub use app::{FrontPanel, run_front_panel};
