//! WebAssembly bindings for the HP-45 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use std::sync::Arc;
use wasm_bindgen::prelude::*;
use crate::{Cpu, Rom};
use crate::asm::disasm::disassemble_word;
use crate::display::{display_text, render_registers};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly calculator wrapper.
#[wasm_bindgen]
pub struct WasmCalculator {
    cpu: Cpu,
}

#[wasm_bindgen]
impl WasmCalculator {
    /// Create a calculator with a blank ROM.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(Arc::new(Rom::blank())),
        }
    }

    /// Load a ROM from a text listing and power-cycle.
    #[wasm_bindgen]
    pub fn load_rom_text(&mut self, source: &str) -> Result<(), JsError> {
        let rom = Rom::parse(source).map_err(|e| JsError::new(&e.to_string()))?;
        self.cpu = Cpu::new(Arc::new(rom));
        Ok(())
    }

    /// Load a ROM from a `Uint16Array` of words and power-cycle.
    #[wasm_bindgen]
    pub fn load_rom_words(&mut self, words: &[u16]) -> Result<(), JsError> {
        let rom = Rom::from_words(words).map_err(|e| JsError::new(&e.to_string()))?;
        self.cpu = Cpu::new(Arc::new(rom));
        Ok(())
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.cpu.step()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(instr.to_string())
    }

    /// Run up to `cycles` instructions. Returns the status code of the last
    /// one: 0, or the negative code of an undefined word that stopped the run.
    #[wasm_bindgen]
    pub fn run(&mut self, cycles: u32) -> i32 {
        match self.cpu.run_limited(cycles as u64) {
            Ok(_) => 0,
            Err(e) => e.code(),
        }
    }

    /// Press a calculator key.
    #[wasm_bindgen]
    pub fn key_down(&mut self, code: u8) {
        self.cpu.key_down(code);
    }

    /// Release the key.
    #[wasm_bindgen]
    pub fn key_up(&mut self) {
        self.cpu.key_up();
    }

    /// Power-cycle, keeping the ROM.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.cpu.regs.pc
    }

    /// Seven-segment bitmaps, leftmost position first.
    #[wasm_bindgen]
    pub fn display_segments(&self) -> Vec<u8> {
        render_registers(&self.cpu.regs).to_vec()
    }

    /// Display as text.
    #[wasm_bindgen]
    pub fn display(&self) -> String {
        display_text(&render_registers(&self.cpu.regs))
    }

    /// Get registers as JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        crate::cpu::snapshot::to_json(&self.cpu.regs).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Restore registers from a JSON snapshot.
    #[wasm_bindgen]
    pub fn load_registers_json(&mut self, json: &str) -> Result<(), JsError> {
        self.cpu.regs = crate::cpu::snapshot::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Disassemble the word at an address.
    #[wasm_bindgen]
    pub fn disassemble_at(&self, addr: u16) -> String {
        disassemble_word(self.cpu.rom().read(addr))
    }
}

impl Default for WasmCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Disassemble a single ROM word.
#[wasm_bindgen]
pub fn wasm_disassemble(word: u16) -> String {
    disassemble_word(word)
}

/// Build a `Uint16Array` view of a JS array of numbers.
#[wasm_bindgen]
pub fn words_from_array(values: &js_sys::Array) -> Vec<u16> {
    values
        .iter()
        .filter_map(|v| v.as_f64())
        .map(|f| f as u16)
        .collect()
}
