//! Front panel application state and logic.

use std::collections::HashSet;
use std::sync::Arc;
use crate::{Cpu, Rom};
use crate::asm::disasm::disassemble_word;
use crate::config::FrontendConfig;

/// Front panel state.
pub struct FrontPanel {
    /// The calculator being driven.
    pub cpu: Cpu,
    /// Pacing and keymap.
    pub config: FrontendConfig,
    /// Breakpoints (by 11-bit address).
    pub breakpoints: HashSet<u16>,
    /// Is the processor running at the paced rate?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Hex digits typed after `#`, or `None` outside a raw key entry.
    hex_entry: Option<String>,
    /// Cycle count at which the held key is released.
    release_at: Option<u64>,
}

impl FrontPanel {
    /// Create a front panel running `rom` from power-on.
    pub fn new(rom: Arc<Rom>, config: FrontendConfig) -> Self {
        Self {
            cpu: Cpu::new(rom),
            config,
            breakpoints: HashSet::new(),
            running: true,
            should_quit: false,
            status: "Running. F5 pause, F10 step, Esc quit.".into(),
            hex_entry: None,
            release_at: None,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        let pc = self.cpu.regs.pc;
        match self.cpu.step() {
            Ok(instr) => {
                self.status = format!("{:04o}: {}", pc, instr);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
        self.release_key_if_due();
    }

    /// Run one paced tick: `cycles_per_tick` instructions, stopping early at
    /// a breakpoint or an undefined word.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        for _ in 0..self.config.cycles_per_tick {
            if self.breakpoints.contains(&self.cpu.regs.pc) {
                self.running = false;
                self.status = format!("Breakpoint at {:04o}", self.cpu.regs.pc);
                return;
            }
            if let Err(e) = self.cpu.step() {
                self.running = false;
                self.status = format!("Error: {}", e);
                return;
            }
            self.release_key_if_due();
        }
    }

    fn release_key_if_due(&mut self) {
        if let Some(at) = self.release_at {
            if self.cpu.cycles >= at {
                self.cpu.key_up();
                self.release_at = None;
            }
        }
    }

    /// Hold a calculator key for the configured number of cycles.
    pub fn press(&mut self, code: u8) {
        self.cpu.key_down(code);
        self.release_at = Some(self.cpu.cycles + self.config.key_hold_cycles);
        self.status = format!("Key {:#04x}", code);
    }

    /// Handle a typed character: raw `#xx` entry first, then the keymap.
    pub fn type_char(&mut self, c: char) {
        if let Some(entry) = self.hex_entry.as_mut() {
            if !c.is_ascii_hexdigit() {
                self.hex_entry = None;
                self.status = format!("Invalid hex digit '{}'", c);
                return;
            }
            entry.push(c);
            if entry.len() == 2 {
                let code = u8::from_str_radix(entry, 16).ok();
                self.hex_entry = None;
                if let Some(code) = code {
                    self.press(code);
                }
            }
            return;
        }

        if c == '#' {
            self.hex_entry = Some(String::new());
            self.status = "Raw key code: type two hex digits".into();
            return;
        }

        match self.config.key_code(c) {
            Some(code) => self.press(code),
            None => self.status = format!("No key mapped to '{}'", c),
        }
    }

    /// Toggle between running and paused.
    pub fn toggle_run(&mut self) {
        self.running = !self.running;
        self.status = (if self.running { "Running." } else { "Paused." }).into();
    }

    /// Toggle breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at {:04o}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at {:04o}", pc);
        }
    }

    /// Power-cycle the calculator.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.release_at = None;
        self.hex_entry = None;
        self.status = "Reset.".into();
    }

    /// Disassembly around the current PC, within its page.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.cpu.regs.pc;
        let page_base = pc & crate::cpu::registers::PAGE_MASK;
        let offset = self.cpu.regs.offset() as usize;
        let start = offset.saturating_sub(lines / 2);

        (start..(start + lines).min(crate::cpu::PAGE_SIZE))
            .map(|off| {
                let addr = page_base | off as u16;
                let word = self.cpu.rom().read(addr);
                (addr, disassemble_word(word), addr == pc)
            })
            .collect()
    }
}

/// Run the front panel on a ROM image.
pub fn run_front_panel(rom: Arc<Rom>, config: FrontendConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::{Duration, Instant};

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let tick = Duration::from_millis(config.tick_ms);
    let mut app = FrontPanel::new(rom, config);
    let mut next_tick = Instant::now() + tick;

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input until the next tick is due
        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => app.should_quit = true,
                        KeyCode::F(5) => app.toggle_run(),
                        KeyCode::F(10) => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::F(9) => app.toggle_breakpoint(),
                        KeyCode::F(2) => app.reset(),
                        KeyCode::Enter => app.type_char('\n'),
                        KeyCode::Char(c) => app.type_char(c),
                        _ => {}
                    }
                }
            }
        }

        // Paced execution
        if Instant::now() >= next_tick {
            app.tick();
            next_tick += tick;
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{encode, Instruction, MiscOp};

    fn panel(config: FrontendConfig) -> FrontPanel {
        let words = [encode(&Instruction::Misc(MiscOp::KeyEntry))];
        FrontPanel::new(Arc::new(Rom::from_words(&words).unwrap()), config)
    }

    #[test]
    fn test_raw_key_entry() {
        let mut app = panel(FrontendConfig::default());
        app.type_char('#');
        app.type_char('2');
        app.type_char('a');
        assert!(app.cpu.regs.key_down);
        assert_eq!(app.cpu.regs.key_code, 0x2A);
    }

    #[test]
    fn test_keymap_and_release() {
        let mut config = FrontendConfig::default();
        config.keymap.insert("e".into(), 0x0E);
        config.key_hold_cycles = 3;
        let mut app = panel(config);

        app.type_char('e');
        assert_eq!(app.cpu.regs.key_code, 0x0E);

        app.running = false;
        for _ in 0..3 {
            app.step();
        }
        assert!(!app.cpu.regs.key_down);
    }

    #[test]
    fn test_tick_stops_at_breakpoint() {
        let mut app = panel(FrontendConfig::default());
        app.breakpoints.insert(0);
        app.tick();
        assert!(!app.running);
        assert_eq!(app.cpu.cycles, 0);
    }

    #[test]
    fn test_tick_runs_configured_cycles() {
        let mut app = panel(FrontendConfig::default());
        app.tick();
        assert_eq!(app.cpu.cycles, 35);
    }
}
