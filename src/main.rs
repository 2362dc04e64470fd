//! HP-45 Emulator - CLI Entry Point
//!
//! Commands:
//! - `hp45-emu run <rom>` - Run firmware, optionally pressing scripted keys
//! - `hp45-emu disasm <rom>` - Disassemble a ROM image
//! - `hp45-emu front <rom>` - Interactive terminal front panel

use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use hp45::{Cpu, Rom, FrontendConfig};

#[derive(Parser)]
#[command(name = "hp45-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the HP-45 scientific calculator processor")]
struct Cli {
    /// JSON front-end configuration (pacing, key timing, keymap)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run firmware for a number of cycles
    Run {
        /// Path to the ROM image (.bin/.rom binary, anything else text)
        rom: PathBuf,
        /// Cycles to run before the first key press (default: 10000)
        #[arg(short = 'n', long, default_value = "10000")]
        cycles: u64,
        /// Key codes to press in order, e.g. `0x24,0x13`
        #[arg(short, long, value_delimiter = ',', value_parser = parse_key_code)]
        keys: Vec<u8>,
        /// Keep executing past undefined instructions
        #[arg(long)]
        keep_going: bool,
        /// Restore processor state from a snapshot before running
        #[arg(long)]
        load_state: Option<PathBuf>,
        /// Save processor state to a snapshot after running
        #[arg(long)]
        save_state: Option<PathBuf>,
    },
    /// Disassemble a ROM image
    Disasm {
        /// Path to the ROM image
        rom: PathBuf,
        /// Only list this page (0-7)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..8))]
        page: Option<u8>,
    },
    /// Interactive terminal front panel
    Front {
        /// Path to the ROM image
        rom: PathBuf,
    },
}

fn parse_key_code(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid key code '{}': {}", s, e))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hp45=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run { rom, cycles, keys, keep_going, load_state, save_state } => {
            let options = RunOptions { cycles, keys, keep_going, load_state, save_state };
            run_rom(&rom, &config, &options);
        }
        Commands::Disasm { rom, page } => {
            disassemble_file(&rom, page);
        }
        Commands::Front { rom } => {
            front_panel(&rom, config);
        }
    }
}

fn load_config(path: Option<&Path>) -> FrontendConfig {
    match path {
        Some(path) => match FrontendConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FrontendConfig::default(),
    }
}

fn load_rom(path: &Path) -> Arc<Rom> {
    match Rom::load(path) {
        Ok(rom) => Arc::new(rom),
        Err(e) => {
            eprintln!("❌ Failed to load ROM: {}", e);
            std::process::exit(1);
        }
    }
}

struct RunOptions {
    cycles: u64,
    keys: Vec<u8>,
    keep_going: bool,
    load_state: Option<PathBuf>,
    save_state: Option<PathBuf>,
}

/// Run `n` cycles. Returns false if an undefined word stopped the run.
fn run_cycles(cpu: &mut Cpu, n: u64, keep_going: bool) -> bool {
    for _ in 0..n {
        if let Err(e) = cpu.step() {
            if keep_going {
                tracing::warn!("{} (status {})", e, e.code());
            } else {
                eprintln!("❌ CPU error after {} cycles: {}", cpu.cycles, e);
                return false;
            }
        }
    }
    true
}

fn run_rom(path: &Path, config: &FrontendConfig, options: &RunOptions) {
    use hp45::cpu::registers::{RegId, STATUS_FLAGS};
    use hp45::display::{display_text, render_registers};

    println!("🔧 Running: {}", path.display());

    let mut cpu = Cpu::new(load_rom(path));

    if let Some(state) = &options.load_state {
        match hp45::load_state(state) {
            Ok(regs) => cpu.regs = regs,
            Err(e) => {
                eprintln!("❌ Failed to load state: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut ok = run_cycles(&mut cpu, options.cycles, options.keep_going);

    for &code in &options.keys {
        if !ok {
            break;
        }
        tracing::info!("Pressing key {:#04x} at cycle {}", code, cpu.cycles);
        cpu.key_down(code);
        ok = run_cycles(&mut cpu, config.key_hold_cycles, options.keep_going);
        cpu.key_up();
        if ok {
            ok = run_cycles(&mut cpu, config.key_settle_cycles, options.keep_going);
        }
    }

    let regs = &cpu.regs;
    println!();
    println!("━━━ Display ━━━");
    println!("[{}]", display_text(&render_registers(regs)));

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cpu.cycles);
    for id in RegId::ALL {
        println!("{}: {:?}", id.name(), regs.reg(id));
    }
    let flags: String = (0..STATUS_FLAGS).map(|n| if regs.flag(n) { '1' } else { '.' }).collect();
    println!("PC: {:04o}  RET: {:03o}  P: {}  S: {}  Carry: {}", regs.pc, regs.ret, regs.p, flags, regs.carry as u8);
    if let Some(instr) = cpu.last_instruction() {
        println!("Last: {}", instr);
    }

    if let Some(state) = &options.save_state {
        if let Err(e) = hp45::save_state(state, &cpu.regs) {
            eprintln!("❌ Failed to save state: {}", e);
            std::process::exit(1);
        }
    }

    if !ok {
        std::process::exit(1);
    }
}

fn disassemble_file(path: &Path, page: Option<u8>) {
    use hp45::asm::{disassemble, disassemble_page};

    let rom = load_rom(path);
    let output = match page {
        Some(page) => disassemble_page(&rom, page),
        None => disassemble(&rom),
    };
    println!("{}", output);
}

#[cfg(feature = "tui")]
fn front_panel(path: &Path, config: FrontendConfig) {
    let rom = load_rom(path);
    tracing::info!("Starting front panel at {} cycles/s", config.cycles_per_second());

    if let Err(e) = hp45::tui::run_front_panel(rom, config) {
        eprintln!("❌ Front panel error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn front_panel(_path: &Path, _config: FrontendConfig) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}
