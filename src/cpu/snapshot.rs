//! Processor state snapshots.
//!
//! A snapshot is the full [`Registers`] record as JSON. The ROM is not part
//! of it; restore onto an engine that already runs the same firmware.

use std::path::Path;
use crate::cpu::Registers;
use thiserror::Error;

/// Serialize a register file to JSON text.
pub fn to_json(regs: &Registers) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(regs).map_err(|e| SnapshotError::Format(e.to_string()))
}

/// Parse and validate a register file from JSON text.
pub fn from_json(text: &str) -> Result<Registers, SnapshotError> {
    let regs: Registers =
        serde_json::from_str(text).map_err(|e| SnapshotError::Format(e.to_string()))?;
    if !regs.is_consistent() {
        return Err(SnapshotError::Invalid);
    }
    Ok(regs)
}

/// Write a snapshot to disk.
pub fn save_state<P: AsRef<Path>>(path: P, regs: &Registers) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let text = to_json(regs)?;
    std::fs::write(path, text).map_err(|e| SnapshotError::IoError(e.to_string()))?;
    tracing::info!("Saved state to {:?} (pc {:#05x})", path, regs.pc);
    Ok(())
}

/// Read a snapshot from disk.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<Registers, SnapshotError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
    let regs = from_json(&text)?;
    tracing::info!("Loaded state from {:?} (pc {:#05x})", path, regs.pc);
    Ok(regs)
}

/// Errors that can occur while saving or restoring a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("malformed snapshot: {0}")]
    Format(String),

    #[error("snapshot holds values outside the hardware ranges")]
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcd::{DigitReg, WordSelect};

    #[test]
    fn test_json_restores_state() {
        let mut regs = Registers::new();
        regs.c = DigitReg::parse("0 1234567890 0 05").unwrap();
        regs.storage[7] = DigitReg::parse("42").unwrap();
        regs.pc = 0x5A3;
        regs.p = 11;
        regs.ws = WordSelect::Ms;
        regs.display_on = true;

        let text = to_json(&regs).unwrap();
        assert_eq!(from_json(&text).unwrap(), regs);
    }

    #[test]
    fn test_rejects_out_of_range_pc() {
        let mut regs = Registers::new();
        regs.pc = 0x800;
        let text = to_json(&regs).unwrap();
        assert_eq!(from_json(&text), Err(SnapshotError::Invalid));
    }

    #[test]
    fn test_rejects_non_decimal_cell() {
        let text = to_json(&Registers::new()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["a"]["cells"][0] = serde_json::json!(12);
        let err = from_json(&value.to_string()).unwrap_err();
        assert_eq!(err, SnapshotError::Invalid);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(from_json("{ not json"), Err(SnapshotError::Format(_))));
    }
}
