use thiserror::Error;

use crate::instruction::OperationKind;

/// Why the instruction at the start of a window could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
  #[error("unknown opcode {opcode:#04x}{}", extension_suffix(.extension))]
  UnknownOpcode { opcode: u8, extension: Option<u8> },
  #[error("incomplete instruction: needs {needed} bytes, {available} available")]
  IncompleteInstruction { needed: usize, available: usize },
  /// The renderer's mnemonic table is an exhaustive `match`, so this is
  /// only reachable through callers that build their own tables.
  #[error("no mnemonic for {0:?}")]
  MissingMnemonic(OperationKind),
}

fn extension_suffix(extension: &Option<u8>) -> String {
  match extension {
    Some(reg) => format!(" /{reg}"),
    None => String::new(),
  }
}

/// A [`DecodeError`] located at a byte offset in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("offset {offset:#06x}: {source}")]
pub struct DisasmError {
  pub offset: usize,
  pub source: DecodeError,
}
