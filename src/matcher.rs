//! Ordered opcode table.
//!
//! Each row pairs an 8-bit pattern with the handler that decodes the rest of
//! the instruction. Patterns are written as 8-character strings where `0` and
//! `1` are fixed bits and any other character is a don't-care field (`d`, `w`,
//! `s`, `reg`, ...). They are compiled to a `(mask, value)` pair at compile
//! time, and rows are tried top to bottom with the first match winning.

use crate::branch;
use crate::error::DecodeError;
use crate::operand::{self, DecodeFn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPattern {
  pub mask: u8,
  pub value: u8,
}

impl BitPattern {
  pub const fn compile(pattern: &[u8; 8]) -> BitPattern {
    let mut mask = 0;
    let mut value = 0;
    let mut i = 0;
    while i < 8 {
      let bit = 1 << (7 - i);
      match pattern[i] {
        b'0' => mask |= bit,
        b'1' => {
          mask |= bit;
          value |= bit;
        }
        _ => {}
      }
      i += 1;
    }
    BitPattern { mask, value }
  }

  pub fn matches(self, byte: u8) -> bool {
    byte & self.mask == self.value
  }
}

pub struct Row {
  pub pattern: BitPattern,
  pub name: &'static str,
  pub decode: DecodeFn,
}

impl std::fmt::Debug for Row {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Row")
      .field("pattern", &format_args!("{:08b}/{:08b}", self.pattern.value, self.pattern.mask))
      .field("name", &self.name)
      .finish()
  }
}

macro_rules! row {
  ($pat:expr, $name:expr, $decode:expr) => {
    Row {
      pattern: BitPattern::compile($pat),
      name: $name,
      decode: $decode,
    }
  };
}

static TABLE: [Row; 32] = [
  row!(b"100010dw", "mov r/m, reg", operand::reg_mem_with_reg),
  row!(b"1100011w", "mov r/m, imm", operand::mov_imm_to_reg_mem),
  row!(b"1011wreg", "mov reg, imm", operand::mov_imm_to_reg),
  row!(b"1010000w", "mov acc, mem", operand::mov_mem_to_acc),
  row!(b"1010001w", "mov mem, acc", operand::mov_acc_to_mem),
  row!(b"000000dw", "add r/m, reg", operand::reg_mem_with_reg),
  row!(b"001010dw", "sub r/m, reg", operand::reg_mem_with_reg),
  row!(b"001110dw", "cmp r/m, reg", operand::reg_mem_with_reg),
  row!(b"100000sw", "add/sub/cmp r/m, imm", operand::arith_imm_to_reg_mem),
  row!(b"0000010w", "add acc, imm", operand::arith_imm_to_acc),
  row!(b"0010110w", "sub acc, imm", operand::arith_imm_to_acc),
  row!(b"0011110w", "cmp acc, imm", operand::arith_imm_to_acc),
  row!(b"01110100", "je", branch::short_jump),
  row!(b"01111100", "jl", branch::short_jump),
  row!(b"01111110", "jle", branch::short_jump),
  row!(b"01110010", "jb", branch::short_jump),
  row!(b"01110110", "jbe", branch::short_jump),
  row!(b"01111010", "jp", branch::short_jump),
  row!(b"01110000", "jo", branch::short_jump),
  row!(b"01111000", "js", branch::short_jump),
  row!(b"01110101", "jne", branch::short_jump),
  row!(b"01111101", "jnl", branch::short_jump),
  row!(b"01111111", "jnle", branch::short_jump),
  row!(b"01110011", "jnb", branch::short_jump),
  row!(b"01110111", "jnbe", branch::short_jump),
  row!(b"01111011", "jnp", branch::short_jump),
  row!(b"01110001", "jno", branch::short_jump),
  row!(b"01111001", "jns", branch::short_jump),
  row!(b"11100010", "loop", branch::short_jump),
  row!(b"11100001", "loopz", branch::short_jump),
  row!(b"11100000", "loopnz", branch::short_jump),
  row!(b"11100011", "jcxz", branch::short_jump),
];

/// First row whose pattern matches the leading byte.
pub fn lookup(opcode: u8) -> Result<&'static Row, DecodeError> {
  TABLE
    .iter()
    .find(|row| row.pattern.matches(opcode))
    .ok_or(DecodeError::UnknownOpcode { opcode, extension: None })
}
