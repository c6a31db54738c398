use crate::error::DecodeError;
use crate::instruction::{AddressingMode, Instruction, OperationKind, Operands, Width};
use crate::operand::ByteReader;

/// Fixed opcode bytes of the short conditional jumps and loops.
pub const JUMP_OPCODES: [(u8, OperationKind); 20] = [
  (0x70, OperationKind::Jo),
  (0x71, OperationKind::Jno),
  (0x72, OperationKind::Jb),
  (0x73, OperationKind::Jnb),
  (0x74, OperationKind::Je),
  (0x75, OperationKind::Jne),
  (0x76, OperationKind::Jbe),
  (0x77, OperationKind::Jnbe),
  (0x78, OperationKind::Js),
  (0x79, OperationKind::Jns),
  (0x7a, OperationKind::Jp),
  (0x7b, OperationKind::Jnp),
  (0x7c, OperationKind::Jl),
  (0x7d, OperationKind::Jnl),
  (0x7e, OperationKind::Jle),
  (0x7f, OperationKind::Jnle),
  (0xe0, OperationKind::Loopnz),
  (0xe1, OperationKind::Loopz),
  (0xe2, OperationKind::Loop),
  (0xe3, OperationKind::Jcxz),
];

fn jump_kind(opcode: u8) -> Option<OperationKind> {
  JUMP_OPCODES
    .iter()
    .find(|(code, _)| *code == opcode)
    .map(|(_, kind)| *kind)
}

/// Opcode followed by one signed byte, relative to the next instruction.
pub fn short_jump(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let op = jump_kind(opcode).ok_or(DecodeError::UnknownOpcode { opcode, extension: None })?;
  let offset = reader.i8()?;
  Ok(reader.finish(op, AddressingMode::None, Width::Byte, Operands::Branch(offset)))
}
