use crate::bits::{d_bit, join, w_bit, ModRegRm};
use crate::error::DecodeError;
use crate::instruction::{
  Address, AddressingMode, Base, Instruction, OperationKind, Operand, Operands, Register, Width,
};

/// Bounded cursor over the bytes of one instruction.
///
/// Every read is checked against the end of the window, so a truncated
/// instruction surfaces as [`DecodeError::IncompleteInstruction`]. The
/// cursor position after the last read is the instruction's length.
pub struct ByteReader<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> ByteReader<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    ByteReader { bytes, pos: 0 }
  }

  pub fn consumed(&self) -> usize {
    self.pos
  }

  fn require(&self, count: usize) -> Result<(), DecodeError> {
    let needed = self.pos + count;
    if needed > self.bytes.len() {
      return Err(DecodeError::IncompleteInstruction { needed, available: self.bytes.len() });
    }
    Ok(())
  }

  pub fn u8(&mut self) -> Result<u8, DecodeError> {
    self.require(1)?;
    let byte = self.bytes[self.pos];
    self.pos += 1;
    Ok(byte)
  }

  pub fn i8(&mut self) -> Result<i8, DecodeError> {
    Ok(self.u8()? as i8)
  }

  /// Little-endian word; both bytes must be present before either is taken.
  pub fn u16(&mut self) -> Result<u16, DecodeError> {
    self.require(2)?;
    let word = join(self.bytes[self.pos], self.bytes[self.pos + 1]);
    self.pos += 2;
    Ok(word)
  }

  pub fn finish(
    &self,
    op: OperationKind,
    mode: AddressingMode,
    width: Width,
    operands: Operands,
  ) -> Instruction {
    Instruction { op, mode, width, operands, len: self.pos }
  }
}

pub type DecodeFn = fn(u8, &mut ByteReader<'_>) -> Result<Instruction, DecodeError>;

fn unknown(opcode: u8, extension: Option<u8>) -> DecodeError {
  DecodeError::UnknownOpcode { opcode, extension }
}

/// ADD/SUB/CMP share one 3-bit selector, found in bits 3-5 of the opcode for
/// the register and accumulator forms and in `reg` for the immediate group.
fn arithmetic_op(selector: u8) -> Option<OperationKind> {
  match selector & 0b111 {
    0b000 => Some(OperationKind::Add),
    0b101 => Some(OperationKind::Sub),
    0b111 => Some(OperationKind::Cmp),
    _ => None,
  }
}

/// Resolves the `rm` side of a mod/reg/rm byte, reading any displacement or
/// direct address that follows it.
fn rm_operand(
  modrm: ModRegRm,
  mode: AddressingMode,
  width: Width,
  reader: &mut ByteReader<'_>,
) -> Result<Operand, DecodeError> {
  let base = Base::from_rm(modrm.rm());
  let address = match mode {
    AddressingMode::Reg | AddressingMode::None => {
      return Ok(Operand::Register(Register::new(modrm.rm(), width)));
    }
    AddressingMode::Mem if modrm.rm() == 0b110 => Address::Direct(reader.u16()?),
    AddressingMode::Mem => Address::Based { base, displacement: None },
    AddressingMode::MemDisp8 => Address::Based {
      base,
      displacement: Some(reader.i8()? as i16),
    },
    AddressingMode::MemDisp16 => Address::Based {
      base,
      displacement: Some(reader.u16()? as i16),
    },
  };
  Ok(Operand::Memory(address))
}

/// Reads immediate data for a destination of `width`. A set sign-extend flag
/// only matters for word destinations: one byte is read and widened.
fn immediate(
  reader: &mut ByteReader<'_>,
  width: Width,
  sign_extend: bool,
) -> Result<Operand, DecodeError> {
  let (value, sign_extended) = match (width, sign_extend) {
    (Width::Word, true) => (reader.i8()? as i16 as u16, true),
    (Width::Word, false) => (reader.u16()?, false),
    (Width::Byte, _) => (reader.u8()? as u16, false),
  };
  Ok(Operand::Immediate { value, width, sign_extended })
}

/// `100010dw` MOV and `00ooo0dw` ADD/SUB/CMP between a register and a
/// register or memory operand.
pub fn reg_mem_with_reg(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let op = if opcode & 0b1111_1100 == 0b1000_1000 {
    OperationKind::Mov
  } else {
    arithmetic_op(opcode >> 3).ok_or(unknown(opcode, None))?
  };
  let width = Width::from_w_bit(w_bit(opcode));
  let modrm = ModRegRm(reader.u8()?);
  let mode = AddressingMode::from_mod(modrm.mod_());
  let reg = Operand::Register(Register::new(modrm.reg(), width));
  let rm = rm_operand(modrm, mode, width, reader)?;
  let (dst, src) = if d_bit(opcode) { (reg, rm) } else { (rm, reg) };
  Ok(reader.finish(op, mode, width, Operands::Pair { dst, src }))
}

/// `1100011w` MOV immediate to register or memory. Only `reg` = 000 is
/// defined.
pub fn mov_imm_to_reg_mem(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let width = Width::from_w_bit(w_bit(opcode));
  let modrm = ModRegRm(reader.u8()?);
  if modrm.reg() != 0 {
    return Err(unknown(opcode, Some(modrm.reg())));
  }
  let mode = AddressingMode::from_mod(modrm.mod_());
  let dst = rm_operand(modrm, mode, width, reader)?;
  let src = immediate(reader, width, false)?;
  Ok(reader.finish(OperationKind::Mov, mode, width, Operands::Pair { dst, src }))
}

/// `1011wreg` MOV immediate to register; no mod/reg/rm byte.
pub fn mov_imm_to_reg(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let width = Width::from_w_bit(opcode & 0b0000_1000 != 0);
  let dst = Operand::Register(Register::new(opcode, width));
  let src = immediate(reader, width, false)?;
  Ok(reader.finish(OperationKind::Mov, AddressingMode::None, width, Operands::Pair { dst, src }))
}

/// `1010000w` MOV memory to accumulator.
pub fn mov_mem_to_acc(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let width = Width::from_w_bit(w_bit(opcode));
  let dst = Operand::Register(Register::accumulator(width));
  let src = Operand::Memory(Address::Direct(reader.u16()?));
  Ok(reader.finish(OperationKind::Mov, AddressingMode::None, width, Operands::Pair { dst, src }))
}

/// `1010001w` MOV accumulator to memory.
pub fn mov_acc_to_mem(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let width = Width::from_w_bit(w_bit(opcode));
  let dst = Operand::Memory(Address::Direct(reader.u16()?));
  let src = Operand::Register(Register::accumulator(width));
  Ok(reader.finish(OperationKind::Mov, AddressingMode::None, width, Operands::Pair { dst, src }))
}

/// `100000sw` ADD/SUB/CMP immediate to register or memory, selected by `reg`.
pub fn arith_imm_to_reg_mem(
  opcode: u8,
  reader: &mut ByteReader<'_>,
) -> Result<Instruction, DecodeError> {
  let width = Width::from_w_bit(w_bit(opcode));
  let modrm = ModRegRm(reader.u8()?);
  let op = arithmetic_op(modrm.reg()).ok_or(unknown(opcode, Some(modrm.reg())))?;
  let mode = AddressingMode::from_mod(modrm.mod_());
  let dst = rm_operand(modrm, mode, width, reader)?;
  let src = immediate(reader, width, d_bit(opcode))?;
  Ok(reader.finish(op, mode, width, Operands::Pair { dst, src }))
}

/// `00ooo10w` ADD/SUB/CMP immediate to AL or AX.
pub fn arith_imm_to_acc(opcode: u8, reader: &mut ByteReader<'_>) -> Result<Instruction, DecodeError> {
  let op = arithmetic_op(opcode >> 3).ok_or(unknown(opcode, None))?;
  let width = Width::from_w_bit(w_bit(opcode));
  let dst = Operand::Register(Register::accumulator(width));
  let src = immediate(reader, width, false)?;
  Ok(reader.finish(op, AddressingMode::None, width, Operands::Pair { dst, src }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;

  fn decode_with(handler: DecodeFn, bytes: &[u8]) -> Result<Instruction, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let opcode = reader.u8()?;
    handler(opcode, &mut reader)
  }

  fn pair(instruction: &Instruction) -> (Operand, Operand) {
    match instruction.operands {
      Operands::Pair { dst, src } => (dst, src),
      Operands::Branch(_) => panic!("expected two operands, got {:?}", instruction),
    }
  }

  #[test]
  fn test_register_to_register() {
    let inst = decode_with(reg_mem_with_reg, &[0x89, 0xd9]).unwrap();
    assert_eq!(inst.op, OperationKind::Mov);
    assert_eq!(inst.mode, AddressingMode::Reg);
    assert_eq!(inst.len, 2);
    assert_eq!(
      pair(&inst),
      (
        Operand::Register(Register::new(0b001, Width::Word)),
        Operand::Register(Register::new(0b011, Width::Word)),
      )
    );
  }

  #[test]
  fn test_direction_bit_swaps_operands() {
    // mov bx, [bp + di] vs mov [bp + di], bx
    let to_reg = decode_with(reg_mem_with_reg, &[0b100010_1_1, 0b00_011_011]).unwrap();
    let to_mem = decode_with(reg_mem_with_reg, &[0b100010_0_1, 0b00_011_011]).unwrap();
    let (dst, src) = pair(&to_reg);
    assert_eq!(pair(&to_mem), (src, dst));
  }

  #[test]
  fn test_direct_address_reads_a_word() {
    // mov bp, [5]
    let inst = decode_with(reg_mem_with_reg, &[0x8b, 0x2e, 0x05, 0x00]).unwrap();
    assert_eq!(inst.len, 4);
    assert_eq!(pair(&inst).1, Operand::Memory(Address::Direct(5)));

    let byte_wide = decode_with(reg_mem_with_reg, &[0x8a, 0x2e, 0x82, 0x0d]).unwrap();
    assert_eq!(byte_wide.len, 4);
    assert_eq!(pair(&byte_wide).1, Operand::Memory(Address::Direct(3458)));
  }

  #[test]
  fn test_displacements_are_signed() {
    // mov ax, [bx + di - 37]
    let inst = decode_with(reg_mem_with_reg, &[0x8b, 0x41, 0xdb]).unwrap();
    assert_eq!(
      pair(&inst).1,
      Operand::Memory(Address::Based { base: Base::BxDi, displacement: Some(-37) })
    );
    // mov [si - 300], cx
    let inst = decode_with(reg_mem_with_reg, &[0x89, 0x8c, 0xd4, 0xfe]).unwrap();
    assert_eq!(inst.len, 4);
    assert_eq!(
      pair(&inst).0,
      Operand::Memory(Address::Based { base: Base::Si, displacement: Some(-300) })
    );
  }

  #[test]
  fn test_sign_extended_immediate() {
    // add word [bp + si + 1000], -29 (sign-extended)
    let inst = decode_with(arith_imm_to_reg_mem, &[0x83, 0x82, 0xe8, 0x03, 0xe3]).unwrap();
    assert_eq!(inst.op, OperationKind::Add);
    assert_eq!(inst.len, 5);
    assert_eq!(
      pair(&inst).1,
      Operand::Immediate { value: 0xffe3, width: Width::Word, sign_extended: true }
    );
  }

  #[test]
  fn test_byte_immediate_ignores_sign_flag() {
    // sub byte [bx], 34 encoded with s=1, w=0
    let inst = decode_with(arith_imm_to_reg_mem, &[0x82, 0x2f, 0x22]).unwrap();
    assert_eq!(inst.op, OperationKind::Sub);
    assert_eq!(inst.len, 3);
    assert_eq!(
      pair(&inst).1,
      Operand::Immediate { value: 34, width: Width::Byte, sign_extended: false }
    );
  }

  #[test]
  fn test_word_immediate_to_memory_is_six_bytes() {
    // mov word [bp + di + 4000], 1000
    let inst = decode_with(mov_imm_to_reg_mem, &[0xc7, 0x83, 0xa0, 0x0f, 0xe8, 0x03]).unwrap();
    assert_eq!(inst.len, 6);
    assert_eq!(inst.mode, AddressingMode::MemDisp16);
  }

  #[test]
  fn test_undefined_group_extensions() {
    assert_eq!(
      decode_with(arith_imm_to_reg_mem, &[0x80, 0b11_001_000, 0x01]),
      Err(DecodeError::UnknownOpcode { opcode: 0x80, extension: Some(1) })
    );
    assert_eq!(
      decode_with(mov_imm_to_reg_mem, &[0xc6, 0b11_010_000, 0x01]),
      Err(DecodeError::UnknownOpcode { opcode: 0xc6, extension: Some(2) })
    );
  }

  #[test]
  fn test_accumulator_forms() {
    let inst = decode_with(arith_imm_to_acc, &[0x3d, 0xe8, 0x03]).unwrap();
    assert_eq!(inst.op, OperationKind::Cmp);
    assert_eq!(inst.len, 3);
    assert_eq!(pair(&inst).0, Operand::Register(Register::AX));

    let inst = decode_with(mov_mem_to_acc, &[0xa0, 0x10, 0x00]).unwrap();
    assert_eq!(pair(&inst), (Operand::Register(Register::AL), Operand::Memory(Address::Direct(16))));
    let inst = decode_with(mov_acc_to_mem, &[0xa3, 0x0f, 0x00]).unwrap();
    assert_eq!(pair(&inst), (Operand::Memory(Address::Direct(15)), Operand::Register(Register::AX)));
  }

  #[test]
  fn test_truncated_reads_are_reported() {
    assert_eq!(
      decode_with(mov_imm_to_reg, &[0xb9, 0x0c]),
      Err(DecodeError::IncompleteInstruction { needed: 3, available: 2 })
    );
    assert_eq!(
      decode_with(reg_mem_with_reg, &[0x89]),
      Err(DecodeError::IncompleteInstruction { needed: 2, available: 1 })
    );
    assert_eq!(
      decode_with(reg_mem_with_reg, &[0x8b, 0x86, 0x01]),
      Err(DecodeError::IncompleteInstruction { needed: 4, available: 3 })
    );
  }

  fn displacement_bytes(modrm: u8) -> usize {
    match (modrm >> 6, modrm & 0b111) {
      (0b00, 0b110) => 2,
      (0b00, _) | (0b11, _) => 0,
      (0b01, _) => 1,
      _ => 2,
    }
  }

  proptest! {
    #[test]
    fn reg_mem_length_matches_encoding(opcode in 0x88u8..=0x8b, modrm in any::<u8>()) {
      let bytes = [opcode, modrm, 0x11, 0x22];
      let inst = decode_with(reg_mem_with_reg, &bytes).unwrap();
      prop_assert_eq!(inst.len, 2 + displacement_bytes(modrm));
    }

    #[test]
    fn immediate_group_length_matches_encoding(opcode in 0x80u8..=0x83, rm in 0u8..8, mod_ in 0u8..4, op in prop::sample::select(vec![0u8, 5, 7])) {
      let modrm = (mod_ << 6) | (op << 3) | rm;
      let bytes = [opcode, modrm, 0x11, 0x22, 0x33, 0x44];
      let inst = decode_with(arith_imm_to_reg_mem, &bytes).unwrap();
      let data = if opcode == 0x81 { 2 } else { 1 };
      prop_assert_eq!(inst.len, 2 + displacement_bytes(modrm) + data);
      prop_assert!((2..=6).contains(&inst.len));
    }
  }
}
