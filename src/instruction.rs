#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
  Mov,
  Add,
  Sub,
  Cmp,
  Je,
  Jl,
  Jle,
  Jb,
  Jbe,
  Jp,
  Jo,
  Js,
  Jne,
  Jnl,
  Jnle,
  Jnb,
  Jnbe,
  Jnp,
  Jno,
  Jns,
  Loop,
  Loopz,
  Loopnz,
  Jcxz,
}

impl OperationKind {
  pub const ALL: [OperationKind; 24] = [
    OperationKind::Mov,
    OperationKind::Add,
    OperationKind::Sub,
    OperationKind::Cmp,
    OperationKind::Je,
    OperationKind::Jl,
    OperationKind::Jle,
    OperationKind::Jb,
    OperationKind::Jbe,
    OperationKind::Jp,
    OperationKind::Jo,
    OperationKind::Js,
    OperationKind::Jne,
    OperationKind::Jnl,
    OperationKind::Jnle,
    OperationKind::Jnb,
    OperationKind::Jnbe,
    OperationKind::Jnp,
    OperationKind::Jno,
    OperationKind::Jns,
    OperationKind::Loop,
    OperationKind::Loopz,
    OperationKind::Loopnz,
    OperationKind::Jcxz,
  ];

  pub fn is_branch(self) -> bool {
    !matches!(
      self,
      OperationKind::Mov | OperationKind::Add | OperationKind::Sub | OperationKind::Cmp
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
  Byte,
  Word,
}

impl Width {
  pub fn from_w_bit(w: bool) -> Width {
    if w {
      Width::Word
    } else {
      Width::Byte
    }
  }
}

/// Mirrors the `mod` field; `None` for encodings without a mod/reg/rm byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
  None,
  Mem,
  MemDisp8,
  MemDisp16,
  Reg,
}

impl AddressingMode {
  pub fn from_mod(mod_: u8) -> AddressingMode {
    match mod_ & 0b11 {
      0b00 => AddressingMode::Mem,
      0b01 => AddressingMode::MemDisp8,
      0b10 => AddressingMode::MemDisp16,
      _ => AddressingMode::Reg,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
  pub index: u8,
  pub width: Width,
}

impl Register {
  pub const AL: Register = Register { index: 0, width: Width::Byte };
  pub const AX: Register = Register { index: 0, width: Width::Word };

  pub fn new(index: u8, width: Width) -> Register {
    Register { index: index & 0b111, width }
  }

  pub fn accumulator(width: Width) -> Register {
    match width {
      Width::Byte => Register::AL,
      Width::Word => Register::AX,
    }
  }
}

/// The eight base-register expressions selected by `rm` in memory modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
  BxSi,
  BxDi,
  BpSi,
  BpDi,
  Si,
  Di,
  Bp,
  Bx,
}

impl Base {
  pub fn from_rm(rm: u8) -> Base {
    match rm & 0b111 {
      0b000 => Base::BxSi,
      0b001 => Base::BxDi,
      0b010 => Base::BpSi,
      0b011 => Base::BpDi,
      0b100 => Base::Si,
      0b101 => Base::Di,
      0b110 => Base::Bp,
      _ => Base::Bx,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
  /// mod=00, rm=110: a literal 16-bit address with no base register.
  Direct(u16),
  Based { base: Base, displacement: Option<i16> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Register(Register),
  Memory(Address),
  Immediate { value: u16, width: Width, sign_extended: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
  Pair { dst: Operand, src: Operand },
  /// Signed offset from the address following the instruction.
  Branch(i8),
}

/// One decoded instruction. `len` is the exact number of bytes it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  pub op: OperationKind,
  pub mode: AddressingMode,
  pub width: Width,
  pub operands: Operands,
  pub len: usize,
}
