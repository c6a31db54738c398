use std::fmt;

use crate::instruction::{Address, Base, Instruction, OperationKind, Operand, Operands, Register, Width};

pub fn mnemonic(op: OperationKind) -> &'static str {
  match op {
    OperationKind::Mov => "mov",
    OperationKind::Add => "add",
    OperationKind::Sub => "sub",
    OperationKind::Cmp => "cmp",
    OperationKind::Je => "je",
    OperationKind::Jl => "jl",
    OperationKind::Jle => "jle",
    OperationKind::Jb => "jb",
    OperationKind::Jbe => "jbe",
    OperationKind::Jp => "jp",
    OperationKind::Jo => "jo",
    OperationKind::Js => "js",
    OperationKind::Jne => "jne",
    OperationKind::Jnl => "jnl",
    OperationKind::Jnle => "jnle",
    OperationKind::Jnb => "jnb",
    OperationKind::Jnbe => "jnbe",
    OperationKind::Jnp => "jnp",
    OperationKind::Jno => "jno",
    OperationKind::Jns => "jns",
    OperationKind::Loop => "loop",
    OperationKind::Loopz => "loopz",
    OperationKind::Loopnz => "loopnz",
    OperationKind::Jcxz => "jcxz",
  }
}

const BYTE_REGISTERS: [&str; 8] = ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"];
const WORD_REGISTERS: [&str; 8] = ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];

pub fn register_name(register: Register) -> &'static str {
  let index = (register.index & 0b111) as usize;
  match register.width {
    Width::Byte => BYTE_REGISTERS[index],
    Width::Word => WORD_REGISTERS[index],
  }
}

fn base_expression(base: Base) -> &'static str {
  match base {
    Base::BxSi => "bx + si",
    Base::BxDi => "bx + di",
    Base::BpSi => "bp + si",
    Base::BpDi => "bp + di",
    Base::Si => "si",
    Base::Di => "di",
    Base::Bp => "bp",
    Base::Bx => "bx",
  }
}

/// Immediates print as signed decimal at their own width.
fn immediate_value(value: u16, width: Width) -> i16 {
  match width {
    Width::Byte => value as u8 as i8 as i16,
    Width::Word => value as i16,
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Address::Direct(address) => write!(f, "[{address}]"),
      Address::Based { base, displacement } => {
        let base = base_expression(base);
        match displacement.map(i32::from) {
          Some(disp) if disp > 0 => write!(f, "[{base} + {disp}]"),
          Some(disp) if disp < 0 => write!(f, "[{base} - {}]", -disp),
          _ => write!(f, "[{base}]"),
        }
      }
    }
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Operand::Register(register) => f.write_str(register_name(register)),
      Operand::Memory(address) => write!(f, "{address}"),
      Operand::Immediate { value, width, .. } => write!(f, "{}", immediate_value(value, width)),
    }
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mnemonic = mnemonic(self.op);
    match self.operands {
      Operands::Branch(offset) if offset >= 0 => write!(f, "{mnemonic} $+{offset}"),
      Operands::Branch(offset) => write!(f, "{mnemonic} ${offset}"),
      // nothing else fixes the operand size here
      Operands::Pair { dst: dst @ Operand::Memory(_), src: src @ Operand::Immediate { width, .. } } => {
        let size = match width {
          Width::Byte => "byte",
          Width::Word => "word",
        };
        write!(f, "{mnemonic} {dst}, {size} {src}")
      }
      Operands::Pair { dst, src } => write!(f, "{mnemonic} {dst}, {src}"),
    }
  }
}

pub fn render(instruction: &Instruction) -> String {
  instruction.to_string()
}
