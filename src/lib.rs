//! Decoder for a subset of 8086 machine code: MOV, ADD, SUB, CMP and the
//! short conditional jumps and loops.
//!
//! [`decode_one`] decodes a single instruction from the front of a byte
//! window. [`disassemble`] and [`disassemble_with`] run it over a whole
//! buffer and produce a NASM-style listing.

pub mod bits;
pub mod branch;
pub mod decode;
pub mod error;
pub mod instruction;
pub mod matcher;
pub mod operand;
pub mod render;

pub use decode::{decode_one, disassemble, disassemble_with, ErrorPolicy, Instructions, Listing};
pub use error::{DecodeError, DisasmError};
pub use instruction::{
  Address, AddressingMode, Base, Instruction, OperationKind, Operand, Operands, Register, Width,
};
