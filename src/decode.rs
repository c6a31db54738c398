use std::fmt;

use log::{debug, trace, warn};

use crate::error::{DecodeError, DisasmError};
use crate::instruction::Instruction;
use crate::matcher;
use crate::operand::ByteReader;

/// Decodes the instruction at the start of `window`.
///
/// Never reads past the end of `window`; the returned instruction's `len` is
/// the number of bytes to advance to reach the next one.
pub fn decode_one(window: &[u8]) -> Result<Instruction, DecodeError> {
  let mut reader = ByteReader::new(window);
  let opcode = reader.u8()?;
  let row = matcher::lookup(opcode)?;
  let instruction = (row.decode)(opcode, &mut reader)?;
  debug_assert_eq!(instruction.len, reader.consumed());
  Ok(instruction)
}

/// What the decode loop does when an instruction can't be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
  /// Keep what was decoded so far and stop.
  #[default]
  Stop,
  /// Emit the byte as data and resume at the next one.
  Skip,
  /// Emit a comment describing the error, then stop.
  Mark,
}

/// Iterates over a buffer one instruction at a time, yielding each
/// instruction with its offset. Ends after the first error.
pub struct Instructions<'a> {
  bytes: &'a [u8],
  offset: usize,
  failed: bool,
}

impl<'a> Instructions<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Instructions { bytes, offset: 0, failed: false }
  }

  /// Moves past one byte after an error so iteration can resume.
  pub fn skip_byte(&mut self) -> Option<u8> {
    let byte = *self.bytes.get(self.offset)?;
    self.offset += 1;
    self.failed = false;
    Some(byte)
  }
}

impl Iterator for Instructions<'_> {
  type Item = Result<(usize, Instruction), DisasmError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.offset >= self.bytes.len() {
      return None;
    }
    let offset = self.offset;
    match decode_one(&self.bytes[offset..]) {
      Ok(instruction) => {
        trace!("{offset:#06x}: {instruction} ({} bytes)", instruction.len);
        self.offset += instruction.len;
        Some(Ok((offset, instruction)))
      }
      Err(source) => {
        self.failed = true;
        Some(Err(DisasmError { offset, source }))
      }
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
  pub lines: Vec<String>,
  pub errors: Vec<DisasmError>,
}

impl Listing {
  /// True when decoding ran to the end of the buffer.
  pub fn is_complete(&self) -> bool {
    self.errors.is_empty()
  }

  /// The listing without the `bits 16` header.
  pub fn body(&self) -> String {
    self.lines.iter().map(|line| format!("{line}\n")).collect()
  }
}

impl fmt::Display for Listing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "bits 16")?;
    for line in &self.lines {
      writeln!(f, "{line}")?;
    }
    Ok(())
  }
}

pub fn disassemble_with(instructions: &[u8], policy: ErrorPolicy) -> Listing {
  debug!("decoding {} bytes, on error: {policy:?}", instructions.len());
  let mut listing = Listing::default();
  let mut decoder = Instructions::new(instructions);
  while let Some(item) = decoder.next() {
    match item {
      Ok((_, instruction)) => listing.lines.push(instruction.to_string()),
      Err(error) => {
        match policy {
          ErrorPolicy::Stop => {}
          ErrorPolicy::Mark => listing.lines.push(format!("; {error}")),
          ErrorPolicy::Skip => {
            if let Some(byte) = decoder.skip_byte() {
              warn!("{error}, skipping byte {byte:#04x}");
              listing.lines.push(format!("db {byte:#04x}"));
            }
          }
        }
        listing.errors.push(error);
        if policy != ErrorPolicy::Skip {
          break;
        }
      }
    }
  }
  debug!(
    "decoded {} lines with {} errors",
    listing.lines.len(),
    listing.errors.len()
  );
  listing
}

/// Disassembles the whole buffer, stopping at the first undecodable
/// instruction.
pub fn disassemble(instructions: &[u8]) -> Result<String, DisasmError> {
  let listing = disassemble_with(instructions, ErrorPolicy::Stop);
  match listing.errors.first() {
    Some(error) => Err(*error),
    None => Ok(listing.to_string()),
  }
}
