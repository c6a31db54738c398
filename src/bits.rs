/// Assembles a little-endian word from its two bytes.
pub fn join(low: u8, high: u8) -> u16 {
  (low as u16) | ((high as u16) << 8)
}

pub fn high_byte(word: u16) -> u8 {
  (word >> 8) as u8
}

pub fn low_byte(word: u16) -> u8 {
  (word & 0x00ff) as u8
}

/// The second byte of a two-byte header: `mod` (bits 6-7), `reg` (bits 3-5)
/// and `rm` (bits 0-2).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ModRegRm(pub u8);

impl ModRegRm {
  pub fn mod_(self) -> u8 {
    self.0 >> 6
  }

  pub fn reg(self) -> u8 {
    (self.0 >> 3) & 0b_111
  }

  pub fn rm(self) -> u8 {
    self.0 & 0b_111
  }
}

impl std::fmt::Debug for ModRegRm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ModRegRm")
      .field("mod", &format_args!("{:02b}", self.mod_()))
      .field("reg", &format_args!("{:03b}", self.reg()))
      .field("rm", &format_args!("{:03b}", self.rm()))
      .finish()
  }
}

/// w-bit: bit 0 of the opcode byte.
pub fn w_bit(opcode: u8) -> bool {
  opcode & 0b_0000_0001 != 0
}

/// d-bit (or s-bit for the immediate group): bit 1 of the opcode byte.
pub fn d_bit(opcode: u8) -> bool {
  opcode & 0b_0000_0010 != 0
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;

  #[test]
  fn test_split_word() {
    assert_eq!(low_byte(0x89d9), 0xd9);
    assert_eq!(high_byte(0x89d9), 0x89);
    assert_eq!(join(0xd9, 0x89), 0x89d9);
  }

  #[test]
  fn test_mod_reg_rm_fields() {
    let byte = ModRegRm(0b_11_011_001);
    assert_eq!(byte.mod_(), 0b11);
    assert_eq!(byte.reg(), 0b011);
    assert_eq!(byte.rm(), 0b001);
  }

  #[test]
  fn test_opcode_flag_bits() {
    assert!(w_bit(0b100010_0_1));
    assert!(!d_bit(0b100010_0_1));
    assert!(d_bit(0b100010_1_0));
    assert!(!w_bit(0b100010_1_0));
  }

  proptest! {
    #[test]
    fn join_then_split_is_identity(lo in any::<u8>(), hi in any::<u8>()) {
      let word = join(lo, hi);
      prop_assert_eq!(low_byte(word), lo);
      prop_assert_eq!(high_byte(word), hi);
    }

    #[test]
    fn split_then_join_is_identity(word in any::<u16>()) {
      prop_assert_eq!(join(low_byte(word), high_byte(word)), word);
    }
  }
}
