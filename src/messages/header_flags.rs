use enumflags2::BitFlags;
use speedy::Endianness;

use crate::messages::giop_version::GiopVersion;

/// Bits of the flags octet, GIOP 1.1 and later.
///
/// In 1.0 the same octet is a plain boolean byte order (0 or 1) and the
/// fragmentation bit does not exist.
#[derive(Debug, BitFlags, Clone, Copy, PartialEq)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum GIOP_Flags {
  LittleEndian = 0b0000_0001,
  MoreFragments = 0b0000_0010,
}

/// Big endian, no more fragments.
pub const FLAG_NO_FRAG_BIG_ENDIAN: u8 = 0x00;

/// Byte order of the header length and of the body, from the octet at
/// header offset 6.
pub fn endianness_flag(version: GiopVersion, flags: u8) -> Endianness {
  let little = if version.has_flags() {
    BitFlags::<GIOP_Flags>::from_bits_truncate(flags).contains(GIOP_Flags::LittleEndian)
  } else {
    flags == 1
  };
  if little {
    Endianness::LittleEndian
  } else {
    Endianness::BigEndian
  }
}

/// Only meaningful from 1.1 on. Always false for 1.0.
pub fn more_fragments_flag(version: GiopVersion, flags: u8) -> bool {
  version.has_flags()
    && BitFlags::<GIOP_Flags>::from_bits_truncate(flags).contains(GIOP_Flags::MoreFragments)
}

pub fn flags_for(endianness: Endianness) -> u8 {
  match endianness {
    Endianness::LittleEndian => GIOP_Flags::LittleEndian as u8,
    Endianness::BigEndian => FLAG_NO_FRAG_BIG_ENDIAN,
  }
}
