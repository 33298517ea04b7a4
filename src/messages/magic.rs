use speedy::{Context, Readable, Reader, Writable, Writer};

/// The four identifying bytes at the start of every GIOP message.
#[derive(Debug, PartialOrd, PartialEq, Ord, Eq, Clone, Copy)]
pub struct Magic {
  bytes: [u8; 4],
}

impl Magic {
  pub const GIOP: Magic = Magic { bytes: *b"GIOP" };

  /// "GIOP" read as a big-endian u32.
  pub const GIOP_BIG_ENDIAN_VALUE: u32 = 0x4749_4F50;
  /// "GIOP" read as a little-endian u32. Never valid on the wire, since the
  /// magic is not subject to the byte-order flag.
  pub const GIOP_LITTLE_ENDIAN_VALUE: u32 = 0x504F_4947;

  pub fn from_bytes(bytes: [u8; 4]) -> Magic {
    Magic { bytes }
  }

  pub fn bytes(&self) -> [u8; 4] {
    self.bytes
  }

  pub fn is_valid(&self) -> bool {
    *self == Magic::GIOP
  }
}

impl Default for Magic {
  fn default() -> Self {
    Magic::GIOP
  }
}

impl<'a, C: Context> Readable<'a, C> for Magic {
  #[inline]
  fn read_from<R: Reader<'a, C>>(reader: &mut R) -> Result<Self, C::Error> {
    let mut bytes = [0u8; 4];
    for b in bytes.iter_mut() {
      *b = reader.read_u8()?;
    }
    Ok(Magic { bytes })
  }

  #[inline]
  fn minimum_bytes_needed() -> usize {
    4
  }
}

impl<C: Context> Writable<C> for Magic {
  #[inline]
  fn write_to<T: ?Sized + Writer<C>>(&self, writer: &mut T) -> Result<(), C::Error> {
    for b in &self.bytes {
      writer.write_u8(*b)?
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use speedy::Endianness;

  #[test]
  fn validity() {
    assert!(Magic::GIOP.is_valid());
    assert!(!Magic::from_bytes(*b"POIG").is_valid());
    assert_eq!(
      u32::from_be_bytes(Magic::GIOP.bytes()),
      Magic::GIOP_BIG_ENDIAN_VALUE
    );
    assert_eq!(
      u32::from_le_bytes(Magic::GIOP.bytes()),
      Magic::GIOP_LITTLE_ENDIAN_VALUE
    );
  }

  #[test]
  fn minimum_bytes_needed() {
    assert_eq!(4, <Magic as Readable<Endianness>>::minimum_bytes_needed());
  }

  serialization_test!( type = Magic,
  {
      magic_giop,
      Magic::GIOP,
      le = [0x47, 0x49, 0x4F, 0x50],
      be = [0x47, 0x49, 0x4F, 0x50]
  });
}
