#![cfg(test)]

/// Checks that a speedy type writes the expected bytes in both byte orders
/// and reads them back to the original value.
macro_rules! serialization_test {
  (type = $type:ty, $({ $name:ident, $original:expr, le = $le:expr, be = $be:expr }),+) => {
    $(mod $name {
      use super::*;
      use speedy::{Endianness, Readable, Writable};

      #[test]
      fn serialize_little_endian() {
        let original: $type = $original;
        let expected: Vec<u8> = $le.to_vec();
        let serialized = original
          .write_to_vec_with_ctx(Endianness::LittleEndian)
          .unwrap();
        assert_eq!(serialized, expected);
      }

      #[test]
      fn serialize_big_endian() {
        let original: $type = $original;
        let expected: Vec<u8> = $be.to_vec();
        let serialized = original
          .write_to_vec_with_ctx(Endianness::BigEndian)
          .unwrap();
        assert_eq!(serialized, expected);
      }

      #[test]
      fn deserialize_little_endian() {
        let bytes: Vec<u8> = $le.to_vec();
        let deserialized =
          <$type>::read_from_buffer_with_ctx(Endianness::LittleEndian, &bytes).unwrap();
        assert_eq!(deserialized, $original);
      }

      #[test]
      fn deserialize_big_endian() {
        let bytes: Vec<u8> = $be.to_vec();
        let deserialized =
          <$type>::read_from_buffer_with_ctx(Endianness::BigEndian, &bytes).unwrap();
        assert_eq!(deserialized, $original);
      }
    })+
  };
}
