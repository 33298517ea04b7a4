use std::marker::PhantomData;

use byteorder::{ByteOrder, WriteBytesExt};
use serde::{ser, Serialize};

use crate::serialization::error::{Error, Result};

/// CDR serializer writing into an owned buffer.
///
/// The buffer may already hold the start of a GIOP message (the common
/// header is usually written first), and `base_offset` counts message bytes
/// that precede the buffer. Alignment is always computed from the start of
/// the message.
pub struct CdrSerializer<BO> {
  phantom: PhantomData<BO>,
  buffer: Vec<u8>,
  base_offset: usize,
}

impl<BO> CdrSerializer<BO>
where
  BO: ByteOrder,
{
  pub fn new(base_offset: usize) -> CdrSerializer<BO> {
    CdrSerializer {
      phantom: PhantomData,
      buffer: Vec::new(),
      base_offset,
    }
  }

  /// Continue writing after bytes that are already in `buffer`. The first
  /// byte of `buffer` is the first byte of the message.
  pub fn from_vec(buffer: Vec<u8>) -> CdrSerializer<BO> {
    CdrSerializer {
      phantom: PhantomData,
      buffer,
      base_offset: 0,
    }
  }

  pub fn position(&self) -> usize {
    self.base_offset + self.buffer.len()
  }

  pub fn buffer(&self) -> &[u8] {
    &self.buffer
  }

  pub fn into_inner(self) -> Vec<u8> {
    self.buffer
  }

  pub fn align_to(&mut self, alignment: usize) {
    let modulo = self.position() % alignment;
    if modulo != 0 {
      self.write_pad(alignment - modulo);
    }
  }

  fn write_pad(&mut self, byte_count: usize) {
    self.buffer.resize(self.buffer.len() + byte_count, 0u8);
  }

  pub fn write_octet(&mut self, v: u8) {
    self.buffer.push(v);
  }

  pub fn write_bool(&mut self, v: bool) {
    self.buffer.push(if v { 1u8 } else { 0u8 });
  }

  pub fn write_u16(&mut self, v: u16) -> Result<()> {
    self.align_to(2);
    self.buffer.write_u16::<BO>(v)?;
    Ok(())
  }

  pub fn write_u32(&mut self, v: u32) -> Result<()> {
    self.align_to(4);
    self.buffer.write_u32::<BO>(v)?;
    Ok(())
  }

  /// Fixed-size octet array, no length prefix, no alignment.
  pub fn write_fixed_octets(&mut self, v: &[u8]) {
    self.buffer.extend_from_slice(v);
  }

  /// sequence<octet>: u32 element count followed by the octets.
  pub fn write_octets(&mut self, v: &[u8]) -> Result<()> {
    self.write_u32(v.len() as u32)?;
    self.buffer.extend_from_slice(v);
    Ok(())
  }

  //A string is encoded as an unsigned long indicating the length of the string in octets,
  //followed by the string value in single- or multi-byte form represented as a sequence of
  //octets. The string contents include a single terminating null character. The string
  //length includes the null character, so an empty string has a length of 1.
  pub fn write_string(&mut self, v: &str) -> Result<()> {
    self.write_u32(v.len() as u32 + 1)?;
    self.buffer.extend_from_slice(v.as_bytes());
    self.buffer.push(0u8);
    Ok(())
  }

  /// Serialize any serde type at the current position.
  pub fn write_value<T>(&mut self, value: &T) -> Result<()>
  where
    T: Serialize + ?Sized,
  {
    value.serialize(self)
  }
}

pub fn to_bytes<T, BO>(value: &T, base_offset: usize) -> Result<Vec<u8>>
where
  T: Serialize,
  BO: ByteOrder,
{
  let mut serializer = CdrSerializer::<BO>::new(base_offset);
  value.serialize(&mut serializer)?;
  Ok(serializer.into_inner())
}

impl<'a, BO> ser::Serializer for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  // No additional state is required beyond what is already stored in the
  // Serializer struct.
  type SerializeSeq = Self;
  type SerializeTuple = Self;
  type SerializeTupleStruct = Self;
  type SerializeTupleVariant = Self;
  type SerializeMap = Self;
  type SerializeStruct = Self;
  type SerializeStructVariant = Self;

  //15.3.1.5 Boolean
  //  Boolean values are encoded as single octets, where TRUE is the value 1, and FALSE as 0.
  fn serialize_bool(self, v: bool) -> Result<()> {
    self.write_bool(v);
    Ok(())
  }

  fn serialize_u8(self, v: u8) -> Result<()> {
    self.write_octet(v);
    Ok(())
  }

  fn serialize_u16(self, v: u16) -> Result<()> {
    self.write_u16(v)
  }

  fn serialize_u32(self, v: u32) -> Result<()> {
    self.write_u32(v)
  }

  fn serialize_u64(self, v: u64) -> Result<()> {
    self.align_to(8);
    self.buffer.write_u64::<BO>(v)?;
    Ok(())
  }

  fn serialize_i8(self, v: i8) -> Result<()> {
    self.write_octet(v as u8);
    Ok(())
  }

  fn serialize_i16(self, v: i16) -> Result<()> {
    self.align_to(2);
    self.buffer.write_i16::<BO>(v)?;
    Ok(())
  }

  fn serialize_i32(self, v: i32) -> Result<()> {
    self.align_to(4);
    self.buffer.write_i32::<BO>(v)?;
    Ok(())
  }

  fn serialize_i64(self, v: i64) -> Result<()> {
    self.align_to(8);
    self.buffer.write_i64::<BO>(v)?;
    Ok(())
  }

  fn serialize_f32(self, v: f32) -> Result<()> {
    self.align_to(4);
    self.buffer.write_f32::<BO>(v)?;
    Ok(())
  }

  fn serialize_f64(self, v: f64) -> Result<()> {
    self.align_to(8);
    self.buffer.write_f64::<BO>(v)?;
    Ok(())
  }

  //An IDL character is represented as a single octet; the code set used for transmission of
  //character data (e.g., TCS-C) between a particular client and server ORBs is determined
  //via the process described in Section 13.10, "Code Set Conversion"
  fn serialize_char(self, v: char) -> Result<()> {
    let code = v as u32;
    if code > 0xFF {
      return Err(Error::BadChar(code));
    }
    self.write_octet(code as u8);
    Ok(())
  }

  fn serialize_str(self, v: &str) -> Result<()> {
    self.write_string(v)
  }

  fn serialize_bytes(self, v: &[u8]) -> Result<()> {
    self.write_octets(v)
  }

  fn serialize_none(self) -> Result<()> {
    self.write_u32(0)
  }

  fn serialize_some<T>(self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    self.write_u32(1)?;
    value.serialize(self)
  }

  // Unit data is not put on wire
  fn serialize_unit(self) -> Result<()> {
    Ok(())
  }

  fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
    self.serialize_unit()
  }

  fn serialize_unit_variant(
    self,
    _name: &'static str,
    variant_index: u32,
    _variant: &'static str,
  ) -> Result<()> {
    self.write_u32(variant_index)
  }

  fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_newtype_variant<T>(
    self,
    _name: &'static str,
    variant_index: u32,
    _variant: &'static str,
    value: &T,
  ) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    self.write_u32(variant_index)?;
    value.serialize(self)
  }

  fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
    match len {
      Some(element_count) => {
        self.write_u32(element_count as u32)?;
        Ok(self)
      }
      None => Err(Error::SequenceLengthUnknown),
    }
  }

  // Fixed-length arrays and tuples carry no element count
  fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
    Ok(self)
  }

  fn serialize_tuple_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleStruct> {
    Ok(self)
  }

  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleVariant> {
    self.write_u32(variant_index)?;
    Ok(self)
  }

  fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
    match len {
      Some(element_count) => {
        self.write_u32(element_count as u32)?;
        Ok(self)
      }
      None => Err(Error::SequenceLengthUnknown),
    }
  }

  fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
    Ok(self)
  }

  fn serialize_struct_variant(
    self,
    _name: &'static str,
    variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStructVariant> {
    self.write_u32(variant_index)?;
    Ok(self)
  }
}

impl<'a, BO> ser::SerializeSeq for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_element<T>(&mut self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeTuple for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_element<T>(&mut self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeTupleStruct for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_field<T>(&mut self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeTupleVariant for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_field<T>(&mut self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeMap for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_key<T>(&mut self, key: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    key.serialize(&mut **self)
  }

  fn serialize_value<T>(&mut self, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeStruct for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

impl<'a, BO> ser::SerializeStructVariant for &'a mut CdrSerializer<BO>
where
  BO: ByteOrder,
{
  type Ok = ();
  type Error = Error;

  fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(&mut **self)
  }

  fn end(self) -> Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use byteorder::{BigEndian, LittleEndian};
  use serde::{Deserialize, Serialize};

  use super::*;
  use crate::serialization::cdr_deserializer::deserialize_from_little_endian;

  #[test]
  fn cdr_serialization_user_defined_data() {
    // look this example https://www.omg.org/spec/DDSI-RTPS/2.3/PDF
    //10.7 Example for User-defined Topic Data
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct ShapeType {
      color: String,
      x: i32,
      y: i32,
      size: i32,
    }

    let message = ShapeType {
      color: "BLUE".to_string(),
      x: 34,
      y: 100,
      size: 24,
    };

    let expected_serialized_result: Vec<u8> = vec![
      0x05, 0x00, 0x00, 0x00, 0x42, 0x4c, 0x55, 0x45, 0x00, 0x00, 0x00, 0x00, 0x22, 0x00, 0x00,
      0x00, 0x64, 0x00, 0x00, 0x00, 0x18, 0x00, 0x00, 0x00,
    ];

    let serialized = to_bytes::<ShapeType, LittleEndian>(&message, 0).unwrap();
    assert_eq!(serialized, expected_serialized_result);
    let deserialized_message: ShapeType = deserialize_from_little_endian(&serialized).unwrap();
    assert_eq!(deserialized_message, message)
  }

  #[test]
  fn padding_follows_base_offset() {
    // 12 header bytes precede the body, then one octet: the u32 lands on 16.
    let mut ser = CdrSerializer::<BigEndian>::new(12);
    ser.write_octet(0x01);
    ser.write_u32(0xDEAD_BEEF).unwrap();
    assert_eq!(
      ser.buffer(),
      &[0x01, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xBE, 0xEF][..]
    );
    assert_eq!(ser.position(), 20);
  }

  #[test]
  fn empty_string_has_length_one() {
    let mut ser = CdrSerializer::<LittleEndian>::new(0);
    ser.write_string("").unwrap();
    assert_eq!(ser.into_inner(), vec![0x01, 0x00, 0x00, 0x00, 0x00]);
  }

  #[test]
  fn wide_char_is_rejected() {
    assert!(matches!(
      to_bytes::<char, BigEndian>(&'\u{263A}', 0),
      Err(Error::BadChar(0x263A))
    ));
  }
}
