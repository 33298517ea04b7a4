use std::io;

use enumflags2::BitFlags;
use speedy::{Context, Endianness, Readable, Reader, Writable, Writer};

use crate::messages::{
  giop_version::GiopVersion,
  header_flags::{endianness_flag, flags_for, more_fragments_flag, GIOP_Flags},
  magic::Magic,
  message_type::MessageType,
};

/// Size of the common header. Payload length on the wire excludes it.
pub const GIOP_HEADER_LENGTH: usize = 12;
/// GIOP 1.2 Fragment header: common header followed by the request id.
pub const GIOP_1_2_FRAGMENT_HEADER_LENGTH: usize = 16;

const FLAGS_OFFSET: usize = 6;
const LENGTH_OFFSET: usize = 8;

static_assertions::const_assert!(LENGTH_OFFSET + 4 == GIOP_HEADER_LENGTH);
static_assertions::const_assert!(GIOP_1_2_FRAGMENT_HEADER_LENGTH == GIOP_HEADER_LENGTH + 4);

/// The twelve header octets as found on the wire, before the header shape
/// for the version has been chosen.
///
/// The payload length is read and written in the byte order given by the
/// flags octet, regardless of the speedy context.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HeaderFields {
  pub magic: Magic,
  pub version: GiopVersion,
  pub flags: u8,
  pub message_type: MessageType,
  pub payload_length: u32,
}

impl HeaderFields {
  pub fn endianness(&self) -> Endianness {
    endianness_flag(self.version, self.flags)
  }

  pub fn more_fragments(&self) -> bool {
    more_fragments_flag(self.version, self.flags)
  }

  pub fn message_size(&self) -> usize {
    self.payload_length as usize + GIOP_HEADER_LENGTH
  }

  pub fn from_bytes(bytes: &[u8]) -> io::Result<HeaderFields> {
    HeaderFields::read_from_buffer_with_ctx(Endianness::BigEndian, bytes)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
  }

  pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
    self
      .write_to_vec_with_ctx(Endianness::BigEndian)
      .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
  }
}

impl<'a, C: Context> Readable<'a, C> for HeaderFields {
  fn read_from<R: Reader<'a, C>>(reader: &mut R) -> Result<Self, C::Error> {
    let magic: Magic = reader.read_value()?;
    let version: GiopVersion = reader.read_value()?;
    let flags = reader.read_u8()?;
    let message_type: MessageType = reader.read_value()?;
    let mut length = [0u8; 4];
    for b in length.iter_mut() {
      *b = reader.read_u8()?;
    }
    let payload_length = match endianness_flag(version, flags) {
      Endianness::LittleEndian => u32::from_le_bytes(length),
      Endianness::BigEndian => u32::from_be_bytes(length),
    };
    Ok(HeaderFields {
      magic,
      version,
      flags,
      message_type,
      payload_length,
    })
  }

  #[inline]
  fn minimum_bytes_needed() -> usize {
    GIOP_HEADER_LENGTH
  }
}

impl<C: Context> Writable<C> for HeaderFields {
  fn write_to<T: ?Sized + Writer<C>>(&self, writer: &mut T) -> Result<(), C::Error> {
    writer.write_value(&self.magic)?;
    writer.write_value(&self.version)?;
    writer.write_u8(self.flags)?;
    writer.write_value(&self.message_type)?;
    let length = match self.endianness() {
      Endianness::LittleEndian => self.payload_length.to_le_bytes(),
      Endianness::BigEndian => self.payload_length.to_be_bytes(),
    };
    for b in &length {
      writer.write_u8(*b)?;
    }
    Ok(())
  }
}

/// Read-only view shared by all header shapes.
pub trait GiopHeader {
  fn magic(&self) -> Magic;
  fn version(&self) -> GiopVersion;
  fn message_type(&self) -> MessageType;
  fn payload_length(&self) -> u32;
  fn is_little_endian(&self) -> bool;
  fn more_fragments_to_follow(&self) -> bool;

  fn endianness(&self) -> Endianness {
    if self.is_little_endian() {
      Endianness::LittleEndian
    } else {
      Endianness::BigEndian
    }
  }

  /// Payload length plus the 12 header octets.
  fn message_size(&self) -> usize {
    self.payload_length() as usize + GIOP_HEADER_LENGTH
  }
}

/// GIOP 1.0: the sixth octet is a boolean byte order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct Header_1_0 {
  pub magic: Magic,
  pub version: GiopVersion,
  pub little_endian: bool,
  pub message_type: MessageType,
  pub payload_length: u32,
}

/// GIOP 1.1, and the 1.2 messages that have no request id in the header.
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct Header_1_1 {
  pub magic: Magic,
  pub version: GiopVersion,
  pub flags: BitFlags<GIOP_Flags>,
  pub message_type: MessageType,
  pub payload_length: u32,
}

/// GIOP 1.2 Fragment: the 1.1 layout followed by the request id.
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct Header_1_2 {
  pub header: Header_1_1,
  pub request_id: u32,
}

impl GiopHeader for Header_1_0 {
  fn magic(&self) -> Magic {
    self.magic
  }
  fn version(&self) -> GiopVersion {
    self.version
  }
  fn message_type(&self) -> MessageType {
    self.message_type
  }
  fn payload_length(&self) -> u32 {
    self.payload_length
  }
  fn is_little_endian(&self) -> bool {
    self.little_endian
  }
  fn more_fragments_to_follow(&self) -> bool {
    false
  }
}

impl GiopHeader for Header_1_1 {
  fn magic(&self) -> Magic {
    self.magic
  }
  fn version(&self) -> GiopVersion {
    self.version
  }
  fn message_type(&self) -> MessageType {
    self.message_type
  }
  fn payload_length(&self) -> u32 {
    self.payload_length
  }
  fn is_little_endian(&self) -> bool {
    self.flags.contains(GIOP_Flags::LittleEndian)
  }
  fn more_fragments_to_follow(&self) -> bool {
    self.flags.contains(GIOP_Flags::MoreFragments)
  }
}

impl GiopHeader for Header_1_2 {
  fn magic(&self) -> Magic {
    self.header.magic
  }
  fn version(&self) -> GiopVersion {
    self.header.version
  }
  fn message_type(&self) -> MessageType {
    self.header.message_type
  }
  fn payload_length(&self) -> u32 {
    self.header.payload_length
  }
  fn is_little_endian(&self) -> bool {
    self.header.is_little_endian()
  }
  fn more_fragments_to_follow(&self) -> bool {
    self.header.more_fragments_to_follow()
  }
}

/// Which header layout a message uses.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HeaderShape {
  ByteOrder,
  Flags,
  FlagsWithRequestId,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MessageHeader {
  V1_0(Header_1_0),
  V1_1(Header_1_1),
  V1_2(Header_1_2),
}

impl MessageHeader {
  /// Build a header of the given shape from raw wire fields.
  pub fn from_fields(fields: &HeaderFields, shape: HeaderShape) -> MessageHeader {
    match shape {
      HeaderShape::ByteOrder => MessageHeader::V1_0(Header_1_0 {
        magic: fields.magic,
        version: fields.version,
        little_endian: fields.endianness() == Endianness::LittleEndian,
        message_type: fields.message_type,
        payload_length: fields.payload_length,
      }),
      HeaderShape::Flags => MessageHeader::V1_1(Header_1_1::from_fields(fields)),
      HeaderShape::FlagsWithRequestId => MessageHeader::V1_2(Header_1_2 {
        header: Header_1_1::from_fields(fields),
        request_id: 0,
      }),
    }
  }

  /// A fresh outgoing header: "GIOP" magic, big endian, no more fragments,
  /// zero length.
  pub fn new(version: GiopVersion, message_type: MessageType, shape: HeaderShape) -> MessageHeader {
    let fields = HeaderFields {
      magic: Magic::GIOP,
      version,
      flags: flags_for(Endianness::BigEndian),
      message_type,
      payload_length: 0,
    };
    MessageHeader::from_fields(&fields, shape)
  }

  pub fn shape(&self) -> HeaderShape {
    match self {
      MessageHeader::V1_0(_) => HeaderShape::ByteOrder,
      MessageHeader::V1_1(_) => HeaderShape::Flags,
      MessageHeader::V1_2(_) => HeaderShape::FlagsWithRequestId,
    }
  }

  /// 16 for a 1.2 Fragment, 12 otherwise.
  pub fn header_length(&self) -> usize {
    match self {
      MessageHeader::V1_2(_) => GIOP_1_2_FRAGMENT_HEADER_LENGTH,
      _ => GIOP_HEADER_LENGTH,
    }
  }

  pub fn request_id(&self) -> Option<u32> {
    match self {
      MessageHeader::V1_2(h) => Some(h.request_id),
      _ => None,
    }
  }

  pub fn set_request_id(&mut self, request_id: u32) {
    if let MessageHeader::V1_2(h) = self {
      h.request_id = request_id;
    }
  }

  pub fn set_payload_length(&mut self, payload_length: u32) {
    match self {
      MessageHeader::V1_0(h) => h.payload_length = payload_length,
      MessageHeader::V1_1(h) => h.payload_length = payload_length,
      MessageHeader::V1_2(h) => h.header.payload_length = payload_length,
    }
  }

  pub fn set_endianness(&mut self, endianness: Endianness) {
    let little = endianness == Endianness::LittleEndian;
    match self {
      MessageHeader::V1_0(h) => h.little_endian = little,
      MessageHeader::V1_1(h) => set_little_endian(&mut h.flags, little),
      MessageHeader::V1_2(h) => set_little_endian(&mut h.header.flags, little),
    }
  }

  /// No effect on a 1.0 header, which has no fragmentation bit.
  pub fn set_more_fragments(&mut self, more: bool) {
    let flags = match self {
      MessageHeader::V1_0(_) => return,
      MessageHeader::V1_1(h) => &mut h.flags,
      MessageHeader::V1_2(h) => &mut h.header.flags,
    };
    if more {
      flags.insert(GIOP_Flags::MoreFragments);
    } else {
      flags.remove(GIOP_Flags::MoreFragments);
    }
  }

  pub fn flags_octet(&self) -> u8 {
    match self {
      MessageHeader::V1_0(h) => h.little_endian as u8,
      MessageHeader::V1_1(h) => h.flags.bits(),
      MessageHeader::V1_2(h) => h.header.flags.bits(),
    }
  }

  pub fn to_fields(&self) -> HeaderFields {
    HeaderFields {
      magic: self.magic(),
      version: self.version(),
      flags: self.flags_octet(),
      message_type: self.message_type(),
      payload_length: self.payload_length(),
    }
  }

  fn inner(&self) -> &dyn GiopHeader {
    match self {
      MessageHeader::V1_0(h) => h,
      MessageHeader::V1_1(h) => h,
      MessageHeader::V1_2(h) => h,
    }
  }
}

impl Header_1_1 {
  fn from_fields(fields: &HeaderFields) -> Header_1_1 {
    Header_1_1 {
      magic: fields.magic,
      version: fields.version,
      flags: BitFlags::<GIOP_Flags>::from_bits_truncate(fields.flags),
      message_type: fields.message_type,
      payload_length: fields.payload_length,
    }
  }
}

fn set_little_endian(flags: &mut BitFlags<GIOP_Flags>, little: bool) {
  if little {
    flags.insert(GIOP_Flags::LittleEndian);
  } else {
    flags.remove(GIOP_Flags::LittleEndian);
  }
}

impl GiopHeader for MessageHeader {
  fn magic(&self) -> Magic {
    self.inner().magic()
  }
  fn version(&self) -> GiopVersion {
    self.inner().version()
  }
  fn message_type(&self) -> MessageType {
    self.inner().message_type()
  }
  fn payload_length(&self) -> u32 {
    self.inner().payload_length()
  }
  fn is_little_endian(&self) -> bool {
    self.inner().is_little_endian()
  }
  fn more_fragments_to_follow(&self) -> bool {
    self.inner().more_fragments_to_follow()
  }
}

/// Set a bit of the flags octet of an encoded message in place.
pub fn set_flag(message: &mut [u8], bit: u8) {
  if let Some(flags) = message.get_mut(FLAGS_OFFSET) {
    *flags |= bit;
  }
}

/// Clear a bit of the flags octet of an encoded message in place.
pub fn clear_flag(message: &mut [u8], bit: u8) {
  if let Some(flags) = message.get_mut(FLAGS_OFFSET) {
    *flags &= !bit;
  }
}

/// Rewrite the length field of an encoded message so that it matches the
/// buffer, using the byte order the message header declares.
pub fn patch_payload_length(message: &mut [u8]) -> io::Result<()> {
  if message.len() < GIOP_HEADER_LENGTH {
    return Err(io::Error::new(
      io::ErrorKind::InvalidInput,
      "buffer shorter than GIOP header",
    ));
  }
  let payload_length = (message.len() - GIOP_HEADER_LENGTH) as u32;
  let version = GiopVersion::new(message[4], message[5]);
  let length = match endianness_flag(version, message[FLAGS_OFFSET]) {
    Endianness::LittleEndian => payload_length.to_le_bytes(),
    Endianness::BigEndian => payload_length.to_be_bytes(),
  };
  message[LENGTH_OFFSET..GIOP_HEADER_LENGTH].copy_from_slice(&length);
  Ok(())
}
