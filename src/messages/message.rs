use byteorder::{BigEndian, ByteOrder, LittleEndian};
#[allow(unused_imports)]
use log::{debug, error, trace, warn};
use speedy::Endianness;

use crate::{
  error::Result,
  messages::{
    giop_version::GiopVersion,
    header::{patch_payload_length, GiopHeader, MessageHeader, GIOP_HEADER_LENGTH},
    kinds::{
      cancel_request::CancelRequest, locate_reply::LocateReplyMessage,
      locate_request::LocateRequestMessage, reply::ReplyMessage, request::RequestMessage,
      HeaderCodec,
    },
    message_type::MessageType,
  },
  serialization::{CdrDeserializer, CdrSerializer},
};

/// Message-specific part of a GIOP message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
  Request(RequestMessage),
  Reply(ReplyMessage),
  CancelRequest(CancelRequest),
  LocateRequest(LocateRequestMessage),
  LocateReply(LocateReplyMessage),
  CloseConnection,
  MessageError,
  /// 1.2 fragments keep their request id in the header.
  Fragment,
}

impl MessageKind {
  pub fn message_type(&self) -> MessageType {
    match self {
      MessageKind::Request(_) => MessageType::REQUEST,
      MessageKind::Reply(_) => MessageType::REPLY,
      MessageKind::CancelRequest(_) => MessageType::CANCEL_REQUEST,
      MessageKind::LocateRequest(_) => MessageType::LOCATE_REQUEST,
      MessageKind::LocateReply(_) => MessageType::LOCATE_REPLY,
      MessageKind::CloseConnection => MessageType::CLOSE_CONNECTION,
      MessageKind::MessageError => MessageType::MESSAGE_ERROR,
      MessageKind::Fragment => MessageType::FRAGMENT,
    }
  }
}

/// A GIOP message: common header plus the message-specific header fields.
///
/// The caller's body (request arguments, reply results, fragment data) is
/// not part of it; `decode` reports where that body starts and `encode`
/// appends it.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
  pub header: MessageHeader,
  pub kind: MessageKind,
}

impl Message {
  pub fn new(header: MessageHeader, kind: MessageKind) -> Message {
    Message { header, kind }
  }

  pub fn version(&self) -> GiopVersion {
    self.header.version()
  }

  pub fn message_type(&self) -> MessageType {
    self.header.message_type()
  }

  pub fn message_size(&self) -> usize {
    self.header.message_size()
  }

  pub fn more_fragments_to_follow(&self) -> bool {
    self.header.more_fragments_to_follow()
  }

  /// Encode outgoing messages little endian instead of the default big
  /// endian.
  pub fn with_endianness(mut self, endianness: Endianness) -> Message {
    self.header.set_endianness(endianness);
    self
  }

  /// Request id carried by the header fields, if the kind has one. A 1.1
  /// Fragment has none.
  pub fn request_id(&self) -> Option<u32> {
    match &self.kind {
      MessageKind::Request(r) => Some(r.request_id()),
      MessageKind::Reply(r) => Some(r.request_id()),
      MessageKind::CancelRequest(c) => Some(c.request_id),
      MessageKind::LocateRequest(r) => Some(r.request_id()),
      MessageKind::LocateReply(r) => Some(r.request_id()),
      MessageKind::Fragment => self.header.request_id(),
      MessageKind::CloseConnection | MessageKind::MessageError => None,
    }
  }

  /// 1.2 Request and Reply bodies start on an 8-octet boundary.
  fn body_is_aligned(&self) -> bool {
    self.version() == GiopVersion::V1_2
      && matches!(self.kind, MessageKind::Request(_) | MessageKind::Reply(_))
  }

  /// Populate the message-specific header fields from `body`, the octets
  /// following the 12-octet common header. Returns the offset within `body`
  /// at which the caller's own data begins.
  pub fn decode(&mut self, body: &[u8]) -> Result<usize> {
    match self.header.endianness() {
      Endianness::LittleEndian => self.decode_with(CdrDeserializer::<LittleEndian>::new(
        body,
        GIOP_HEADER_LENGTH,
      )),
      Endianness::BigEndian => {
        self.decode_with(CdrDeserializer::<BigEndian>::new(body, GIOP_HEADER_LENGTH))
      }
    }
  }

  fn decode_with<BO: ByteOrder>(&mut self, mut de: CdrDeserializer<BO>) -> Result<usize> {
    let version = self.version();
    match &mut self.kind {
      MessageKind::Request(r) => r.decode_header(&mut de, version)?,
      MessageKind::Reply(r) => r.decode_header(&mut de, version)?,
      MessageKind::CancelRequest(c) => *c = CancelRequest::decode_header(&mut de, version)?,
      MessageKind::LocateRequest(r) => r.decode_header(&mut de, version)?,
      MessageKind::LocateReply(r) => r.decode_header(&mut de, version)?,
      MessageKind::CloseConnection | MessageKind::MessageError => (),
      MessageKind::Fragment => {
        if let MessageHeader::V1_2(_) = self.header {
          let request_id = de.read_u32()?;
          self.header.set_request_id(request_id);
        }
      }
    }
    if self.body_is_aligned() && !de.is_empty() {
      de.align_to(8)?;
    }
    trace!(
      "Decoded {:?} header, body starts at message offset {}",
      self.message_type(),
      de.position()
    );
    Ok(de.position() - GIOP_HEADER_LENGTH)
  }

  /// Whole message on the wire: common header, message-specific header,
  /// alignment padding if any, then `payload`. The length field is filled
  /// in from the result.
  pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
    let mut fields = self.header.to_fields();
    fields.payload_length = 0;
    let buffer = fields.to_bytes()?;
    let mut message = match self.header.endianness() {
      Endianness::LittleEndian => {
        self.encode_with(CdrSerializer::<LittleEndian>::from_vec(buffer), payload)?
      }
      Endianness::BigEndian => {
        self.encode_with(CdrSerializer::<BigEndian>::from_vec(buffer), payload)?
      }
    };
    patch_payload_length(&mut message)?;
    Ok(message)
  }

  fn encode_with<BO: ByteOrder>(
    &self,
    mut ser: CdrSerializer<BO>,
    payload: &[u8],
  ) -> Result<Vec<u8>> {
    match &self.kind {
      MessageKind::Request(r) => r.encode_header(&mut ser)?,
      MessageKind::Reply(r) => r.encode_header(&mut ser)?,
      MessageKind::CancelRequest(c) => c.encode_header(&mut ser)?,
      MessageKind::LocateRequest(r) => r.encode_header(&mut ser)?,
      MessageKind::LocateReply(r) => r.encode_header(&mut ser)?,
      MessageKind::CloseConnection | MessageKind::MessageError => (),
      MessageKind::Fragment => {
        if let Some(request_id) = self.header.request_id() {
          ser.write_u32(request_id)?;
        }
      }
    }
    if self.body_is_aligned() && !payload.is_empty() {
      ser.align_to(8);
    }
    ser.write_fixed_octets(payload);
    Ok(ser.into_inner())
  }
}
