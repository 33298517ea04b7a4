use std::{cmp::min, io};

#[allow(unused_imports)]
use log::{debug, error, trace, warn};

use crate::{
  error::{GiopError, Result},
  fragmentation::may_fragment,
  messages::{
    giop_version::GiopVersion,
    header::{
      patch_payload_length, set_flag, GiopHeader, HeaderShape, MessageHeader,
      GIOP_1_2_FRAGMENT_HEADER_LENGTH,
    },
    header_flags::{GIOP_Flags, FLAG_NO_FRAG_BIG_ENDIAN},
    message::{Message, MessageKind},
    message_type::MessageType,
  },
};

/// An empty Fragment that continues `source`.
///
/// Magic and version are copied, flags start as big endian with no more
/// fragments, and a 1.2 fragment carries the request id of `source`.
pub fn fragment_from(source: &Message) -> Result<Message> {
  let version = source.version();
  let source_type = source.message_type();
  if !may_fragment(version, source_type) {
    return Err(GiopError::FragmentationDisallowed {
      version,
      message_type: source_type,
    });
  }

  let mut fields = source.header.to_fields();
  fields.flags = FLAG_NO_FRAG_BIG_ENDIAN;
  fields.message_type = MessageType::FRAGMENT;
  fields.payload_length = 0;

  let header = if version == GiopVersion::V1_2 {
    let request_id = source
      .request_id()
      .ok_or(GiopError::NoRequestId(source_type))?;
    let mut header = MessageHeader::from_fields(&fields, HeaderShape::FlagsWithRequestId);
    header.set_request_id(request_id);
    header
  } else {
    MessageHeader::from_fields(&fields, HeaderShape::Flags)
  };
  Ok(Message::new(header, MessageKind::Fragment))
}

/// Cut an encoded message into wire messages of at most `fragment_size`
/// octets each.
///
/// The first piece is the head of `encoded` with the more-fragments bit set.
/// The rest are Fragment messages in the byte order of `message`; the last
/// one has the bit cleared. A message that already fits is returned as is.
pub fn split_into_fragments(
  message: &Message,
  encoded: &[u8],
  fragment_size: usize,
) -> Result<Vec<Vec<u8>>> {
  if encoded.len() <= fragment_size {
    return Ok(vec![encoded.to_vec()]);
  }
  if fragment_size <= GIOP_1_2_FRAGMENT_HEADER_LENGTH {
    return Err(GiopError::Io(io::Error::new(
      io::ErrorKind::InvalidInput,
      format!("fragment size {} leaves no room for data", fragment_size),
    )));
  }

  let mut template = fragment_from(message)?;
  template.header.set_endianness(message.header.endianness());
  let data_per_fragment = fragment_size - template.header.header_length();

  let mut first = encoded[..fragment_size].to_vec();
  set_flag(&mut first, GIOP_Flags::MoreFragments as u8);
  patch_payload_length(&mut first)?;
  let mut pieces = vec![first];

  let mut rest = &encoded[fragment_size..];
  while !rest.is_empty() {
    let (chunk, tail) = rest.split_at(min(data_per_fragment, rest.len()));
    template.header.set_more_fragments(!tail.is_empty());
    pieces.push(template.encode(chunk)?);
    rest = tail;
  }
  debug!(
    "Split {:?} of {} octets into {} pieces",
    message.message_type(),
    encoded.len(),
    pieces.len()
  );
  Ok(pieces)
}
