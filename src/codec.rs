use bytes::{Bytes, BytesMut};
#[allow(unused_imports)]
use log::{debug, error, trace, warn};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
  error::{GiopError, Result},
  factory::MessageFactory,
  messages::{header::GIOP_HEADER_LENGTH, message::Message},
};

/// One whole GIOP message cut from a byte stream.
#[derive(Debug, Clone)]
pub struct GiopFrame {
  /// Common header already parsed. Message-specific fields are filled in by
  /// [`GiopFrame::decode`].
  pub message: Message,
  /// The complete message, header included.
  pub bytes: Bytes,
}

impl GiopFrame {
  /// Decode the message-specific header fields and return the caller's
  /// body, which follows them.
  pub fn decode(&mut self) -> Result<Bytes> {
    let offset = self.message.decode(&self.bytes[GIOP_HEADER_LENGTH..])?;
    Ok(self.bytes.slice(GIOP_HEADER_LENGTH + offset..))
  }
}

/// Frames GIOP messages on a stream transport.
///
/// Header errors surface as soon as 12 octets are buffered, without waiting
/// for the body. So does a length above
/// [`CodecConfig::max_message_size`](crate::config::CodecConfig::max_message_size).
#[derive(Debug, Clone, Default)]
pub struct GiopFrameCodec {
  factory: MessageFactory,
}

impl GiopFrameCodec {
  pub fn new(factory: MessageFactory) -> GiopFrameCodec {
    GiopFrameCodec { factory }
  }

  pub fn factory(&self) -> &MessageFactory {
    &self.factory
  }
}

impl Decoder for GiopFrameCodec {
  type Item = GiopFrame;
  type Error = GiopError;

  fn decode(&mut self, src: &mut BytesMut) -> Result<Option<GiopFrame>> {
    if src.len() < GIOP_HEADER_LENGTH {
      return Ok(None);
    }
    let mut header = [0u8; GIOP_HEADER_LENGTH];
    header.copy_from_slice(&src[..GIOP_HEADER_LENGTH]);
    let message = self.factory.message_from_header(&header)?;

    let size = message.message_size();
    let limit = self.factory.config().max_message_size();
    if size > limit {
      warn!(
        "Refusing {:?} of {} octets, limit is {}",
        message.message_type(),
        size,
        limit
      );
      return Err(GiopError::MessageTooLarge { size, limit });
    }
    if src.len() < size {
      src.reserve(size - src.len());
      return Ok(None);
    }
    let bytes = src.split_to(size).freeze();
    trace!("Framed {:?}, {} octets", message.message_type(), size);
    Ok(Some(GiopFrame { message, bytes }))
  }
}

impl Encoder<Message> for GiopFrameCodec {
  type Error = GiopError;

  fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
    dst.extend_from_slice(&item.encode(&[])?);
    Ok(())
  }
}

/// Message plus the caller's body.
impl Encoder<(Message, Bytes)> for GiopFrameCodec {
  type Error = GiopError;

  fn encode(&mut self, item: (Message, Bytes), dst: &mut BytesMut) -> Result<()> {
    let (message, body) = item;
    dst.extend_from_slice(&message.encode(&body)?);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    config::CodecConfig,
    error::Recovery,
    messages::{
      giop_version::GiopVersion, kinds::reply::ReplyOutcome, message::MessageKind,
      message_type::MessageType,
    },
  };

  #[test]
  fn waits_for_whole_message() {
    let mut codec = GiopFrameCodec::default();
    let reply =
      MessageFactory::create_reply(GiopVersion::V1_2, 11, ReplyOutcome::NoException, vec![])
        .unwrap();
    let bytes = reply.encode(&[1, 2, 3, 4]).unwrap();

    let mut src = BytesMut::new();
    src.extend_from_slice(&bytes[..10]);
    assert!(codec.decode(&mut src).unwrap().is_none());
    src.extend_from_slice(&bytes[10..20]);
    assert!(codec.decode(&mut src).unwrap().is_none());
    src.extend_from_slice(&bytes[20..]);
    let mut frame = codec.decode(&mut src).unwrap().unwrap();
    assert!(src.is_empty());
    assert_eq!(frame.bytes.len(), bytes.len());

    let body = frame.decode().unwrap();
    assert_eq!(&body[..], &[1, 2, 3, 4]);
    assert_eq!(frame.message.request_id(), Some(11));
  }

  #[test]
  fn back_to_back_messages() {
    let mut codec = GiopFrameCodec::default();
    let mut src = BytesMut::new();
    codec
      .encode(
        MessageFactory::create_cancel_request(GiopVersion::V1_1, 3).unwrap(),
        &mut src,
      )
      .unwrap();
    codec
      .encode(
        MessageFactory::create_close_connection(GiopVersion::V1_1).unwrap(),
        &mut src,
      )
      .unwrap();

    let mut first = codec.decode(&mut src).unwrap().unwrap();
    first.decode().unwrap();
    assert_eq!(first.message.request_id(), Some(3));
    let second = codec.decode(&mut src).unwrap().unwrap();
    assert_eq!(second.message.message_type(), MessageType::CLOSE_CONNECTION);
    assert_eq!(second.message.kind, MessageKind::CloseConnection);
    assert!(codec.decode(&mut src).unwrap().is_none());
  }

  #[test]
  fn bad_header_fails_early() {
    let mut codec = GiopFrameCodec::default();
    let mut src = BytesMut::from(&b"HTTP/1.1 200"[..]);
    match codec.decode(&mut src) {
      Err(e) => assert!(e.is_framing_error()),
      Ok(_) => panic!("garbage accepted"),
    }
  }

  #[test]
  fn oversized_message_refused_before_buffering() {
    let mut codec = GiopFrameCodec::default();
    let mut src = BytesMut::from(&b"GIOP\x01\x02\x00\x01\xff\xff\xff\xf0"[..]);
    match codec.decode(&mut src) {
      Err(e @ GiopError::MessageTooLarge { .. }) => {
        assert_eq!(e.recovery(), Recovery::SendMessageErrorAndClose)
      }
      other => panic!("unexpected {:?}", other),
    }
    assert!(src.capacity() < 1024);
  }

  #[test]
  fn limit_comes_from_config() {
    let config = CodecConfig::builder().max_message_size(64).build().unwrap();
    let mut codec = GiopFrameCodec::new(MessageFactory::new(config));
    let reply =
      MessageFactory::create_reply(GiopVersion::V1_2, 1, ReplyOutcome::NoException, vec![])
        .unwrap();

    let mut src = BytesMut::from(&reply.encode(&[0; 40]).unwrap()[..]);
    assert!(codec.decode(&mut src).unwrap().is_some());

    let mut src = BytesMut::from(&reply.encode(&[0; 41]).unwrap()[..]);
    match codec.decode(&mut src) {
      Err(GiopError::MessageTooLarge { size, limit }) => {
        assert_eq!(limit, 64);
        assert!(size > 64);
      }
      other => panic!("unexpected {:?}", other),
    }
  }
}
