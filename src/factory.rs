use std::io::Read;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::{
  config::CodecConfig,
  error::{GiopError, Result},
  fragmentation::validate_fragmentation,
  messages::{
    addressing::{extract_object_key, AddressingDisposition, ObjectKey, TargetAddress},
    giop_version::GiopVersion,
    header::{HeaderFields, HeaderShape, MessageHeader, GIOP_HEADER_LENGTH},
    ior::{IiopProfile, Ior, IorAddressingInfo},
    kinds::{
      cancel_request::CancelRequest,
      locate_reply::{LocateReply, LocateReplyMessage, LocateReplyOutcome},
      locate_request::{LocateRequestMessage, LocateRequest_1_0, LocateRequest_1_2},
      reply::{ReplyMessage, ReplyOutcome, Reply_1_0, Reply_1_2},
      request::{RequestMessage, Request_1_0, Request_1_1, Request_1_2, ResponseFlags},
    },
    message::{Message, MessageKind},
    message_type::MessageType,
    service_context::ServiceContextList,
  },
  wire::read_exactly,
};

type Constructor = fn() -> MessageKind;

struct DispatchEntry {
  message_type: MessageType,
  version: GiopVersion,
  shape: HeaderShape,
  construct: Constructor,
}

macro_rules! entry {
  ($message_type:ident, $version:ident, $shape:ident, $construct:ident) => {
    DispatchEntry {
      message_type: MessageType::$message_type,
      version: GiopVersion::$version,
      shape: HeaderShape::$shape,
      construct: $construct,
    }
  };
}

fn request_1_0() -> MessageKind {
  MessageKind::Request(RequestMessage::V1_0(Request_1_0::default()))
}
fn request_1_1() -> MessageKind {
  MessageKind::Request(RequestMessage::V1_1(Request_1_1::default()))
}
fn request_1_2() -> MessageKind {
  MessageKind::Request(RequestMessage::V1_2(Request_1_2::default()))
}
fn reply_1_0() -> MessageKind {
  MessageKind::Reply(ReplyMessage::V1_0(Reply_1_0::default()))
}
fn reply_1_1() -> MessageKind {
  MessageKind::Reply(ReplyMessage::V1_1(Reply_1_0::default()))
}
fn reply_1_2() -> MessageKind {
  MessageKind::Reply(ReplyMessage::V1_2(Reply_1_2::default()))
}
fn cancel_request() -> MessageKind {
  MessageKind::CancelRequest(CancelRequest::default())
}
fn locate_request_1_0() -> MessageKind {
  MessageKind::LocateRequest(LocateRequestMessage::V1_0(LocateRequest_1_0::default()))
}
fn locate_request_1_1() -> MessageKind {
  MessageKind::LocateRequest(LocateRequestMessage::V1_1(LocateRequest_1_0::default()))
}
fn locate_request_1_2() -> MessageKind {
  MessageKind::LocateRequest(LocateRequestMessage::V1_2(LocateRequest_1_2::default()))
}
fn locate_reply_1_0() -> MessageKind {
  MessageKind::LocateReply(LocateReplyMessage::V1_0(LocateReply::default()))
}
fn locate_reply_1_1() -> MessageKind {
  MessageKind::LocateReply(LocateReplyMessage::V1_1(LocateReply::default()))
}
fn locate_reply_1_2() -> MessageKind {
  MessageKind::LocateReply(LocateReplyMessage::V1_2(LocateReply::default()))
}
fn close_connection() -> MessageKind {
  MessageKind::CloseConnection
}
fn message_error() -> MessageKind {
  MessageKind::MessageError
}
fn fragment() -> MessageKind {
  MessageKind::Fragment
}

/// Every legal (message type, version) pair with its header shape.
/// CancelRequest, CloseConnection and MessageError keep the 1.1 shape in
/// 1.2. There is no 1.0 Fragment.
static DISPATCH_TABLE: [DispatchEntry; 23] = [
  entry!(REQUEST, V1_0, ByteOrder, request_1_0),
  entry!(REQUEST, V1_1, Flags, request_1_1),
  entry!(REQUEST, V1_2, Flags, request_1_2),
  entry!(REPLY, V1_0, ByteOrder, reply_1_0),
  entry!(REPLY, V1_1, Flags, reply_1_1),
  entry!(REPLY, V1_2, Flags, reply_1_2),
  entry!(CANCEL_REQUEST, V1_0, ByteOrder, cancel_request),
  entry!(CANCEL_REQUEST, V1_1, Flags, cancel_request),
  entry!(CANCEL_REQUEST, V1_2, Flags, cancel_request),
  entry!(LOCATE_REQUEST, V1_0, ByteOrder, locate_request_1_0),
  entry!(LOCATE_REQUEST, V1_1, Flags, locate_request_1_1),
  entry!(LOCATE_REQUEST, V1_2, Flags, locate_request_1_2),
  entry!(LOCATE_REPLY, V1_0, ByteOrder, locate_reply_1_0),
  entry!(LOCATE_REPLY, V1_1, Flags, locate_reply_1_1),
  entry!(LOCATE_REPLY, V1_2, Flags, locate_reply_1_2),
  entry!(CLOSE_CONNECTION, V1_0, ByteOrder, close_connection),
  entry!(CLOSE_CONNECTION, V1_1, Flags, close_connection),
  entry!(CLOSE_CONNECTION, V1_2, Flags, close_connection),
  entry!(MESSAGE_ERROR, V1_0, ByteOrder, message_error),
  entry!(MESSAGE_ERROR, V1_1, Flags, message_error),
  entry!(MESSAGE_ERROR, V1_2, Flags, message_error),
  entry!(FRAGMENT, V1_1, Flags, fragment),
  entry!(FRAGMENT, V1_2, FlagsWithRequestId, fragment),
];

fn lookup(message_type: MessageType, version: GiopVersion) -> Option<&'static DispatchEntry> {
  DISPATCH_TABLE
    .iter()
    .find(|e| e.message_type == message_type && e.version == version)
}

/// Builds GIOP messages: from incoming headers, and from scratch for
/// sending.
#[derive(Debug, Clone, Default)]
pub struct MessageFactory {
  config: CodecConfig,
}

impl MessageFactory {
  pub fn new(config: CodecConfig) -> MessageFactory {
    MessageFactory { config }
  }

  pub fn config(&self) -> &CodecConfig {
    &self.config
  }

  /// Read the 12-octet common header from `source` and build the matching
  /// message. Only the common header is consumed; call
  /// [`Message::decode`] with the rest of the message afterwards.
  pub fn read_message<R: Read + ?Sized>(&self, source: &mut R) -> Result<Message> {
    let mut header = [0u8; GIOP_HEADER_LENGTH];
    read_exactly(source, &mut header, self.config.read_retry_limit())?;
    self.message_from_header(&header)
  }

  /// Validate a common header and build the matching, not yet decoded,
  /// message.
  pub fn message_from_header(&self, header: &[u8; GIOP_HEADER_LENGTH]) -> Result<Message> {
    let fields = HeaderFields::from_bytes(header)?;

    if !fields.magic.is_valid() {
      warn!("Bad GIOP magic {:02X?}", fields.magic.bytes());
      return Err(GiopError::MagicMismatch {
        found: fields.magic.bytes(),
      });
    }

    let is_message_error = fields.message_type == MessageType::MESSAGE_ERROR;
    if fields.version > self.config.max_version() && !is_message_error {
      warn!(
        "Peer sent GIOP {}, we support up to {}",
        fields.version,
        self.config.max_version()
      );
      return Err(GiopError::VersionTooNew {
        received: fields.version,
        supported: self.config.max_version(),
      });
    }

    validate_fragmentation(fields.version, fields.flags, fields.message_type)?;

    let (shape, kind) = match lookup(fields.message_type, fields.version) {
      Some(e) => (e.shape, (e.construct)()),
      None if !fields.message_type.is_known() => {
        warn!("Unknown GIOP message type {}", fields.message_type.value());
        return Err(GiopError::UnknownMessageType(fields.message_type.value()));
      }
      // MessageError from a newer peer, used to negotiate the version down
      None if is_message_error && fields.version > GiopVersion::MAX_SUPPORTED => {
        (HeaderShape::Flags, MessageKind::MessageError)
      }
      None => return Err(GiopError::UnsupportedVersion(fields.version)),
    };

    trace!(
      "Incoming {:?} GIOP {} payload {} octets",
      fields.message_type,
      fields.version,
      fields.payload_length
    );
    Ok(Message::new(MessageHeader::from_fields(&fields, shape), kind))
  }

  /// Object key named by `target`, honoring the configured addressing
  /// preference.
  pub fn extract_object_key(&self, target: &TargetAddress) -> Result<ObjectKey> {
    extract_object_key(target, self.config.addressing_preference())
  }

  fn new_message(version: GiopVersion, kind: MessageKind) -> Result<Message> {
    let message_type = kind.message_type();
    let shape = lookup(message_type, version)
      .map(|e| e.shape)
      .ok_or(GiopError::UnsupportedVersion(version))?;
    Ok(Message::new(
      MessageHeader::new(version, message_type, shape),
      kind,
    ))
  }

  /// Request addressed by object key. Under 1.2 the key becomes a KeyAddr
  /// target and the principal is dropped.
  pub fn create_request(
    version: GiopVersion,
    request_id: u32,
    response_expected: bool,
    object_key: &[u8],
    operation: &str,
    service_contexts: ServiceContextList,
    requesting_principal: &[u8],
  ) -> Result<Message> {
    let kind = match version {
      GiopVersion::V1_0 => RequestMessage::V1_0(Request_1_0 {
        service_contexts,
        request_id,
        response_expected,
        object_key: object_key.to_vec(),
        operation: operation.to_string(),
        requesting_principal: requesting_principal.to_vec(),
      }),
      GiopVersion::V1_1 => RequestMessage::V1_1(Request_1_1 {
        service_contexts,
        request_id,
        response_expected,
        reserved: [0; 3],
        object_key: object_key.to_vec(),
        operation: operation.to_string(),
        requesting_principal: requesting_principal.to_vec(),
      }),
      GiopVersion::V1_2 => RequestMessage::V1_2(Request_1_2 {
        request_id,
        response_flags: ResponseFlags::from_response_expected(response_expected),
        reserved: [0; 3],
        target: TargetAddress::ObjectKey(object_key.to_vec()),
        operation: operation.to_string(),
        service_contexts,
      }),
      other => return Err(GiopError::UnsupportedVersion(other)),
    };
    MessageFactory::new_message(version, MessageKind::Request(kind))
  }

  /// Request addressed through `ior`. KeyAddr works in every version and
  /// uses the object key of the first IIOP profile. ProfileAddr and
  /// ReferenceAddr need 1.2; ReferenceAddr selects profile 0.
  #[allow(clippy::too_many_arguments)]
  pub fn create_request_with_disposition(
    version: GiopVersion,
    request_id: u32,
    response_expected: bool,
    ior: &Ior,
    disposition: AddressingDisposition,
    operation: &str,
    service_contexts: ServiceContextList,
    requesting_principal: &[u8],
  ) -> Result<Message> {
    match disposition {
      AddressingDisposition::KeyAddr => {
        let object_key = ior
          .iiop_profile_index()
          .and_then(|i| IiopProfile::from_tagged_profile(&ior.profiles[i]).ok())
          .map(|p| p.object_key)
          .ok_or(GiopError::InvalidObjectKey)?;
        MessageFactory::create_request(
          version,
          request_id,
          response_expected,
          &object_key,
          operation,
          service_contexts,
          requesting_principal,
        )
      }
      _ if version != GiopVersion::V1_2 => Err(GiopError::UnsupportedVersion(version)),
      AddressingDisposition::ProfileAddr | AddressingDisposition::ReferenceAddr => {
        let target = if disposition == AddressingDisposition::ProfileAddr {
          let profile = ior
            .iiop_profile_index()
            .map(|i| ior.profiles[i].clone())
            .ok_or(GiopError::InvalidObjectKey)?;
          TargetAddress::Profile(profile)
        } else {
          TargetAddress::Reference(IorAddressingInfo {
            selected_profile_index: 0,
            ior: ior.clone(),
          })
        };
        MessageFactory::new_message(
          version,
          MessageKind::Request(RequestMessage::V1_2(Request_1_2 {
            request_id,
            response_flags: ResponseFlags::from_response_expected(response_expected),
            reserved: [0; 3],
            target,
            operation: operation.to_string(),
            service_contexts,
          })),
        )
      }
    }
  }

  pub fn create_reply(
    version: GiopVersion,
    request_id: u32,
    outcome: ReplyOutcome,
    service_contexts: ServiceContextList,
  ) -> Result<Message> {
    let status = outcome.status();
    if !status.is_legal_in(version) {
      return Err(GiopError::IllegalReplyStatus {
        status: status.into(),
        version,
      });
    }
    let kind = match version {
      GiopVersion::V1_0 | GiopVersion::V1_1 => {
        let reply = Reply_1_0 {
          service_contexts,
          request_id,
          outcome,
        };
        if version == GiopVersion::V1_0 {
          ReplyMessage::V1_0(reply)
        } else {
          ReplyMessage::V1_1(reply)
        }
      }
      GiopVersion::V1_2 => ReplyMessage::V1_2(Reply_1_2 {
        request_id,
        outcome,
        service_contexts,
      }),
      other => return Err(GiopError::UnsupportedVersion(other)),
    };
    MessageFactory::new_message(version, MessageKind::Reply(kind))
  }

  /// Under 1.2 the key is sent as a KeyAddr target.
  pub fn create_locate_request(
    version: GiopVersion,
    request_id: u32,
    object_key: &[u8],
  ) -> Result<Message> {
    let kind = match version {
      GiopVersion::V1_0 => LocateRequestMessage::V1_0(LocateRequest_1_0 {
        request_id,
        object_key: object_key.to_vec(),
      }),
      GiopVersion::V1_1 => LocateRequestMessage::V1_1(LocateRequest_1_0 {
        request_id,
        object_key: object_key.to_vec(),
      }),
      GiopVersion::V1_2 => LocateRequestMessage::V1_2(LocateRequest_1_2 {
        request_id,
        target: TargetAddress::ObjectKey(object_key.to_vec()),
      }),
      other => return Err(GiopError::UnsupportedVersion(other)),
    };
    MessageFactory::new_message(version, MessageKind::LocateRequest(kind))
  }

  pub fn create_locate_reply(
    version: GiopVersion,
    request_id: u32,
    outcome: LocateReplyOutcome,
  ) -> Result<Message> {
    let status = outcome.status();
    if !status.is_legal_in(version) {
      return Err(GiopError::IllegalLocateStatus {
        status: status.into(),
        version,
      });
    }
    let reply = LocateReply {
      request_id,
      outcome,
    };
    let kind = match version {
      GiopVersion::V1_0 => LocateReplyMessage::V1_0(reply),
      GiopVersion::V1_1 => LocateReplyMessage::V1_1(reply),
      GiopVersion::V1_2 => LocateReplyMessage::V1_2(reply),
      other => return Err(GiopError::UnsupportedVersion(other)),
    };
    MessageFactory::new_message(version, MessageKind::LocateReply(kind))
  }

  pub fn create_cancel_request(version: GiopVersion, request_id: u32) -> Result<Message> {
    MessageFactory::new_message(
      version,
      MessageKind::CancelRequest(CancelRequest { request_id }),
    )
  }

  pub fn create_close_connection(version: GiopVersion) -> Result<Message> {
    MessageFactory::new_message(version, MessageKind::CloseConnection)
  }

  pub fn create_message_error(version: GiopVersion) -> Result<Message> {
    MessageFactory::new_message(version, MessageKind::MessageError)
  }

  /// The MessageError sent before closing a connection after a framing
  /// error. Carries our highest version.
  pub fn message_error_reply(&self) -> Result<Message> {
    MessageFactory::create_message_error(self.config.max_version())
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;
  use crate::{
    config::CodecConfigBuilder,
    messages::{addressing::AddressingPreference, header::GiopHeader, kinds::reply::ReplyOutcome},
  };

  fn header(version: GiopVersion, flags: u8, message_type: u8) -> [u8; 12] {
    [
      0x47, 0x49, 0x4F, 0x50, version.major, version.minor, flags, message_type, 0, 0, 0, 0,
    ]
  }

  #[test]
  fn dispatch_table_is_complete() {
    for t in &MessageType::ALL {
      for v in &[GiopVersion::V1_0, GiopVersion::V1_1, GiopVersion::V1_2] {
        let found = lookup(*t, *v);
        if *t == MessageType::FRAGMENT && *v == GiopVersion::V1_0 {
          assert!(found.is_none());
        } else {
          let e = found.unwrap();
          assert_eq!((e.construct)().message_type(), *t);
        }
      }
    }
  }

  #[test]
  fn shapes_per_version() {
    let factory = MessageFactory::default();
    let close_1_2 = factory
      .message_from_header(&header(GiopVersion::V1_2, 0, 5))
      .unwrap();
    assert_eq!(close_1_2.header.shape(), HeaderShape::Flags);
    let fragment_1_2 = factory
      .message_from_header(&header(GiopVersion::V1_2, 0, 7))
      .unwrap();
    assert_eq!(fragment_1_2.header.shape(), HeaderShape::FlagsWithRequestId);
    let request_1_0 = factory
      .message_from_header(&header(GiopVersion::V1_0, 1, 0))
      .unwrap();
    assert_eq!(request_1_0.header.shape(), HeaderShape::ByteOrder);
    assert!(request_1_0.header.is_little_endian());
  }

  #[test]
  fn validation_order() {
    let factory = MessageFactory::default();

    let mut bad_magic = header(GiopVersion::new(9, 9), 0x02, 99);
    bad_magic[0] = b'X';
    match factory.message_from_header(&bad_magic) {
      Err(GiopError::MagicMismatch { found }) => assert_eq!(&found, b"XIOP"),
      other => panic!("unexpected {:?}", other),
    }

    match factory.message_from_header(&header(GiopVersion::new(1, 3), 0x02, 2)) {
      Err(GiopError::VersionTooNew { received, supported }) => {
        assert_eq!(received, GiopVersion::new(1, 3));
        assert_eq!(supported, GiopVersion::V1_2);
      }
      other => panic!("unexpected {:?}", other),
    }

    match factory.message_from_header(&header(GiopVersion::V1_2, 0x02, 2)) {
      Err(GiopError::FragmentationDisallowed { .. }) => (),
      other => panic!("unexpected {:?}", other),
    }

    match factory.message_from_header(&header(GiopVersion::V1_2, 0x00, 8)) {
      Err(GiopError::UnknownMessageType(8)) => (),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn newer_message_error_is_accepted() {
    let factory = MessageFactory::new(
      CodecConfigBuilder::new()
        .max_version(GiopVersion::V1_1)
        .build()
        .unwrap(),
    );
    let m = factory
      .message_from_header(&header(GiopVersion::V1_2, 0, 6))
      .unwrap();
    assert_eq!(m.kind, MessageKind::MessageError);
    let m = factory
      .message_from_header(&header(GiopVersion::new(2, 0), 0, 6))
      .unwrap();
    assert_eq!(m.version(), GiopVersion::new(2, 0));
    assert!(factory
      .message_from_header(&header(GiopVersion::V1_2, 0, 0))
      .is_err());
    assert_eq!(
      factory.message_error_reply().unwrap().version(),
      GiopVersion::V1_1
    );
  }

  #[test]
  fn older_unknown_version_is_unsupported() {
    let factory = MessageFactory::default();
    match factory.message_from_header(&header(GiopVersion::new(0, 9), 0, 0)) {
      Err(GiopError::UnsupportedVersion(v)) => assert_eq!(v, GiopVersion::new(0, 9)),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn truncated_stream_is_io_error() {
    let factory = MessageFactory::default();
    let mut source: &[u8] = &[0x47, 0x49, 0x4F];
    match factory.read_message(&mut source) {
      Err(GiopError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn reply_status_checked_on_create() {
    let forward = ReplyOutcome::LocationForwardPermanent(Ior::default());
    assert!(MessageFactory::create_reply(GiopVersion::V1_1, 1, forward.clone(), vec![]).is_err());
    assert!(MessageFactory::create_reply(GiopVersion::V1_2, 1, forward, vec![]).is_ok());
  }

  #[test]
  fn request_with_disposition() {
    let profile = IiopProfile::new(GiopVersion::V1_2, "host", 1050, b"obj");
    let ior = Ior::from_iiop_profile("IDL:Echo:1.0", &profile).unwrap();

    let by_key = MessageFactory::create_request_with_disposition(
      GiopVersion::V1_1,
      1,
      true,
      &ior,
      AddressingDisposition::KeyAddr,
      "echo",
      vec![],
      &[],
    )
    .unwrap();
    match &by_key.kind {
      MessageKind::Request(RequestMessage::V1_1(r)) => assert_eq!(r.object_key, b"obj".to_vec()),
      other => panic!("unexpected {:?}", other),
    }

    assert!(MessageFactory::create_request_with_disposition(
      GiopVersion::V1_1,
      1,
      true,
      &ior,
      AddressingDisposition::ProfileAddr,
      "echo",
      vec![],
      &[],
    )
    .is_err());

    let by_reference = MessageFactory::create_request_with_disposition(
      GiopVersion::V1_2,
      2,
      false,
      &ior,
      AddressingDisposition::ReferenceAddr,
      "echo",
      vec![],
      &[],
    )
    .unwrap();
    match &by_reference.kind {
      MessageKind::Request(request) => {
        assert!(!request.response_expected());
        let target = request.target();
        assert_eq!(target.disposition(), AddressingDisposition::ReferenceAddr);
        let factory = MessageFactory::default();
        assert_eq!(factory.extract_object_key(&target).unwrap().as_bytes(), b"obj");
        let strict = MessageFactory::new(
          CodecConfig::builder()
            .addressing_preference(AddressingPreference::KeyAddr)
            .build()
            .unwrap(),
        );
        assert!(strict.extract_object_key(&target).is_err());
      }
      other => panic!("unexpected {:?}", other),
    }
  }
}
