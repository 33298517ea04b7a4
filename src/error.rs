use std::{fmt, io, result};

use crate::{
  messages::{
    addressing::AddressingDisposition, giop_version::GiopVersion, message_type::MessageType,
  },
  serialization,
};

/// This is a specialized Result, similar to std::io::Result
pub type Result<T> = result::Result<T, GiopError>;

/// Everything that can go wrong while framing, decoding or building GIOP
/// messages.
///
/// Use [`GiopError::recovery`] to find out what the connection owner is
/// expected to do about it.
#[derive(Debug)]
pub enum GiopError {
  /// First four header bytes were not "GIOP".
  MagicMismatch { found: [u8; 4] },
  /// Peer speaks a newer protocol revision than we are configured for.
  VersionTooNew {
    received: GiopVersion,
    supported: GiopVersion,
  },
  /// A version outside 1.0 ..= 1.2 was requested or received where no
  /// header layout exists for it.
  UnsupportedVersion(GiopVersion),
  UnknownMessageType(u8),
  /// Header announces a message larger than the configured limit.
  MessageTooLarge { size: usize, limit: usize },
  /// The "more fragments" bit (or the Fragment message type itself) is not
  /// legal for this version and message type.
  FragmentationDisallowed {
    version: GiopVersion,
    message_type: MessageType,
  },
  /// Object key could not be extracted from a target address. Root cause
  /// is intentionally not retained.
  InvalidObjectKey,
  /// The target address used a disposition the ORB is not configured to
  /// accept. Carries the disposition the ORB expects.
  AddressingDispositionMismatch(AddressingDisposition),
  IllegalAddressingDisposition(u16),
  IllegalReplyStatus { status: u32, version: GiopVersion },
  IllegalLocateStatus { status: u32, version: GiopVersion },
  BadCompletionStatus(u32),
  /// The message kind does not carry a request id (CloseConnection,
  /// MessageError).
  NoRequestId(MessageType),
  /// Too many fragmented messages are already waiting for their remaining
  /// fragments.
  TooManyPendingMessages(usize),
  Io(io::Error),
  Serialization(serialization::Error),
}

/// What the owner of the connection should do after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
  /// Framing error: send a MessageError at our highest version and close the
  /// transport.
  SendMessageErrorAndClose,
  /// The current message is unusable, the connection may continue.
  DiscardMessage,
  /// Marshaling failure local to one request, raise it to the application.
  FailRequest,
  /// The byte source failed. Connection is gone.
  Io,
}

impl GiopError {
  pub fn recovery(&self) -> Recovery {
    match self {
      GiopError::MagicMismatch { .. }
      | GiopError::VersionTooNew { .. }
      | GiopError::UnsupportedVersion(_)
      | GiopError::UnknownMessageType(_)
      | GiopError::MessageTooLarge { .. }
      | GiopError::FragmentationDisallowed { .. } => Recovery::SendMessageErrorAndClose,

      GiopError::IllegalReplyStatus { .. }
      | GiopError::IllegalLocateStatus { .. }
      | GiopError::BadCompletionStatus(_)
      | GiopError::IllegalAddressingDisposition(_)
      | GiopError::TooManyPendingMessages(_)
      | GiopError::Serialization(_) => Recovery::DiscardMessage,

      GiopError::InvalidObjectKey
      | GiopError::AddressingDispositionMismatch(_)
      | GiopError::NoRequestId(_) => Recovery::FailRequest,

      GiopError::Io(_) => Recovery::Io,
    }
  }

  pub fn is_framing_error(&self) -> bool {
    self.recovery() == Recovery::SendMessageErrorAndClose
  }
}

impl fmt::Display for GiopError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      GiopError::MagicMismatch { found } => write!(f, "GIOP magic mismatch, found {:02X?}", found),
      GiopError::VersionTooNew {
        received,
        supported,
      } => write!(
        f,
        "GIOP version {} is newer than supported version {}",
        received, supported
      ),
      GiopError::UnsupportedVersion(v) => write!(f, "GIOP version {} is not supported", v),
      GiopError::UnknownMessageType(t) => write!(f, "Unknown GIOP message type {}", t),
      GiopError::MessageTooLarge { size, limit } => {
        write!(f, "GIOP message of {} octets exceeds limit {}", size, limit)
      }
      GiopError::FragmentationDisallowed {
        version,
        message_type,
      } => write!(
        f,
        "Fragmentation not allowed for {:?} in GIOP {}",
        message_type, version
      ),
      GiopError::InvalidObjectKey => f.write_str("Invalid object key"),
      GiopError::AddressingDispositionMismatch(expected) => {
        write!(f, "Addressing disposition mismatch, expected {:?}", expected)
      }
      GiopError::IllegalAddressingDisposition(d) => {
        write!(f, "Illegal target addressing disposition {}", d)
      }
      GiopError::IllegalReplyStatus { status, version } => {
        write!(f, "Reply status {} is illegal in GIOP {}", status, version)
      }
      GiopError::IllegalLocateStatus { status, version } => {
        write!(f, "LocateReply status {} is illegal in GIOP {}", status, version)
      }
      GiopError::BadCompletionStatus(c) => write!(f, "Bad completion status {}", c),
      GiopError::NoRequestId(t) => write!(f, "{:?} message does not carry a request id", t),
      GiopError::TooManyPendingMessages(n) => {
        write!(f, "{} fragmented messages already pending", n)
      }
      GiopError::Io(e) => write!(f, "io::Error: {}", e),
      GiopError::Serialization(e) => write!(f, "CDR error: {}", e),
    }
  }
}

impl std::error::Error for GiopError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GiopError::Io(e) => Some(e),
      GiopError::Serialization(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for GiopError {
  fn from(e: io::Error) -> GiopError {
    GiopError::Io(e)
  }
}

impl From<serialization::Error> for GiopError {
  fn from(e: serialization::Error) -> GiopError {
    GiopError::Serialization(e)
  }
}
