use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};
#[allow(unused_imports)]
use log::{debug, error, trace, warn};

use crate::{
  error::{GiopError, Result},
  messages::{
    giop_version::GiopVersion,
    header::{clear_flag, patch_payload_length, MessageHeader},
    header_flags::GIOP_Flags,
    message::{Message, MessageKind},
    message_type::MessageType,
  },
};

/// Reported for a 1.1 Fragment, which can only be matched to its message by
/// position in the byte stream.
pub const NOT_APPLICABLE_REQUEST_ID: i32 = -1;

/// Request id of a message as the ORB sees it.
pub fn request_id_of(message: &Message) -> Result<i32> {
  match (&message.kind, &message.header) {
    (MessageKind::CloseConnection, _) | (MessageKind::MessageError, _) => {
      Err(GiopError::NoRequestId(message.message_type()))
    }
    (MessageKind::Fragment, MessageHeader::V1_2(h)) => Ok(h.request_id as i32),
    (MessageKind::Fragment, _) => Ok(NOT_APPLICABLE_REQUEST_ID),
    _ => message
      .request_id()
      .map(|id| id as i32)
      .ok_or_else(|| GiopError::NoRequestId(message.message_type())),
  }
}

struct PendingMessage {
  /// Header fields of the first piece.
  first: Message,
  buffer: BytesMut,
  fragment_count: usize,
}

impl PendingMessage {
  fn new(first: &Message, bytes: &[u8]) -> PendingMessage {
    PendingMessage {
      first: first.clone(),
      buffer: BytesMut::from(bytes),
      fragment_count: 0,
    }
  }

  fn append(&mut self, data: &[u8]) {
    self.buffer.extend_from_slice(data);
    self.fragment_count += 1;
  }

  fn finish(mut self) -> Result<Bytes> {
    clear_flag(&mut self.buffer, GIOP_Flags::MoreFragments as u8);
    patch_payload_length(&mut self.buffer)?;
    debug!(
      "Reassembled {:?} from {} fragments, {} octets",
      self.first.message_type(),
      self.fragment_count,
      self.buffer.len()
    );
    Ok(self.buffer.freeze())
  }
}

/// 1.2 messages a connection may have waiting for fragments at once.
pub const DEFAULT_MAX_PENDING_MESSAGES: usize = 64;

/// Per-connection reassembly of fragmented messages.
///
/// GIOP 1.2 fragments name their message by request id, so several messages
/// may be in progress at once, up to a limit. A 1.1 connection can only have
/// one.
pub struct FragmentAssembler {
  by_request_id: BTreeMap<u32, PendingMessage>,
  in_progress_1_1: Option<PendingMessage>,
  max_pending: usize,
}

impl Default for FragmentAssembler {
  fn default() -> Self {
    FragmentAssembler::with_max_pending(DEFAULT_MAX_PENDING_MESSAGES)
  }
}

impl FragmentAssembler {
  pub fn new() -> FragmentAssembler {
    FragmentAssembler::default()
  }

  /// A new fragmented 1.2 message beyond `max_pending` in-progress ones is
  /// refused with [`GiopError::TooManyPendingMessages`].
  pub fn with_max_pending(max_pending: usize) -> FragmentAssembler {
    FragmentAssembler {
      by_request_id: BTreeMap::new(),
      in_progress_1_1: None,
      max_pending,
    }
  }

  /// Number of messages waiting for more fragments.
  pub fn pending(&self) -> usize {
    self.by_request_id.len() + self.in_progress_1_1.iter().count()
  }

  /// Take one complete wire message. `message` must be decoded from
  /// `bytes`. Returns the whole logical message, with the more-fragments bit
  /// cleared and the length patched, once its last piece has arrived.
  /// Unfragmented messages come straight back.
  pub fn accept(&mut self, message: &Message, bytes: &[u8]) -> Result<Option<Bytes>> {
    if message.message_type() == MessageType::FRAGMENT {
      return self.continue_message(message, bytes);
    }
    if !message.more_fragments_to_follow() {
      return Ok(Some(Bytes::copy_from_slice(bytes)));
    }

    let pending = PendingMessage::new(message, bytes);
    if message.version() == GiopVersion::V1_2 {
      let request_id = message
        .request_id()
        .ok_or_else(|| GiopError::NoRequestId(message.message_type()))?;
      if !self.by_request_id.contains_key(&request_id)
        && self.by_request_id.len() >= self.max_pending
      {
        warn!(
          "Refusing fragmented message for request id {}, {} already pending",
          request_id,
          self.by_request_id.len()
        );
        return Err(GiopError::TooManyPendingMessages(self.by_request_id.len()));
      }
      if self.by_request_id.insert(request_id, pending).is_some() {
        warn!(
          "Request id {} restarted before its fragments completed, dropping old data",
          request_id
        );
      }
    } else if self.in_progress_1_1.replace(pending).is_some() {
      warn!("New fragmented message started before the previous one completed");
    }
    Ok(None)
  }

  fn continue_message(&mut self, fragment: &Message, bytes: &[u8]) -> Result<Option<Bytes>> {
    let data = bytes.get(fragment.header.header_length()..).unwrap_or(&[]);
    let more = fragment.more_fragments_to_follow();

    match fragment.header.request_id() {
      Some(request_id) => match self.by_request_id.get_mut(&request_id) {
        Some(pending) => {
          pending.append(data);
          if more {
            Ok(None)
          } else {
            match self.by_request_id.remove(&request_id) {
              Some(pending) => pending.finish().map(Some),
              None => Ok(None),
            }
          }
        }
        None => {
          warn!(
            "Discarding fragment for request id {} with no message in progress",
            request_id
          );
          Ok(None)
        }
      },
      None => match self.in_progress_1_1.as_mut() {
        Some(pending) => {
          pending.append(data);
          if more {
            Ok(None)
          } else {
            match self.in_progress_1_1.take() {
              Some(pending) => pending.finish().map(Some),
              None => Ok(None),
            }
          }
        }
        None => {
          warn!("Discarding fragment with no message in progress");
          Ok(None)
        }
      },
    }
  }

  /// Forget a message whose request was cancelled. True if anything was
  /// pending for it.
  pub fn cancel(&mut self, request_id: u32) -> bool {
    if self.by_request_id.remove(&request_id).is_some() {
      return true;
    }
    let in_progress = self
      .in_progress_1_1
      .as_ref()
      .and_then(|p| p.first.request_id());
    if in_progress == Some(request_id) {
      self.in_progress_1_1 = None;
      true
    } else {
      false
    }
  }
}
