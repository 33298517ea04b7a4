//! GIOP message framing and header codec for GIOP 1.0, 1.1 and 1.2.
//!
//! Incoming messages start with [`MessageFactory::read_message`] (or
//! [`GiopFrameCodec`] on a buffered stream), which validates the 12-octet
//! common header and selects the header layout for the message type and
//! version. [`Message::decode`] then fills in the message-specific header
//! fields from the rest of the message. Outgoing messages are built with the
//! `create_*` constructors of [`MessageFactory`] and turned into bytes with
//! [`Message::encode`].
//!
//! # Example
//!
//! ```
//! use rustgiop::{GiopVersion, MessageFactory};
//!
//! let close = MessageFactory::create_close_connection(GiopVersion::V1_2).unwrap();
//! let bytes = close.encode(&[]).unwrap();
//! assert_eq!(bytes, b"GIOP\x01\x02\x00\x05\x00\x00\x00\x00".to_vec());
//!
//! let factory = MessageFactory::default();
//! let message = factory.read_message(&mut &bytes[..]).unwrap();
//! assert_eq!(message.version(), GiopVersion::V1_2);
//! ```

#[macro_use]
mod test;

pub mod codec;
pub mod config;
pub mod correlator;
pub mod error;
pub mod factory;
pub mod fragmentation;
pub mod messages;
pub mod serialization;
pub mod wire;

pub use codec::{GiopFrame, GiopFrameCodec};
pub use config::{CodecConfig, CodecConfigBuilder};
pub use correlator::{request_id_of, FragmentAssembler, NOT_APPLICABLE_REQUEST_ID};
pub use error::{GiopError, Recovery, Result};
pub use factory::MessageFactory;
pub use fragmentation::may_fragment;
pub use messages::{
  addressing::{AddressingDisposition, AddressingPreference, ObjectKey, TargetAddress},
  giop_version::GiopVersion,
  header::{GiopHeader, MessageHeader},
  ior::{IiopProfile, Ior, IorAddressingInfo, TaggedProfile},
  kinds::{
    fragment::{fragment_from, split_into_fragments},
    locate_reply::LocateReplyOutcome,
    reply::ReplyOutcome,
  },
  message::{Message, MessageKind},
  message_type::MessageType,
  reply_status::{CompletionStatus, LocateReplyStatus, ReplyStatus, SystemExceptionReplyBody},
  service_context::{ServiceContext, ServiceContextList},
};
