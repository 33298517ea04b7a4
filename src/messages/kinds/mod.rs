use byteorder::ByteOrder;

use crate::{
  error::Result,
  messages::giop_version::GiopVersion,
  serialization::{CdrDeserializer, CdrSerializer},
};

pub mod cancel_request;
pub mod fragment;
pub mod locate_reply;
pub mod locate_request;
pub mod reply;
pub mod request;

/// Message-specific header fields that follow the common GIOP header.
///
/// Decoders leave the deserializer positioned at the first octet after the
/// header fields. Any body alignment is the caller's business.
pub trait HeaderCodec: Sized {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<Self>;

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()>;
}
