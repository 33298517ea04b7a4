use std::convert::TryFrom;

use byteorder::ByteOrder;

use super::HeaderCodec;
use crate::{
  error::{GiopError, Result},
  messages::{
    addressing::AddressingDisposition,
    giop_version::GiopVersion,
    ior::Ior,
    reply_status::{ReplyStatus, SystemExceptionReplyBody},
    service_context::ServiceContextList,
  },
  serialization::{CdrDeserializer, CdrSerializer},
};

/// Reply status together with whatever the status implies must follow it.
///
/// NoException and UserException bodies belong to the caller and are not
/// part of the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
  NoException,
  UserException,
  SystemException(SystemExceptionReplyBody),
  LocationForward(Ior),
  LocationForwardPermanent(Ior),
  NeedsAddressingMode(AddressingDisposition),
}

impl Default for ReplyOutcome {
  fn default() -> Self {
    ReplyOutcome::NoException
  }
}

impl ReplyOutcome {
  pub fn status(&self) -> ReplyStatus {
    match self {
      ReplyOutcome::NoException => ReplyStatus::NoException,
      ReplyOutcome::UserException => ReplyStatus::UserException,
      ReplyOutcome::SystemException(_) => ReplyStatus::SystemException,
      ReplyOutcome::LocationForward(_) => ReplyStatus::LocationForward,
      ReplyOutcome::LocationForwardPermanent(_) => ReplyStatus::LocationForwardPermanent,
      ReplyOutcome::NeedsAddressingMode(_) => ReplyStatus::NeedsAddressingMode,
    }
  }

  pub fn has_payload(&self) -> bool {
    !matches!(
      self,
      ReplyOutcome::NoException | ReplyOutcome::UserException
    )
  }

  pub fn forward_reference(&self) -> Option<&Ior> {
    match self {
      ReplyOutcome::LocationForward(ior) | ReplyOutcome::LocationForwardPermanent(ior) => Some(ior),
      _ => None,
    }
  }

  pub(crate) fn decode_payload<BO: ByteOrder>(
    status: ReplyStatus,
    de: &mut CdrDeserializer<BO>,
  ) -> Result<ReplyOutcome> {
    Ok(match status {
      ReplyStatus::NoException => ReplyOutcome::NoException,
      ReplyStatus::UserException => ReplyOutcome::UserException,
      ReplyStatus::SystemException => {
        ReplyOutcome::SystemException(SystemExceptionReplyBody::decode(de)?)
      }
      ReplyStatus::LocationForward => ReplyOutcome::LocationForward(de.read_value()?),
      ReplyStatus::LocationForwardPermanent => {
        ReplyOutcome::LocationForwardPermanent(de.read_value()?)
      }
      ReplyStatus::NeedsAddressingMode => {
        ReplyOutcome::NeedsAddressingMode(read_disposition(de)?)
      }
    })
  }

  pub(crate) fn encode_payload<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    match self {
      ReplyOutcome::NoException | ReplyOutcome::UserException => (),
      ReplyOutcome::SystemException(body) => body.encode(ser)?,
      ReplyOutcome::LocationForward(ior) | ReplyOutcome::LocationForwardPermanent(ior) => {
        ser.write_value(ior)?
      }
      ReplyOutcome::NeedsAddressingMode(disposition) => ser.write_u16((*disposition).into())?,
    }
    Ok(())
  }
}

pub(crate) fn read_disposition<BO: ByteOrder>(
  de: &mut CdrDeserializer<BO>,
) -> Result<AddressingDisposition> {
  let raw = de.read_u16()?;
  AddressingDisposition::try_from(raw).map_err(|_| GiopError::IllegalAddressingDisposition(raw))
}

/// Reply header for 1.0 and 1.1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct Reply_1_0 {
  pub service_contexts: ServiceContextList,
  pub request_id: u32,
  pub outcome: ReplyOutcome,
}

/// Reply header for 1.2. Anything after the service contexts starts on an
/// 8-octet boundary of the message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct Reply_1_2 {
  pub request_id: u32,
  pub outcome: ReplyOutcome,
  pub service_contexts: ServiceContextList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMessage {
  V1_0(Reply_1_0),
  V1_1(Reply_1_0),
  V1_2(Reply_1_2),
}

impl ReplyMessage {
  pub fn request_id(&self) -> u32 {
    match self {
      ReplyMessage::V1_0(r) | ReplyMessage::V1_1(r) => r.request_id,
      ReplyMessage::V1_2(r) => r.request_id,
    }
  }

  pub fn outcome(&self) -> &ReplyOutcome {
    match self {
      ReplyMessage::V1_0(r) | ReplyMessage::V1_1(r) => &r.outcome,
      ReplyMessage::V1_2(r) => &r.outcome,
    }
  }

  pub fn reply_status(&self) -> ReplyStatus {
    self.outcome().status()
  }

  pub fn service_contexts(&self) -> &ServiceContextList {
    match self {
      ReplyMessage::V1_0(r) | ReplyMessage::V1_1(r) => &r.service_contexts,
      ReplyMessage::V1_2(r) => &r.service_contexts,
    }
  }

  pub(crate) fn decode_header<BO: ByteOrder>(
    &mut self,
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<()> {
    match self {
      ReplyMessage::V1_0(r) | ReplyMessage::V1_1(r) => *r = Reply_1_0::decode_header(de, version)?,
      ReplyMessage::V1_2(r) => *r = Reply_1_2::decode_header(de, version)?,
    }
    Ok(())
  }

  pub(crate) fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    match self {
      ReplyMessage::V1_0(r) | ReplyMessage::V1_1(r) => r.encode_header(ser),
      ReplyMessage::V1_2(r) => r.encode_header(ser),
    }
  }
}

impl HeaderCodec for Reply_1_0 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<Self> {
    let service_contexts = de.read_value()?;
    let request_id = de.read_u32()?;
    let status = ReplyStatus::from_wire(de.read_u32()?, version)?;
    Ok(Reply_1_0 {
      service_contexts,
      request_id,
      outcome: ReplyOutcome::decode_payload(status, de)?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_value(&self.service_contexts)?;
    ser.write_u32(self.request_id)?;
    ser.write_u32(self.outcome.status().into())?;
    self.outcome.encode_payload(ser)
  }
}

impl HeaderCodec for Reply_1_2 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<Self> {
    let request_id = de.read_u32()?;
    let status = ReplyStatus::from_wire(de.read_u32()?, version)?;
    let service_contexts = de.read_value()?;
    if !de.is_empty() {
      de.align_to(8)?;
    }
    Ok(Reply_1_2 {
      request_id,
      outcome: ReplyOutcome::decode_payload(status, de)?,
      service_contexts,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    ser.write_u32(self.outcome.status().into())?;
    ser.write_value(&self.service_contexts)?;
    if self.outcome.has_payload() {
      ser.align_to(8);
      self.outcome.encode_payload(ser)?;
    }
    Ok(())
  }
}
