use byteorder::ByteOrder;

use super::{reply::read_disposition, HeaderCodec};
use crate::{
  error::Result,
  messages::{
    addressing::AddressingDisposition,
    giop_version::GiopVersion,
    ior::Ior,
    reply_status::{LocateReplyStatus, SystemExceptionReplyBody},
  },
  serialization::{CdrDeserializer, CdrSerializer},
};

/// LocateReply status with its status-dependent payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateReplyOutcome {
  UnknownObject,
  ObjectHere,
  ObjectForward(Ior),
  ObjectForwardPermanent(Ior),
  LocSystemException(SystemExceptionReplyBody),
  LocNeedsAddressingMode(AddressingDisposition),
}

impl Default for LocateReplyOutcome {
  fn default() -> Self {
    LocateReplyOutcome::UnknownObject
  }
}

impl LocateReplyOutcome {
  pub fn status(&self) -> LocateReplyStatus {
    match self {
      LocateReplyOutcome::UnknownObject => LocateReplyStatus::UnknownObject,
      LocateReplyOutcome::ObjectHere => LocateReplyStatus::ObjectHere,
      LocateReplyOutcome::ObjectForward(_) => LocateReplyStatus::ObjectForward,
      LocateReplyOutcome::ObjectForwardPermanent(_) => LocateReplyStatus::ObjectForwardPermanent,
      LocateReplyOutcome::LocSystemException(_) => LocateReplyStatus::LocSystemException,
      LocateReplyOutcome::LocNeedsAddressingMode(_) => LocateReplyStatus::LocNeedsAddressingMode,
    }
  }

  pub fn forward_reference(&self) -> Option<&Ior> {
    match self {
      LocateReplyOutcome::ObjectForward(ior) | LocateReplyOutcome::ObjectForwardPermanent(ior) => {
        Some(ior)
      }
      _ => None,
    }
  }
}

/// Same layout in every version; only the legal statuses differ. The
/// status payload is never aligned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocateReply {
  pub request_id: u32,
  pub outcome: LocateReplyOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateReplyMessage {
  V1_0(LocateReply),
  V1_1(LocateReply),
  V1_2(LocateReply),
}

impl LocateReplyMessage {
  pub fn inner(&self) -> &LocateReply {
    match self {
      LocateReplyMessage::V1_0(r) | LocateReplyMessage::V1_1(r) | LocateReplyMessage::V1_2(r) => r,
    }
  }

  pub fn request_id(&self) -> u32 {
    self.inner().request_id
  }

  pub fn outcome(&self) -> &LocateReplyOutcome {
    &self.inner().outcome
  }

  pub fn locate_status(&self) -> LocateReplyStatus {
    self.outcome().status()
  }

  pub(crate) fn decode_header<BO: ByteOrder>(
    &mut self,
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<()> {
    match self {
      LocateReplyMessage::V1_0(r) | LocateReplyMessage::V1_1(r) | LocateReplyMessage::V1_2(r) => {
        *r = LocateReply::decode_header(de, version)?
      }
    }
    Ok(())
  }

  pub(crate) fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    self.inner().encode_header(ser)
  }
}

impl HeaderCodec for LocateReply {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<Self> {
    let request_id = de.read_u32()?;
    let status = LocateReplyStatus::from_wire(de.read_u32()?, version)?;
    let outcome = match status {
      LocateReplyStatus::UnknownObject => LocateReplyOutcome::UnknownObject,
      LocateReplyStatus::ObjectHere => LocateReplyOutcome::ObjectHere,
      LocateReplyStatus::ObjectForward => LocateReplyOutcome::ObjectForward(de.read_value()?),
      LocateReplyStatus::ObjectForwardPermanent => {
        LocateReplyOutcome::ObjectForwardPermanent(de.read_value()?)
      }
      LocateReplyStatus::LocSystemException => {
        LocateReplyOutcome::LocSystemException(SystemExceptionReplyBody::decode(de)?)
      }
      LocateReplyStatus::LocNeedsAddressingMode => {
        LocateReplyOutcome::LocNeedsAddressingMode(read_disposition(de)?)
      }
    };
    Ok(LocateReply {
      request_id,
      outcome,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    ser.write_u32(self.outcome.status().into())?;
    match &self.outcome {
      LocateReplyOutcome::UnknownObject | LocateReplyOutcome::ObjectHere => (),
      LocateReplyOutcome::ObjectForward(ior) | LocateReplyOutcome::ObjectForwardPermanent(ior) => {
        ser.write_value(ior)?
      }
      LocateReplyOutcome::LocSystemException(body) => body.encode(ser)?,
      LocateReplyOutcome::LocNeedsAddressingMode(disposition) => {
        ser.write_u16((*disposition).into())?
      }
    }
    Ok(())
  }
}
