use byteorder::ByteOrder;

use super::HeaderCodec;
use crate::{
  error::Result,
  messages::{addressing::TargetAddress, giop_version::GiopVersion},
  serialization::{CdrDeserializer, CdrSerializer},
};

/// LocateRequest header for 1.0 and 1.1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct LocateRequest_1_0 {
  pub request_id: u32,
  pub object_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct LocateRequest_1_2 {
  pub request_id: u32,
  pub target: TargetAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateRequestMessage {
  V1_0(LocateRequest_1_0),
  V1_1(LocateRequest_1_0),
  V1_2(LocateRequest_1_2),
}

impl LocateRequestMessage {
  pub fn request_id(&self) -> u32 {
    match self {
      LocateRequestMessage::V1_0(r) | LocateRequestMessage::V1_1(r) => r.request_id,
      LocateRequestMessage::V1_2(r) => r.request_id,
    }
  }

  pub fn target(&self) -> TargetAddress {
    match self {
      LocateRequestMessage::V1_0(r) | LocateRequestMessage::V1_1(r) => {
        TargetAddress::ObjectKey(r.object_key.clone())
      }
      LocateRequestMessage::V1_2(r) => r.target.clone(),
    }
  }

  pub(crate) fn decode_header<BO: ByteOrder>(
    &mut self,
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<()> {
    match self {
      LocateRequestMessage::V1_0(r) | LocateRequestMessage::V1_1(r) => {
        *r = LocateRequest_1_0::decode_header(de, version)?
      }
      LocateRequestMessage::V1_2(r) => *r = LocateRequest_1_2::decode_header(de, version)?,
    }
    Ok(())
  }

  pub(crate) fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    match self {
      LocateRequestMessage::V1_0(r) | LocateRequestMessage::V1_1(r) => r.encode_header(ser),
      LocateRequestMessage::V1_2(r) => r.encode_header(ser),
    }
  }
}

impl HeaderCodec for LocateRequest_1_0 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    Ok(LocateRequest_1_0 {
      request_id: de.read_u32()?,
      object_key: de.read_octets()?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    ser.write_octets(&self.object_key)?;
    Ok(())
  }
}

impl HeaderCodec for LocateRequest_1_2 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    Ok(LocateRequest_1_2 {
      request_id: de.read_u32()?,
      target: TargetAddress::decode(de)?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    self.target.encode(ser)
  }
}
