use byteorder::ByteOrder;

use super::HeaderCodec;
use crate::{
  error::Result,
  messages::{
    addressing::TargetAddress,
    giop_version::GiopVersion,
    service_context::ServiceContextList,
  },
  serialization::{CdrDeserializer, CdrSerializer},
};

/// GIOP 1.2 response_flags octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseFlags {
  value: u8,
}

impl ResponseFlags {
  pub const NO_RESPONSE: ResponseFlags = ResponseFlags { value: 0x00 };
  /// Reply is sent, but only after the request reached the server.
  pub const SYNC_WITH_SERVER: ResponseFlags = ResponseFlags { value: 0x01 };
  pub const RESPONSE_EXPECTED: ResponseFlags = ResponseFlags { value: 0x03 };

  pub fn from_u8(value: u8) -> ResponseFlags {
    ResponseFlags { value }
  }

  pub fn from_response_expected(response_expected: bool) -> ResponseFlags {
    if response_expected {
      ResponseFlags::RESPONSE_EXPECTED
    } else {
      ResponseFlags::NO_RESPONSE
    }
  }

  pub fn value(&self) -> u8 {
    self.value
  }

  pub fn response_expected(&self) -> bool {
    self.value & 0x01 != 0
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct Request_1_0 {
  pub service_contexts: ServiceContextList,
  pub request_id: u32,
  pub response_expected: bool,
  pub object_key: Vec<u8>,
  pub operation: String,
  pub requesting_principal: Vec<u8>,
}

/// As 1.0, with three reserved octets after response_expected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct Request_1_1 {
  pub service_contexts: ServiceContextList,
  pub request_id: u32,
  pub response_expected: bool,
  pub reserved: [u8; 3],
  pub object_key: Vec<u8>,
  pub operation: String,
  pub requesting_principal: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub struct Request_1_2 {
  pub request_id: u32,
  pub response_flags: ResponseFlags,
  pub reserved: [u8; 3],
  pub target: TargetAddress,
  pub operation: String,
  pub service_contexts: ServiceContextList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMessage {
  V1_0(Request_1_0),
  V1_1(Request_1_1),
  V1_2(Request_1_2),
}

impl RequestMessage {
  pub fn request_id(&self) -> u32 {
    match self {
      RequestMessage::V1_0(r) => r.request_id,
      RequestMessage::V1_1(r) => r.request_id,
      RequestMessage::V1_2(r) => r.request_id,
    }
  }

  pub fn response_expected(&self) -> bool {
    match self {
      RequestMessage::V1_0(r) => r.response_expected,
      RequestMessage::V1_1(r) => r.response_expected,
      RequestMessage::V1_2(r) => r.response_flags.response_expected(),
    }
  }

  pub fn operation(&self) -> &str {
    match self {
      RequestMessage::V1_0(r) => &r.operation,
      RequestMessage::V1_1(r) => &r.operation,
      RequestMessage::V1_2(r) => &r.operation,
    }
  }

  pub fn service_contexts(&self) -> &ServiceContextList {
    match self {
      RequestMessage::V1_0(r) => &r.service_contexts,
      RequestMessage::V1_1(r) => &r.service_contexts,
      RequestMessage::V1_2(r) => &r.service_contexts,
    }
  }

  /// 1.0 and 1.1 always address by key.
  pub fn target(&self) -> TargetAddress {
    match self {
      RequestMessage::V1_0(r) => TargetAddress::ObjectKey(r.object_key.clone()),
      RequestMessage::V1_1(r) => TargetAddress::ObjectKey(r.object_key.clone()),
      RequestMessage::V1_2(r) => r.target.clone(),
    }
  }

  /// Requesting principal, absent from 1.2.
  pub fn requesting_principal(&self) -> Option<&[u8]> {
    match self {
      RequestMessage::V1_0(r) => Some(r.requesting_principal.as_slice()),
      RequestMessage::V1_1(r) => Some(r.requesting_principal.as_slice()),
      RequestMessage::V1_2(_) => None,
    }
  }

  pub(crate) fn decode_header<BO: ByteOrder>(
    &mut self,
    de: &mut CdrDeserializer<BO>,
    version: GiopVersion,
  ) -> Result<()> {
    match self {
      RequestMessage::V1_0(r) => *r = Request_1_0::decode_header(de, version)?,
      RequestMessage::V1_1(r) => *r = Request_1_1::decode_header(de, version)?,
      RequestMessage::V1_2(r) => *r = Request_1_2::decode_header(de, version)?,
    }
    Ok(())
  }

  pub(crate) fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    match self {
      RequestMessage::V1_0(r) => r.encode_header(ser),
      RequestMessage::V1_1(r) => r.encode_header(ser),
      RequestMessage::V1_2(r) => r.encode_header(ser),
    }
  }
}

impl HeaderCodec for Request_1_0 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    Ok(Request_1_0 {
      service_contexts: de.read_value()?,
      request_id: de.read_u32()?,
      response_expected: de.read_bool()?,
      object_key: de.read_octets()?,
      operation: de.read_string()?,
      requesting_principal: de.read_octets()?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_value(&self.service_contexts)?;
    ser.write_u32(self.request_id)?;
    ser.write_bool(self.response_expected);
    ser.write_octets(&self.object_key)?;
    ser.write_string(&self.operation)?;
    ser.write_octets(&self.requesting_principal)?;
    Ok(())
  }
}

impl HeaderCodec for Request_1_1 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    let service_contexts = de.read_value()?;
    let request_id = de.read_u32()?;
    let response_expected = de.read_bool()?;
    let mut reserved = [0u8; 3];
    reserved.copy_from_slice(de.read_fixed_octets(3)?);
    Ok(Request_1_1 {
      service_contexts,
      request_id,
      response_expected,
      reserved,
      object_key: de.read_octets()?,
      operation: de.read_string()?,
      requesting_principal: de.read_octets()?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_value(&self.service_contexts)?;
    ser.write_u32(self.request_id)?;
    ser.write_bool(self.response_expected);
    ser.write_fixed_octets(&self.reserved);
    ser.write_octets(&self.object_key)?;
    ser.write_string(&self.operation)?;
    ser.write_octets(&self.requesting_principal)?;
    Ok(())
  }
}

impl HeaderCodec for Request_1_2 {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    let request_id = de.read_u32()?;
    let response_flags = ResponseFlags::from_u8(de.read_octet()?);
    let mut reserved = [0u8; 3];
    reserved.copy_from_slice(de.read_fixed_octets(3)?);
    Ok(Request_1_2 {
      request_id,
      response_flags,
      reserved,
      target: TargetAddress::decode(de)?,
      operation: de.read_string()?,
      service_contexts: de.read_value()?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    ser.write_octet(self.response_flags.value());
    ser.write_fixed_octets(&self.reserved);
    self.target.encode(ser)?;
    ser.write_string(&self.operation)?;
    ser.write_value(&self.service_contexts)?;
    Ok(())
  }
}
