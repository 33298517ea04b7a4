use std::convert::TryFrom;

use byteorder::ByteOrder;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
  error::{GiopError, Result},
  messages::giop_version::GiopVersion,
  serialization::{CdrDeserializer, CdrSerializer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ReplyStatus {
  NoException = 0,
  UserException = 1,
  SystemException = 2,
  LocationForward = 3,
  /// 1.2 only
  LocationForwardPermanent = 4,
  /// 1.2 only
  NeedsAddressingMode = 5,
}

impl ReplyStatus {
  pub fn is_legal_in(self, version: GiopVersion) -> bool {
    match self {
      ReplyStatus::LocationForwardPermanent | ReplyStatus::NeedsAddressingMode => {
        version >= GiopVersion::V1_2
      }
      _ => true,
    }
  }

  pub fn from_wire(status: u32, version: GiopVersion) -> Result<ReplyStatus> {
    ReplyStatus::try_from(status)
      .ok()
      .filter(|s| s.is_legal_in(version))
      .ok_or(GiopError::IllegalReplyStatus { status, version })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum LocateReplyStatus {
  UnknownObject = 0,
  ObjectHere = 1,
  ObjectForward = 2,
  /// 1.2 only
  ObjectForwardPermanent = 3,
  /// 1.2 only
  LocSystemException = 4,
  /// 1.2 only
  LocNeedsAddressingMode = 5,
}

impl LocateReplyStatus {
  pub fn is_legal_in(self, version: GiopVersion) -> bool {
    match self {
      LocateReplyStatus::UnknownObject
      | LocateReplyStatus::ObjectHere
      | LocateReplyStatus::ObjectForward => true,
      _ => version >= GiopVersion::V1_2,
    }
  }

  pub fn from_wire(status: u32, version: GiopVersion) -> Result<LocateReplyStatus> {
    LocateReplyStatus::try_from(status)
      .ok()
      .filter(|s| s.is_legal_in(version))
      .ok_or(GiopError::IllegalLocateStatus { status, version })
  }
}

/// Whether the failed operation ran to completion before the exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum CompletionStatus {
  Yes = 0,
  No = 1,
  Maybe = 2,
}

/// Body of a Reply (or 1.2 LocateReply) carrying a system exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemExceptionReplyBody {
  /// Repository id, e.g. "IDL:omg.org/CORBA/OBJECT_NOT_EXIST:1.0"
  pub exception_id: String,
  pub minor_code: u32,
  pub completion_status: CompletionStatus,
}

impl SystemExceptionReplyBody {
  pub fn new(
    exception_id: &str,
    minor_code: u32,
    completion_status: CompletionStatus,
  ) -> SystemExceptionReplyBody {
    SystemExceptionReplyBody {
      exception_id: exception_id.to_string(),
      minor_code,
      completion_status,
    }
  }

  /// "OBJECT_NOT_EXIST" from "IDL:omg.org/CORBA/OBJECT_NOT_EXIST:1.0".
  /// Falls back to the whole id when it does not look like an IDL
  /// repository id.
  pub fn exception_name(&self) -> &str {
    let id = &self.exception_id;
    let without_version = match id.rfind(':') {
      Some(colon) if id.starts_with("IDL:") && colon > 3 => &id[4..colon],
      _ => return id,
    };
    match without_version.rfind('/') {
      Some(slash) => &without_version[slash + 1..],
      None => without_version,
    }
  }

  pub fn decode<BO: ByteOrder>(de: &mut CdrDeserializer<BO>) -> Result<SystemExceptionReplyBody> {
    let exception_id = de.read_string()?;
    let minor_code = de.read_u32()?;
    let completion = de.read_u32()?;
    let completion_status =
      CompletionStatus::try_from(completion).map_err(|_| GiopError::BadCompletionStatus(completion))?;
    Ok(SystemExceptionReplyBody {
      exception_id,
      minor_code,
      completion_status,
    })
  }

  pub fn encode<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_string(&self.exception_id)?;
    ser.write_u32(self.minor_code)?;
    ser.write_u32(self.completion_status.into())?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use byteorder::BigEndian;

  use super::*;

  #[test]
  fn reply_status_legality() {
    for code in 0..=3 {
      for version in &[GiopVersion::V1_0, GiopVersion::V1_1, GiopVersion::V1_2] {
        assert!(ReplyStatus::from_wire(code, *version).is_ok());
      }
    }
    for code in 4..=5 {
      assert!(ReplyStatus::from_wire(code, GiopVersion::V1_2).is_ok());
      match ReplyStatus::from_wire(code, GiopVersion::V1_1) {
        Err(GiopError::IllegalReplyStatus { status, .. }) => assert_eq!(status, code),
        other => panic!("unexpected {:?}", other),
      }
    }
    assert!(ReplyStatus::from_wire(6, GiopVersion::V1_2).is_err());
  }

  #[test]
  fn locate_status_legality() {
    assert_eq!(
      LocateReplyStatus::from_wire(2, GiopVersion::V1_0).unwrap(),
      LocateReplyStatus::ObjectForward
    );
    assert!(LocateReplyStatus::from_wire(3, GiopVersion::V1_0).is_err());
    assert!(LocateReplyStatus::from_wire(5, GiopVersion::V1_1).is_err());
    assert_eq!(
      LocateReplyStatus::from_wire(5, GiopVersion::V1_2).unwrap(),
      LocateReplyStatus::LocNeedsAddressingMode
    );
    match LocateReplyStatus::from_wire(9, GiopVersion::V1_2) {
      Err(GiopError::IllegalLocateStatus { status: 9, .. }) => (),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn exception_names() {
    let body = SystemExceptionReplyBody::new(
      "IDL:omg.org/CORBA/OBJECT_NOT_EXIST:1.0",
      0,
      CompletionStatus::No,
    );
    assert_eq!(body.exception_name(), "OBJECT_NOT_EXIST");
    let body = SystemExceptionReplyBody::new("IDL:TRANSIENT:1.0", 0, CompletionStatus::No);
    assert_eq!(body.exception_name(), "TRANSIENT");
    let body = SystemExceptionReplyBody::new("weird", 0, CompletionStatus::No);
    assert_eq!(body.exception_name(), "weird");
  }

  #[test]
  fn system_exception_body() {
    let body = SystemExceptionReplyBody::new("IDL:X:1.0", 7, CompletionStatus::Maybe);
    let mut ser = CdrSerializer::<BigEndian>::new(0);
    body.encode(&mut ser).unwrap();
    let bytes = ser.into_inner();
    let mut de = CdrDeserializer::<BigEndian>::new(&bytes, 0);
    assert_eq!(SystemExceptionReplyBody::decode(&mut de).unwrap(), body);

    // completion status 3 is out of range
    let mut broken = bytes.clone();
    let last = broken.len() - 1;
    broken[last] = 3;
    let mut de = CdrDeserializer::<BigEndian>::new(&broken, 0);
    match SystemExceptionReplyBody::decode(&mut de) {
      Err(GiopError::BadCompletionStatus(3)) => (),
      other => panic!("unexpected {:?}", other),
    }
  }
}
