use std::convert::TryFrom;

use byteorder::ByteOrder;
#[allow(unused_imports)]
use log::{debug, error, trace, warn};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
  error::{GiopError, Result},
  messages::ior::{IiopProfile, IorAddressingInfo, TaggedProfile},
  serialization::{CdrDeserializer, CdrSerializer},
};

/// Discriminant of the GIOP 1.2 TargetAddress union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum AddressingDisposition {
  KeyAddr = 0,
  ProfileAddr = 1,
  ReferenceAddr = 2,
}

/// How a GIOP 1.2 Request or LocateRequest names its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddress {
  ObjectKey(Vec<u8>),
  Profile(TaggedProfile),
  Reference(IorAddressingInfo),
}

impl Default for TargetAddress {
  fn default() -> Self {
    TargetAddress::ObjectKey(Vec::new())
  }
}

impl TargetAddress {
  pub fn disposition(&self) -> AddressingDisposition {
    match self {
      TargetAddress::ObjectKey(_) => AddressingDisposition::KeyAddr,
      TargetAddress::Profile(_) => AddressingDisposition::ProfileAddr,
      TargetAddress::Reference(_) => AddressingDisposition::ReferenceAddr,
    }
  }

  pub fn decode<BO: ByteOrder>(de: &mut CdrDeserializer<BO>) -> Result<TargetAddress> {
    let raw = de.read_u16()?;
    let disposition =
      AddressingDisposition::try_from(raw).map_err(|_| GiopError::IllegalAddressingDisposition(raw))?;
    Ok(match disposition {
      AddressingDisposition::KeyAddr => TargetAddress::ObjectKey(de.read_octets()?),
      AddressingDisposition::ProfileAddr => TargetAddress::Profile(de.read_value()?),
      AddressingDisposition::ReferenceAddr => TargetAddress::Reference(de.read_value()?),
    })
  }

  pub fn encode<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u16(self.disposition().into())?;
    match self {
      TargetAddress::ObjectKey(key) => ser.write_octets(key)?,
      TargetAddress::Profile(profile) => ser.write_value(profile)?,
      TargetAddress::Reference(info) => ser.write_value(info)?,
    }
    Ok(())
  }
}

/// Which target address forms an ORB accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingPreference {
  KeyAddr,
  ProfileAddr,
  ReferenceAddr,
  AcceptAny,
}

impl Default for AddressingPreference {
  fn default() -> Self {
    AddressingPreference::AcceptAny
  }
}

impl AddressingPreference {
  /// None for AcceptAny.
  pub fn expected(&self) -> Option<AddressingDisposition> {
    match self {
      AddressingPreference::KeyAddr => Some(AddressingDisposition::KeyAddr),
      AddressingPreference::ProfileAddr => Some(AddressingDisposition::ProfileAddr),
      AddressingPreference::ReferenceAddr => Some(AddressingDisposition::ReferenceAddr),
      AddressingPreference::AcceptAny => None,
    }
  }
}

/// Opaque, non-empty key identifying an object within a server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
  bytes: Vec<u8>,
}

impl ObjectKey {
  pub fn new(bytes: Vec<u8>) -> Option<ObjectKey> {
    if bytes.is_empty() {
      None
    } else {
      Some(ObjectKey { bytes })
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn into_vec(self) -> Vec<u8> {
    self.bytes
  }
}

impl AsRef<[u8]> for ObjectKey {
  fn as_ref(&self) -> &[u8] {
    &self.bytes
  }
}

/// Resolve a target address to the object key it designates.
///
/// Any failure while digging the key out of a profile or reference is
/// reported as `InvalidObjectKey`.
pub fn extract_object_key(
  target: &TargetAddress,
  preference: AddressingPreference,
) -> Result<ObjectKey> {
  if let Some(expected) = preference.expected() {
    if target.disposition() != expected {
      debug!(
        "Target uses {:?}, ORB accepts only {:?}",
        target.disposition(),
        expected
      );
      return Err(GiopError::AddressingDispositionMismatch(expected));
    }
  }

  let key_bytes = match target {
    TargetAddress::ObjectKey(key) => Some(key.clone()),
    TargetAddress::Profile(profile) => key_from_profile(profile),
    TargetAddress::Reference(info) => info.selected_profile().and_then(key_from_profile),
  };

  key_bytes
    .and_then(ObjectKey::new)
    .ok_or(GiopError::InvalidObjectKey)
}

fn key_from_profile(profile: &TaggedProfile) -> Option<Vec<u8>> {
  match IiopProfile::from_tagged_profile(profile) {
    Ok(iiop) => Some(iiop.object_key),
    Err(e) => {
      debug!("Cannot extract object key from profile: {}", e);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use byteorder::{BigEndian, LittleEndian};
  use speedy::Endianness;

  use super::*;
  use crate::messages::{giop_version::GiopVersion, ior::Ior};

  fn profile(key: &[u8]) -> TaggedProfile {
    IiopProfile::new(GiopVersion::V1_2, "localhost", 2809, key)
      .to_tagged_profile(Endianness::BigEndian)
      .unwrap()
  }

  #[test]
  fn key_addr_layout() {
    let mut ser = CdrSerializer::<BigEndian>::new(12);
    TargetAddress::ObjectKey(vec![0xAA, 0xBB]).encode(&mut ser).unwrap();
    assert_eq!(ser.buffer(), &[0, 0, 0, 0, 0, 0, 0, 2, 0xAA, 0xBB]);

    let bytes = ser.into_inner();
    let mut de = CdrDeserializer::<BigEndian>::new(&bytes, 12);
    assert_eq!(
      TargetAddress::decode(&mut de).unwrap(),
      TargetAddress::ObjectKey(vec![0xAA, 0xBB])
    );
  }

  #[test]
  fn reference_addr_decodes() {
    let target = TargetAddress::Reference(IorAddressingInfo {
      selected_profile_index: 0,
      ior: Ior::new("IDL:Echo:1.0", vec![profile(b"echo")]),
    });
    let mut ser = CdrSerializer::<LittleEndian>::new(20);
    target.encode(&mut ser).unwrap();
    let bytes = ser.into_inner();
    let mut de = CdrDeserializer::<LittleEndian>::new(&bytes, 20);
    assert_eq!(TargetAddress::decode(&mut de).unwrap(), target);
    assert!(de.is_empty());
  }

  #[test]
  fn illegal_disposition() {
    let bytes = [0u8, 3];
    let mut de = CdrDeserializer::<BigEndian>::new(&bytes, 0);
    match TargetAddress::decode(&mut de) {
      Err(GiopError::IllegalAddressingDisposition(3)) => (),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn accept_any_resolves_every_form() {
    let by_key = TargetAddress::ObjectKey(b"k1".to_vec());
    let by_profile = TargetAddress::Profile(profile(b"k2"));
    let by_reference = TargetAddress::Reference(IorAddressingInfo {
      selected_profile_index: 1,
      ior: Ior::new("IDL:X:1.0", vec![profile(b"other"), profile(b"k3")]),
    });
    let any = AddressingPreference::AcceptAny;
    assert_eq!(extract_object_key(&by_key, any).unwrap().as_bytes(), b"k1");
    assert_eq!(extract_object_key(&by_profile, any).unwrap().as_bytes(), b"k2");
    assert_eq!(
      extract_object_key(&by_reference, any).unwrap().as_bytes(),
      b"k3"
    );
  }

  #[test]
  fn preference_mismatch_reports_expected() {
    let by_profile = TargetAddress::Profile(profile(b"k"));
    match extract_object_key(&by_profile, AddressingPreference::KeyAddr) {
      Err(GiopError::AddressingDispositionMismatch(AddressingDisposition::KeyAddr)) => (),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn broken_targets_are_invalid_keys() {
    let bad_index = TargetAddress::Reference(IorAddressingInfo {
      selected_profile_index: 5,
      ior: Ior::new("IDL:X:1.0", vec![profile(b"k")]),
    });
    let garbage = TargetAddress::Profile(TaggedProfile {
      tag: 0,
      profile_data: vec![0, 1],
    });
    let empty = TargetAddress::ObjectKey(vec![]);
    for target in &[bad_index, garbage, empty] {
      match extract_object_key(target, AddressingPreference::AcceptAny) {
        Err(GiopError::InvalidObjectKey) => (),
        other => panic!("unexpected {:?}", other),
      }
    }
  }
}
