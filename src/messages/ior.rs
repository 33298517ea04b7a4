use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use speedy::Endianness;

use crate::{
  messages::giop_version::GiopVersion,
  serialization::{
    error::{Error, Result},
    CdrDeserializer, CdrSerializer,
  },
};

/// Profile tag of an IIOP profile.
pub const TAG_INTERNET_IOP: u32 = 0;
pub const TAG_MULTIPLE_COMPONENTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedProfile {
  pub tag: u32,
  pub profile_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedComponent {
  pub tag: u32,
  pub component_data: Vec<u8>,
}

/// Interoperable object reference: a repository id and a list of profiles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ior {
  pub type_id: String,
  pub profiles: Vec<TaggedProfile>,
}

impl Ior {
  pub fn new(type_id: &str, profiles: Vec<TaggedProfile>) -> Ior {
    Ior {
      type_id: type_id.to_string(),
      profiles,
    }
  }

  /// Reference with a single IIOP profile.
  pub fn from_iiop_profile(type_id: &str, profile: &IiopProfile) -> Result<Ior> {
    Ok(Ior::new(
      type_id,
      vec![profile.to_tagged_profile(Endianness::BigEndian)?],
    ))
  }

  pub fn is_nil(&self) -> bool {
    self.type_id.is_empty() && self.profiles.is_empty()
  }

  /// Index of the first IIOP profile.
  pub fn iiop_profile_index(&self) -> Option<usize> {
    self.profiles.iter().position(|p| p.tag == TAG_INTERNET_IOP)
  }
}

/// TargetAddress arm for ReferenceAddr.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IorAddressingInfo {
  pub selected_profile_index: u32,
  pub ior: Ior,
}

impl IorAddressingInfo {
  pub fn selected_profile(&self) -> Option<&TaggedProfile> {
    self.ior.profiles.get(self.selected_profile_index as usize)
  }
}

/// Decoded body of a TAG_INTERNET_IOP profile.
///
/// The profile data is a CDR encapsulation: the first octet gives the byte
/// order of everything after it, and alignment counts from that octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IiopProfile {
  pub iiop_version: GiopVersion,
  pub host: String,
  pub port: u16,
  pub object_key: Vec<u8>,
  /// Present from IIOP 1.1 on.
  pub components: Vec<TaggedComponent>,
}

impl IiopProfile {
  pub fn new(iiop_version: GiopVersion, host: &str, port: u16, object_key: &[u8]) -> IiopProfile {
    IiopProfile {
      iiop_version,
      host: host.to_string(),
      port,
      object_key: object_key.to_vec(),
      components: Vec::new(),
    }
  }

  pub fn from_tagged_profile(profile: &TaggedProfile) -> Result<IiopProfile> {
    if profile.tag != TAG_INTERNET_IOP {
      return Err(Error::Message(format!(
        "profile tag {} is not TAG_INTERNET_IOP",
        profile.tag
      )));
    }
    let (byte_order, encapsulated) = profile.profile_data.split_first().ok_or(Error::Eof)?;
    match byte_order {
      0 => IiopProfile::decode(&mut CdrDeserializer::<BigEndian>::new(encapsulated, 1)),
      1 => IiopProfile::decode(&mut CdrDeserializer::<LittleEndian>::new(encapsulated, 1)),
      other => Err(Error::BadBoolean(*other)),
    }
  }

  pub fn to_tagged_profile(&self, endianness: Endianness) -> Result<TaggedProfile> {
    let profile_data = match endianness {
      Endianness::BigEndian => self.encode(CdrSerializer::<BigEndian>::from_vec(vec![0]))?,
      Endianness::LittleEndian => self.encode(CdrSerializer::<LittleEndian>::from_vec(vec![1]))?,
    };
    Ok(TaggedProfile {
      tag: TAG_INTERNET_IOP,
      profile_data,
    })
  }

  fn decode<BO: ByteOrder>(de: &mut CdrDeserializer<BO>) -> Result<IiopProfile> {
    let major = de.read_octet()?;
    let minor = de.read_octet()?;
    let host = de.read_string()?;
    let port = de.read_u16()?;
    let object_key = de.read_octets()?;
    let components = if minor >= 1 && !de.is_empty() {
      de.read_value::<Vec<TaggedComponent>>()?
    } else {
      Vec::new()
    };
    Ok(IiopProfile {
      iiop_version: GiopVersion::new(major, minor),
      host,
      port,
      object_key,
      components,
    })
  }

  fn encode<BO: ByteOrder>(&self, mut ser: CdrSerializer<BO>) -> Result<Vec<u8>> {
    ser.write_octet(self.iiop_version.major);
    ser.write_octet(self.iiop_version.minor);
    ser.write_string(&self.host)?;
    ser.write_u16(self.port)?;
    ser.write_octets(&self.object_key)?;
    if self.iiop_version.minor >= 1 {
      ser.write_value(&self.components)?;
    }
    Ok(ser.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn iiop_1_0_profile_layout() {
    let profile = IiopProfile::new(GiopVersion::V1_0, "h", 0x0102, &[9, 8]);
    let tagged = profile.to_tagged_profile(Endianness::BigEndian).unwrap();
    assert_eq!(tagged.tag, TAG_INTERNET_IOP);
    assert_eq!(
      tagged.profile_data,
      vec![
        0, // big endian
        1, 0, // version
        0, // pad to 4
        0, 0, 0, 2, b'h', 0, // host
        0x01, 0x02, // port
        0, 0, 0, 2, 9, 8 // object key
      ]
    );
    assert_eq!(IiopProfile::from_tagged_profile(&tagged).unwrap(), profile);
  }

  #[test]
  fn little_endian_profile_with_components() {
    let mut profile = IiopProfile::new(GiopVersion::V1_2, "example.org", 2809, b"key");
    profile.components.push(TaggedComponent {
      tag: 0,
      component_data: vec![1, 2, 3],
    });
    let tagged = profile.to_tagged_profile(Endianness::LittleEndian).unwrap();
    assert_eq!(tagged.profile_data[0], 1);
    assert_eq!(IiopProfile::from_tagged_profile(&tagged).unwrap(), profile);
  }

  #[test]
  fn rejects_foreign_and_empty_profiles() {
    let foreign = TaggedProfile {
      tag: TAG_MULTIPLE_COMPONENTS,
      profile_data: vec![0],
    };
    assert!(IiopProfile::from_tagged_profile(&foreign).is_err());
    let empty = TaggedProfile {
      tag: TAG_INTERNET_IOP,
      profile_data: vec![],
    };
    assert!(IiopProfile::from_tagged_profile(&empty).is_err());
  }

  #[test]
  fn selected_profile() {
    let profile = IiopProfile::new(GiopVersion::V1_2, "h", 1, &[1]);
    let ior = Ior::from_iiop_profile("IDL:Test:1.0", &profile).unwrap();
    assert_eq!(ior.iiop_profile_index(), Some(0));
    let info = IorAddressingInfo {
      selected_profile_index: 0,
      ior: ior.clone(),
    };
    assert!(info.selected_profile().is_some());
    let info = IorAddressingInfo {
      selected_profile_index: 3,
      ior,
    };
    assert!(info.selected_profile().is_none());
    assert!(Ior::default().is_nil());
  }
}
