use byteorder::ByteOrder;

use super::HeaderCodec;
use crate::{
  error::Result,
  messages::giop_version::GiopVersion,
  serialization::{CdrDeserializer, CdrSerializer},
};

/// Same layout in every version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CancelRequest {
  pub request_id: u32,
}

impl HeaderCodec for CancelRequest {
  fn decode_header<BO: ByteOrder>(
    de: &mut CdrDeserializer<BO>,
    _version: GiopVersion,
  ) -> Result<Self> {
    Ok(CancelRequest {
      request_id: de.read_u32()?,
    })
  }

  fn encode_header<BO: ByteOrder>(&self, ser: &mut CdrSerializer<BO>) -> Result<()> {
    ser.write_u32(self.request_id)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use byteorder::LittleEndian;

  use super::*;

  #[test]
  fn little_endian_request_id() {
    let bytes = [0x2A, 0, 0, 0];
    let mut de = CdrDeserializer::<LittleEndian>::new(&bytes, 12);
    let cancel = CancelRequest::decode_header(&mut de, GiopVersion::V1_1).unwrap();
    assert_eq!(cancel.request_id, 42);
  }
}
