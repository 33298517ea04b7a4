//! Which (version, message type) combinations may carry the "more
//! fragments" bit.

#[allow(unused_imports)]
use log::{debug, error, trace, warn};

use crate::{
  error::{GiopError, Result},
  messages::{giop_version::GiopVersion, header_flags::more_fragments_flag, message_type::MessageType},
};

// Columns are GIOP 1.0, 1.1, 1.2.
const FRAGMENTATION_TABLE: [(MessageType, [bool; 3]); 8] = [
  (MessageType::REQUEST, [false, true, true]),
  (MessageType::REPLY, [false, true, true]),
  (MessageType::CANCEL_REQUEST, [false, false, false]),
  (MessageType::LOCATE_REQUEST, [false, false, true]),
  (MessageType::LOCATE_REPLY, [false, false, true]),
  (MessageType::CLOSE_CONNECTION, [false, false, false]),
  (MessageType::MESSAGE_ERROR, [false, false, false]),
  (MessageType::FRAGMENT, [false, true, true]),
];

fn version_column(version: GiopVersion) -> Option<usize> {
  match version {
    GiopVersion::V1_0 => Some(0),
    GiopVersion::V1_1 => Some(1),
    GiopVersion::V1_2 => Some(2),
    _ => None,
  }
}

/// Can a message of this type and version be split, i.e. be followed by
/// Fragment messages? False for versions without a header layout.
pub fn may_fragment(version: GiopVersion, message_type: MessageType) -> bool {
  let column = match version_column(version) {
    Some(c) => c,
    None => return false,
  };
  FRAGMENTATION_TABLE
    .iter()
    .find(|(t, _)| *t == message_type)
    .map(|(_, allowed)| allowed[column])
    .unwrap_or(false)
}

/// Check an incoming header. Unknown message types pass, they are rejected
/// later by type dispatch.
pub fn validate_fragmentation(
  version: GiopVersion,
  flags: u8,
  message_type: MessageType,
) -> Result<()> {
  if !message_type.is_known() {
    return Ok(());
  }
  let disallowed = if version == GiopVersion::V1_0 {
    message_type == MessageType::FRAGMENT
  } else {
    more_fragments_flag(version, flags) && !may_fragment(version, message_type)
  };
  if disallowed {
    debug!(
      "Fragmentation not allowed: {:?} version {} flags {:#04x}",
      message_type, version, flags
    );
    Err(GiopError::FragmentationDisallowed {
      version,
      message_type,
    })
  } else {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn never_fragmentable() {
    for t in &[
      MessageType::CANCEL_REQUEST,
      MessageType::CLOSE_CONNECTION,
      MessageType::MESSAGE_ERROR,
    ] {
      for v in &[GiopVersion::V1_0, GiopVersion::V1_1, GiopVersion::V1_2] {
        assert!(!may_fragment(*v, *t));
      }
      assert!(validate_fragmentation(GiopVersion::V1_2, 0x02, *t).is_err());
      assert!(validate_fragmentation(GiopVersion::V1_2, 0x01, *t).is_ok());
    }
  }

  #[test]
  fn locate_messages_fragment_only_in_1_2() {
    for t in &[MessageType::LOCATE_REQUEST, MessageType::LOCATE_REPLY] {
      assert!(!may_fragment(GiopVersion::V1_1, *t));
      assert!(may_fragment(GiopVersion::V1_2, *t));
      assert!(validate_fragmentation(GiopVersion::V1_1, 0x02, *t).is_err());
      assert!(validate_fragmentation(GiopVersion::V1_2, 0x02, *t).is_ok());
    }
  }

  #[test]
  fn request_reply_fragment() {
    for t in &[MessageType::REQUEST, MessageType::REPLY, MessageType::FRAGMENT] {
      assert!(may_fragment(GiopVersion::V1_1, *t));
      assert!(may_fragment(GiopVersion::V1_2, *t));
      assert!(!may_fragment(GiopVersion::V1_0, *t));
    }
  }

  #[test]
  fn fragment_type_illegal_in_1_0() {
    match validate_fragmentation(GiopVersion::V1_0, 0x00, MessageType::FRAGMENT) {
      Err(GiopError::FragmentationDisallowed { version, message_type }) => {
        assert_eq!(version, GiopVersion::V1_0);
        assert_eq!(message_type, MessageType::FRAGMENT);
      }
      other => panic!("unexpected {:?}", other),
    }
    // the bit does not exist in 1.0, a 1.0 Request is fine whatever the octet
    assert!(validate_fragmentation(GiopVersion::V1_0, 0x02, MessageType::REQUEST).is_ok());
  }

  #[test]
  fn unknown_versions_and_types() {
    assert!(!may_fragment(GiopVersion::new(1, 3), MessageType::REQUEST));
    assert!(validate_fragmentation(GiopVersion::V1_2, 0x02, MessageType::from_u8(9)).is_ok());
  }
}
