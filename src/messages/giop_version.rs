use std::fmt;

use speedy::{Readable, Writable};
use serde::{Deserialize, Serialize};

/// GIOP protocol revision as it appears in the message header: one octet
/// major, one octet minor.
///
/// Ordering is lexicographic on (major, minor).
#[derive(
  Debug,
  PartialOrd,
  PartialEq,
  Ord,
  Eq,
  Hash,
  Readable,
  Writable,
  Serialize,
  Deserialize,
  Clone,
  Copy,
)]
pub struct GiopVersion {
  pub major: u8,
  pub minor: u8,
}

impl GiopVersion {
  pub const V1_0: GiopVersion = GiopVersion { major: 1, minor: 0 };
  pub const V1_1: GiopVersion = GiopVersion { major: 1, minor: 1 };
  pub const V1_2: GiopVersion = GiopVersion { major: 1, minor: 2 };

  /// Highest revision this crate has header layouts for.
  pub const MAX_SUPPORTED: GiopVersion = GiopVersion::V1_2;

  pub const fn new(major: u8, minor: u8) -> GiopVersion {
    GiopVersion { major, minor }
  }

  /// true for exactly 1.0, 1.1 and 1.2
  pub fn is_supported(&self) -> bool {
    *self == GiopVersion::V1_0 || *self == GiopVersion::V1_1 || *self == GiopVersion::V1_2
  }

  /// 1.0 has a byte-order octet instead of a flags octet and no
  /// fragmentation.
  pub fn has_flags(&self) -> bool {
    *self >= GiopVersion::V1_1
  }
}

impl Default for GiopVersion {
  fn default() -> Self {
    GiopVersion::MAX_SUPPORTED
  }
}

impl fmt::Display for GiopVersion {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{}", self.major, self.minor)
  }
}
