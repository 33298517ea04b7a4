#[allow(unused_imports)]
use log::{debug, error, trace, warn};

use crate::{
  error::{GiopError, Result},
  messages::{
    addressing::AddressingPreference, giop_version::GiopVersion, header::GIOP_HEADER_LENGTH,
  },
};

/// Interrupted header reads retried before giving up.
pub const DEFAULT_READ_RETRY_LIMIT: usize = 5;
pub const DEFAULT_FRAGMENT_SIZE: usize = 1024;
/// Room for a 16-octet 1.2 Fragment header plus one 8-octet data block.
pub const MIN_FRAGMENT_SIZE: usize = 24;
/// Largest incoming message the frame codec buffers, header included.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Settings of one ORB's GIOP codec. Read-only once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
  max_version: GiopVersion,
  addressing_preference: AddressingPreference,
  read_retry_limit: usize,
  fragment_size: usize,
  max_message_size: usize,
}

impl Default for CodecConfig {
  fn default() -> Self {
    CodecConfig {
      max_version: GiopVersion::MAX_SUPPORTED,
      addressing_preference: AddressingPreference::AcceptAny,
      read_retry_limit: DEFAULT_READ_RETRY_LIMIT,
      fragment_size: DEFAULT_FRAGMENT_SIZE,
      max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
    }
  }
}

impl CodecConfig {
  pub fn builder() -> CodecConfigBuilder {
    CodecConfigBuilder::new()
  }

  /// Highest version accepted from peers and the one used in
  /// MessageError replies.
  pub fn max_version(&self) -> GiopVersion {
    self.max_version
  }

  pub fn addressing_preference(&self) -> AddressingPreference {
    self.addressing_preference
  }

  pub fn read_retry_limit(&self) -> usize {
    self.read_retry_limit
  }

  /// Largest wire message produced when splitting outgoing messages.
  pub fn fragment_size(&self) -> usize {
    self.fragment_size
  }

  /// Incoming messages announcing more octets than this are refused
  /// before their body is buffered.
  pub fn max_message_size(&self) -> usize {
    self.max_message_size
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodecConfigBuilder {
  max_version: Option<GiopVersion>,
  addressing_preference: Option<AddressingPreference>,
  read_retry_limit: Option<usize>,
  fragment_size: Option<usize>,
  max_message_size: Option<usize>,
}

impl CodecConfigBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub const fn max_version(mut self, max_version: GiopVersion) -> Self {
    self.max_version = Some(max_version);
    self
  }

  #[must_use]
  pub const fn addressing_preference(mut self, preference: AddressingPreference) -> Self {
    self.addressing_preference = Some(preference);
    self
  }

  #[must_use]
  pub const fn read_retry_limit(mut self, read_retry_limit: usize) -> Self {
    self.read_retry_limit = Some(read_retry_limit);
    self
  }

  #[must_use]
  pub const fn fragment_size(mut self, fragment_size: usize) -> Self {
    self.fragment_size = Some(fragment_size);
    self
  }

  #[must_use]
  pub const fn max_message_size(mut self, max_message_size: usize) -> Self {
    self.max_message_size = Some(max_message_size);
    self
  }

  /// Fails for a maximum version we have no header layouts for. A fragment
  /// size that is too small or not a multiple of 8 is adjusted.
  pub fn build(self) -> Result<CodecConfig> {
    let defaults = CodecConfig::default();
    let max_version = self.max_version.unwrap_or(defaults.max_version);
    if !max_version.is_supported() {
      return Err(GiopError::UnsupportedVersion(max_version));
    }

    let requested = self.fragment_size.unwrap_or(defaults.fragment_size);
    let fragment_size = (requested - requested % 8).max(MIN_FRAGMENT_SIZE);
    if fragment_size != requested {
      warn!(
        "Fragment size {} adjusted to {}",
        requested, fragment_size
      );
    }

    Ok(CodecConfig {
      max_version,
      addressing_preference: self
        .addressing_preference
        .unwrap_or(defaults.addressing_preference),
      read_retry_limit: self.read_retry_limit.unwrap_or(defaults.read_retry_limit),
      fragment_size,
      max_message_size: self
        .max_message_size
        .unwrap_or(defaults.max_message_size)
        .max(GIOP_HEADER_LENGTH),
    })
  }
}
