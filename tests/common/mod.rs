#![allow(dead_code)]

use rustgiop::{GiopVersion, Message, MessageFactory, Result};

pub fn init_logging() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// Parse a complete wire message the way a connection reader would: common
/// header first, then the message-specific fields. Returns the message and
/// the caller's body.
pub fn read_back(factory: &MessageFactory, bytes: &[u8]) -> Result<(Message, Vec<u8>)> {
  let mut source = bytes;
  let mut message = factory.read_message(&mut source)?;
  let offset = message.decode(source)?;
  Ok((message, source[offset..].to_vec()))
}

pub fn header(version: GiopVersion, flags: u8, message_type: u8, length: [u8; 4]) -> [u8; 12] {
  [
    b'G',
    b'I',
    b'O',
    b'P',
    version.major,
    version.minor,
    flags,
    message_type,
    length[0],
    length[1],
    length[2],
    length[3],
  ]
}
