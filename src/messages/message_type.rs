use std::fmt::Debug;
use std::fmt;

use speedy::{Readable, Writable};

/// GIOP message type octet. Unknown values are representable so that the
/// header can be parsed before the type is validated.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Readable, Writable, Clone, Copy)]
pub struct MessageType {
  value: u8,
}

impl MessageType {
  pub const REQUEST: MessageType = MessageType { value: 0 };
  pub const REPLY: MessageType = MessageType { value: 1 };
  pub const CANCEL_REQUEST: MessageType = MessageType { value: 2 };
  pub const LOCATE_REQUEST: MessageType = MessageType { value: 3 };
  pub const LOCATE_REPLY: MessageType = MessageType { value: 4 };
  pub const CLOSE_CONNECTION: MessageType = MessageType { value: 5 };
  pub const MESSAGE_ERROR: MessageType = MessageType { value: 6 };
  pub const FRAGMENT: MessageType = MessageType { value: 7 };

  pub const ALL: [MessageType; 8] = [
    MessageType::REQUEST,
    MessageType::REPLY,
    MessageType::CANCEL_REQUEST,
    MessageType::LOCATE_REQUEST,
    MessageType::LOCATE_REPLY,
    MessageType::CLOSE_CONNECTION,
    MessageType::MESSAGE_ERROR,
    MessageType::FRAGMENT,
  ];

  pub const fn from_u8(value: u8) -> MessageType {
    MessageType { value }
  }

  pub fn value(&self) -> u8 {
    self.value
  }

  pub fn is_known(&self) -> bool {
    self.value <= MessageType::FRAGMENT.value
  }
}

impl From<MessageType> for u8 {
  fn from(t: MessageType) -> u8 {
    t.value
  }
}

impl Debug for MessageType {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      MessageType::REQUEST => fmt.write_str("Request"),
      MessageType::REPLY => fmt.write_str("Reply"),
      MessageType::CANCEL_REQUEST => fmt.write_str("CancelRequest"),
      MessageType::LOCATE_REQUEST => fmt.write_str("LocateRequest"),
      MessageType::LOCATE_REPLY => fmt.write_str("LocateReply"),
      MessageType::CLOSE_CONNECTION => fmt.write_str("CloseConnection"),
      MessageType::MESSAGE_ERROR => fmt.write_str("MessageError"),
      MessageType::FRAGMENT => fmt.write_str("Fragment"),
      MessageType { value: other } => {
        fmt.write_fmt(format_args!("MessageType {} (UNKNOWN!)", other))
      }
    }
  }
}
