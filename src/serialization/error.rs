use std::fmt::{self, Display};

use serde::{de, ser};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the CDR body codec.
#[derive(Debug)]
pub enum Error {
  // Created by data structures through the `ser::Error` and `de::Error`
  // traits, e.g. a derived Deserialize missing a field.
  Message(String),
  IOError(std::io::Error),
  SequenceLengthUnknown,
  // Created directly by the Serializer and Deserializer.
  Eof,
  BadBoolean(u8),
  BadString(std::str::Utf8Error), // was not valid UTF-8
  BadChar(u32),                   // invalid Unicode codepoint
  BadOption(u32),
  // String length prefix was zero, so there is no room for the terminator.
  MissingStringTerminator,
  NotSelfDescribing,
}

impl ser::Error for Error {
  fn custom<T: Display>(msg: T) -> Self {
    Error::Message(msg.to_string())
  }
}

impl de::Error for Error {
  fn custom<T: Display>(msg: T) -> Self {
    Error::Message(msg.to_string())
  }
}

impl Display for Error {
  fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Error::Message(msg) => formatter.write_str(msg),
      Error::Eof => formatter.write_str("unexpected end of input"),
      Error::IOError(e) => formatter.write_fmt(format_args!("io::Error: {:?}", e)),
      Error::SequenceLengthUnknown => formatter
        .write_str("CDR serialization requires sequence length to be specified at the start."),
      Error::BadChar(e) => formatter.write_fmt(format_args!("Bad Unicode character code: {:?}", e)),
      Error::BadBoolean(e) => {
        formatter.write_fmt(format_args!("Expected 0 or 1 as Boolean, got: {:?}", e))
      }
      Error::BadOption(e) => {
        formatter.write_fmt(format_args!("Expected 0 or 1 as Option tag, got: {:?}", e))
      }
      Error::BadString(utf_err) => formatter.write_fmt(format_args!("UTF-8 error: {:?}", utf_err)),
      Error::MissingStringTerminator => formatter.write_str("CDR string without NUL terminator"),
      Error::NotSelfDescribing => {
        formatter.write_str("CDR is not self-describing, deserialize_any is not supported")
      }
    }
  }
}

impl From<std::io::Error> for Error {
  fn from(ioerr: std::io::Error) -> Error {
    Error::IOError(ioerr)
  }
}

impl std::error::Error for Error {}
