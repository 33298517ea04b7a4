pub mod cdr_deserializer;
pub mod cdr_serializer;
pub mod error;

// crate exports
pub use byteorder::{BigEndian, LittleEndian};
pub use cdr_deserializer::CdrDeserializer;
pub use cdr_serializer::CdrSerializer;
pub use error::Error;
