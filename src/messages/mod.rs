// common header
pub mod giop_version;
pub mod header;
pub mod header_flags;
pub mod magic;
pub mod message_type;

// payload descriptors
pub mod addressing;
pub mod ior;
pub mod reply_status;
pub mod service_context;

// per-kind header fields
pub mod kinds;
pub mod message;
