pub mod message;
pub mod protocol;

/// Longest permitted string field in a wire record, in bytes. With
/// both fields bounded, one datagram always holds a whole record.
pub const MAX_FIELD_BYTES: usize = 255;
