//! Wire tags. Every tag is written as a little-endian `u16`.

/// Numeric identifier of a type on the wire.
pub type TypeId = u16;

/// Inline tag: read the next tag now, or the value is absent.
pub const TAG_INLINE: TypeId = 0;
/// `bool`, one byte.
pub const TAG_BOOL: TypeId = 1;
/// Platform-width signed integer, preceded by a width byte.
pub const TAG_ISIZE: TypeId = 2;
pub const TAG_I8: TypeId = 3;
pub const TAG_I16: TypeId = 4;
pub const TAG_I32: TypeId = 5;
pub const TAG_I64: TypeId = 6;
/// Platform-width unsigned integer, preceded by a width byte.
pub const TAG_USIZE: TypeId = 7;
pub const TAG_U8: TypeId = 8;
pub const TAG_U16: TypeId = 9;
pub const TAG_U32: TypeId = 10;
pub const TAG_U64: TypeId = 11;
pub const TAG_F32: TypeId = 12;
pub const TAG_F64: TypeId = 13;
/// Fixed-length container.
pub const TAG_ARRAY: TypeId = 14;
/// Key/value container.
pub const TAG_MAP: TypeId = 15;
/// Resizable container.
pub const TAG_SEQ: TypeId = 16;
/// Bytestring with a `u16` length prefix.
pub const TAG_STRING: TypeId = 17;

/// Highest id reserved for built-in types.
pub const MAX_BUILTIN_ID: TypeId = TAG_STRING;
/// Smallest id a user record may be registered under.
pub const FIRST_USER_ID: TypeId = MAX_BUILTIN_ID + 1;

/// Element counts, field counts, and string lengths are all `u16`.
pub(crate) const MAX_LEN: usize = u16::max_value() as usize;

/// Width of the platform integer kinds on this machine.
pub(crate) const PLATFORM_WIDTH: u8 = std::mem::size_of::<usize>() as u8;

/// FNV-1a 32-bit offset basis.
pub(crate) const FNV_OFFSET: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
pub(crate) const FNV_PRIME: u32 = 0x0100_0193;
