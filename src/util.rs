use crate::encoding::constants::{FNV_OFFSET, FNV_PRIME};

/// Computes the 32-bit FNV-1a hash of a field name.
///
/// # Arguments
///
/// * `name: &str` - The name to be hashed.
///
/// # Example
///
/// ```
/// use tson::util::field_hash;
///
/// assert_eq!(field_hash(""), 0x811c_9dc5);
/// assert_ne!(field_hash("x"), field_hash("y"));
/// ```
pub fn field_hash(name: &str) -> u32 {
    name.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[macro_export]
/// Helper macro to make implementing `From` easier.
macro_rules! from_fn {
    ($to:ty, $from:ty, $fn:expr) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $fn(f) }
        }
    };
}
