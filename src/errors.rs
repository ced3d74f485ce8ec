//! Errors produced while registering, encoding, or decoding TSON.

use crate::encoding::constants::TypeId;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in TSON.
///
/// Registration errors (`DuplicateTypeId`, `AlreadyRegistered`, `ReservedTypeId`,
/// `FieldHashCollision`) are configuration mistakes and should be fixed before any value
/// is encoded. The rest are returned from [`encode`](crate::encoding::encode) and
/// [`decode`](crate::encoding::decode) and leave no partial output behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("type `{0}` is not registered")]
    UnregisteredType(String),
    #[error("unknown type id {0}")]
    UnknownTypeId(TypeId),
    #[error("type id {id} is already assigned to `{existing}`, cannot assign it to `{name}`")]
    DuplicateTypeId {
        id: TypeId,
        existing: String,
        name: String,
    },
    #[error("type `{name}` is already registered with id {existing}, cannot re-register it as {id}")]
    AlreadyRegistered {
        name: String,
        existing: TypeId,
        id: TypeId,
    },
    #[error("type id {0} is reserved for built-in types")]
    ReservedTypeId(TypeId),
    #[error("fields `{first}` and `{second}` of `{record}` share the name hash {hash:#010x}")]
    FieldHashCollision {
        record: String,
        first: String,
        second: String,
        hash: u32,
    },
    #[error("tried to read {needed} bytes from buffer with {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },
    #[error("invalid platform integer width {0}")]
    InvalidWidth(u8),
    #[error("invalid nested type list: {0}")]
    InvalidShape(String),
    #[error("container declared `{expected}` elements but found `{found}`")]
    ElementMismatch { expected: String, found: String },
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize),
    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("decoded `{found}` cannot be converted to `{expected}`")]
    Incompatible { expected: String, found: String },
    #[error("`{record}` has no field named `{field}`")]
    UnknownField { record: String, field: String },
}
