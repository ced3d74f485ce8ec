pub use crate::{
    encoding::{decode, decode_full, decode_with_config, encode, encode_full, Config},
    errors::{Error, Result},
    registry::{FieldDecl, Registry},
    rep::*,
    shape::Shape,
    tson_macro::*,
    Record, Tson,
};
pub use bytes::Bytes;
