//! # TSON binary encoder and decoder
//!
//! Encode and decode functions for TSON.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! // a struct that will store some data
//! #[derive(TsonRep, PartialEq, Debug, Clone)]
//! struct SomeData {
//!     x: usize,
//!     y: i32,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register::<SomeData>(20).unwrap();
//!
//! // here it is storing some data
//! let some_data = SomeData { x: 1, y: 2 };
//!
//! // and we've encoded it
//! let enc = encode(&some_data, &registry).unwrap();
//!
//! // let's encode it a different way too
//! let enc_full = encode_full(&some_data.to_tson(), &registry).unwrap();
//!
//! // but they are equivalent
//! assert_eq!(enc, enc_full);
//!
//! // Note: decoding returns a `Result` of an `Option`, empty input decodes to `None`
//! let dec_ks: Tson = decode_full(&enc_full, &registry).unwrap().unwrap();
//! let dec_full: SomeData = dec_ks.into_rep().unwrap(); // did the conversion succeed?
//!
//! // success!
//! assert_eq!(dec_full, some_data);
//! ```

use crate::{
    buffer::ByteBuffer,
    coerce::coerce,
    errors::{Error, Result},
    registry::Registry,
    rep::TsonRep,
    shape::Shape,
    Tson::{self, *},
};
use bytes::Bytes;

pub mod constants;
use constants::*;
pub mod de;
pub use de::*;
pub mod ser;
pub use ser::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Limits applied while decoding untrusted input.
pub struct Config {
    /// The deepest nesting of containers and records accepted.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self { Config { max_depth: 64 } }
}

/// Encodes a [`Tson`] value with a header.
///
/// # Arguments
///
/// * `ks` - A reference to the [`Tson`] value to be encoded.
/// * `registry` - Resolves the ids of any records in `ks`.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let registry = Registry::new();
///
/// // encoded value
/// let enc: Bytes = encode_full(&Tson::from("hi"), &registry).unwrap();
///
/// assert_eq!(enc.as_ref(), &[17, 0, 2, 0, b'h', b'i']);
/// ```
pub fn encode_full(ks: &Tson, registry: &Registry) -> Result<Bytes> {
    let mut enc = Encoder::new(registry);
    enc.put(ks)?;
    Ok(enc.finalize())
}

/// Encodes any [`TsonRep`] value.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let registry = Registry::new();
/// let enc = encode(&vec![true, false], &registry).unwrap();
///
/// assert_eq!(decode(&enc, &registry).unwrap(), Some(vec![true, false]));
/// ```
pub fn encode<T: TsonRep>(t: &T, registry: &Registry) -> Result<Bytes> {
    encode_full(&t.to_tson(), registry)
}

/// Decodes a bytestring into [`Tson`], with the default [`Config`].
///
/// Empty input, or input holding only the inline tag, decodes to `None`.
///
/// # Arguments
///
/// * `bs` - The bytestring to be decoded.
/// * `registry` - Resolves type ids and field hashes.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let registry = Registry::new();
///
/// assert_eq!(decode_full(&[], &registry), Ok(None));
/// assert_eq!(decode_full(&[1, 0, 1], &registry), Ok(Some(Tson::Bool(true))));
/// ```
pub fn decode_full(bs: &[u8], registry: &Registry) -> Result<Option<Tson>> {
    decode_with_config(bs, registry, Config::default())
}

/// Decodes a bytestring into [`Tson`].
///
/// # Errors
///
/// Besides the errors of [`Decoder::read_value`], fails with [`Error::ExtraData`] if bytes
/// remain after the value.
pub fn decode_with_config(bs: &[u8], registry: &Registry, config: Config) -> Result<Option<Tson>> {
    if bs.is_empty() {
        return Ok(None);
    }
    let mut dec = Decoder::new(bs, registry, config);
    let ks = dec.read_value()?;
    match dec.remaining() {
        0 => Ok(ks),
        n => Err(Error::ExtraData(n)),
    }
}

/// Decodes a bytestring into a `T`, converting where needed.
///
/// # Errors
///
/// Besides the errors of [`decode_full`], fails with [`Error::Incompatible`] if the decoded
/// value cannot be converted into a `T`.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let registry = Registry::new();
/// let enc = encode(&vec![1i32, -2], &registry).unwrap();
///
/// // widened element by element
/// assert_eq!(decode::<Vec<i64>>(&enc, &registry), Ok(Some(vec![1, -2])));
///
/// // but never truncated
/// assert!(decode::<Vec<u8>>(&enc, &registry).is_err());
/// ```
pub fn decode<T: TsonRep>(bs: &[u8], registry: &Registry) -> Result<Option<T>> {
    let ks = match decode_full(bs, registry)? {
        Some(ks) => ks,
        None => return Ok(None),
    };
    let found = ks.shape();
    let expected = T::shape();
    coerce(ks, &expected)
        .and_then(T::from_tson)
        .map(Some)
        .ok_or_else(|| Error::Incompatible {
            expected: expected.to_string(),
            found: found.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prelude::*, util::field_hash};

    #[derive(TsonRep, Clone, Debug, PartialEq)]
    struct Foo {
        #[tson(rename = "Bar")]
        bar: i32,
    }

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register::<Foo>(50).unwrap();
        reg
    }

    #[test]
    fn bool_layout() {
        let reg = registry();
        let out = encode(&true, &reg).unwrap();

        assert_eq!(out.as_ref(), &[1, 0, 1]);
        assert_eq!(decode(&out, &reg), Ok(Some(true)));
    }

    #[test]
    fn int32_layout() {
        let reg = registry();
        let out = encode(&-42i32, &reg).unwrap();

        // tag
        assert_eq!(out[..2], [5, 0]);
        // two's complement, little-endian
        assert_eq!(out[2..], [0xd6, 0xff, 0xff, 0xff]);
        assert_eq!(decode(&out, &reg), Ok(Some(-42i32)));
    }

    #[test]
    fn string_layout() {
        let reg = registry();
        let out = encode(&"hi".to_string(), &reg).unwrap();

        assert_eq!(out.as_ref(), &[17, 0, 2, 0, 0x68, 0x69]);
        assert_eq!(decode(&out, &reg), Ok(Some("hi".to_string())));
    }

    #[test]
    fn record_layout() {
        let reg = registry();
        let out = encode(&Foo { bar: 7 }, &reg).unwrap();

        let mut expected = vec![50, 0, 1, 0];
        expected.extend_from_slice(&field_hash("Bar").to_le_bytes());
        expected.extend_from_slice(&[5, 0, 7, 0, 0, 0]);

        assert_eq!(out.as_ref(), expected.as_slice());
        assert_eq!(out[4..8], [0xba, 0x7d, 0xbc, 0xdb]);
        assert_eq!(decode(&out, &reg), Ok(Some(Foo { bar: 7 })));
    }

    #[test]
    fn zero_record_layout() {
        let reg = registry();
        let out = encode(&Foo { bar: 0 }, &reg).unwrap();

        assert_eq!(out.as_ref(), &[50, 0, 0, 0]);
        assert_eq!(decode(&out, &reg), Ok(Some(Foo { bar: 0 })));
    }

    #[test]
    fn map_layout() {
        let reg = registry();
        let ks = Tson::map(Shape::Str, Shape::seq(Shape::U8), vec![(
            "k".into(),
            Tson::seq(Shape::U8, vec![4u8.into()]),
        )]);
        let out = encode_full(&ks, &reg).unwrap();

        #[rustfmt::skip]
        let expected: &[u8] = &[
            15, 0,              // map
            1, 0,               // count
            1, 0, 17, 0,        // key tags: str
            2, 0, 16, 0, 8, 0,  // value tags: seq, u8
            1, 0, b'k',         // key
            1, 0, 4,            // value
        ];
        assert_eq!(out.as_ref(), expected);
        assert_eq!(decode_full(&out, &reg), Ok(Some(ks)));
    }

    #[test]
    fn floats_keep_their_bits() {
        let reg = registry();
        let out = encode(&-0.0f32, &reg).unwrap();

        assert_eq!(out.as_ref(), &[12, 0, 0, 0, 0, 0b1000_0000]);

        let back: f32 = decode(&out, &reg).unwrap().unwrap();
        assert_eq!(back.to_bits(), (-0.0f32).to_bits());

        let out = encode(&1f64, &reg).unwrap();
        assert_eq!(out[2..], [0, 0, 0, 0, 0, 0, 0b1111_0000, 0b0011_1111]);
    }

    #[test]
    fn fixed_and_resizable_stay_distinct() {
        let reg = registry();
        let arr = encode(&[1u8, 2], &reg).unwrap();
        let seq = encode(&vec![1u8, 2], &reg).unwrap();

        assert_eq!(arr[..2], [14, 0]);
        assert_eq!(seq[..2], [16, 0]);
        assert_eq!(arr[2..], seq[2..]);
    }

    #[test]
    fn empty_input_is_no_value() {
        let reg = registry();
        assert_eq!(decode_full(&[], &reg), Ok(None));
        assert_eq!(decode::<Foo>(&[], &reg), Ok(None));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let reg = registry();
        assert_eq!(decode_full(&[1, 0, 1, 9], &reg), Err(Error::ExtraData(1)));
    }

    #[test]
    fn unregistered_record() {
        let reg = Registry::new();
        assert_eq!(
            encode(&Foo { bar: 1 }, &reg),
            Err(Error::UnregisteredType("Foo".to_string()))
        );
    }

    #[test]
    fn unknown_id() {
        let reg = registry();
        assert_eq!(decode_full(&[99, 0, 0, 0], &reg), Err(Error::UnknownTypeId(99)));
    }

    #[test]
    fn incompatible_typed_decode() {
        let reg = registry();
        let out = encode(&"no".to_string(), &reg).unwrap();
        assert_eq!(
            decode::<Foo>(&out, &reg),
            Err(Error::Incompatible {
                expected: "Foo".to_string(),
                found: "str".to_string(),
            })
        );
    }

    #[test]
    fn long_strings_rejected() {
        let reg = registry();
        let long = Tson::Str(Bytes::from(vec![b'w'; MAX_LEN + 1]));
        assert_eq!(
            encode_full(&long, &reg),
            Err(Error::LengthExceeded(MAX_LEN + 1, MAX_LEN))
        );

        let longest = Tson::Str(Bytes::from(vec![b'w'; MAX_LEN]));
        let out = encode_full(&longest, &reg).unwrap();
        assert_eq!(out[2..4], [0xff, 0xff]);
        assert_eq!(decode_full(&out, &reg), Ok(Some(longest)));
    }
}
