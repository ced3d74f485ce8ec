//! Conversions applied when a decoded value meets a declared field type.
//!
//! [`coerce`] tries, in order:
//!
//! 1. the value as-is, if it already has the declared shape;
//! 2. a direct conversion between the two kinds:
//!     * any numeric kind into any other, when the value is representable in the destination
//!       (checked with [`NumCast`], so `300` does not fit a `u8` and `NaN` fits no integer);
//!     * a string into a sequence or array of `u8`, and back;
//! 3. for containers, the same rules element by element: arrays and sequences convert into
//!    arrays and sequences, maps into maps with keys and values converted independently.
//!
//! Anything else has no conversion. A single element that fails to convert fails the whole
//! container, so a field is either assigned completely or not at all.
//!
//! # Example
//!
//! ```
//! use tson::{coerce::coerce, prelude::*};
//!
//! let narrow = Tson::seq(Shape::I32, vec![1i32.into(), (-2i32).into()]);
//! let wide = coerce(narrow, &Shape::seq(Shape::I64)).unwrap();
//!
//! assert_eq!(wide, Tson::seq(Shape::I64, vec![1i64.into(), (-2i64).into()]));
//! assert_eq!(coerce(Tson::U16(300), &Shape::U8), None);
//! ```

use crate::{shape::Shape, Tson};
use bytes::Bytes;
use num_traits::NumCast;

macro_rules! cast_to {
    ($value:expr, $variant:ident, $t:ty) => {
        match $value {
            Tson::Isize(n) => <$t as NumCast>::from(*n),
            Tson::I8(n) => <$t as NumCast>::from(*n),
            Tson::I16(n) => <$t as NumCast>::from(*n),
            Tson::I32(n) => <$t as NumCast>::from(*n),
            Tson::I64(n) => <$t as NumCast>::from(*n),
            Tson::Usize(n) => <$t as NumCast>::from(*n),
            Tson::U8(n) => <$t as NumCast>::from(*n),
            Tson::U16(n) => <$t as NumCast>::from(*n),
            Tson::U32(n) => <$t as NumCast>::from(*n),
            Tson::U64(n) => <$t as NumCast>::from(*n),
            Tson::F32(n) => <$t as NumCast>::from(*n),
            Tson::F64(n) => <$t as NumCast>::from(*n),
            _ => None,
        }
        .map(Tson::$variant)
    };
}

/// Converts `value` into a value of shape `target`, if any conversion applies.
pub fn coerce(value: Tson, target: &Shape) -> Option<Tson> {
    if target.conforms(&value) {
        return Some(value);
    }

    if let Some(converted) = numeric(&value, target) {
        return Some(converted);
    }

    match (value, target) {
        (Tson::Str(bs), Shape::Seq(elem)) if **elem == Shape::U8 => {
            Some(Tson::Seq(Shape::U8, bytes_to_items(&bs)))
        }
        (Tson::Str(bs), Shape::Array(elem)) if **elem == Shape::U8 => {
            Some(Tson::Array(Shape::U8, bytes_to_items(&bs)))
        }
        (Tson::Array(_, items), Shape::Str) | (Tson::Seq(_, items), Shape::Str) => items
            .into_iter()
            .map(|item| match coerce(item, &Shape::U8)? {
                Tson::U8(b) => Some(b),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .map(|bs| Tson::Str(Bytes::from(bs))),
        (Tson::Array(_, items), Shape::Array(elem)) | (Tson::Seq(_, items), Shape::Array(elem)) => {
            Some(Tson::Array((**elem).clone(), coerce_all(items, elem)?))
        }
        (Tson::Array(_, items), Shape::Seq(elem)) | (Tson::Seq(_, items), Shape::Seq(elem)) => {
            Some(Tson::Seq((**elem).clone(), coerce_all(items, elem)?))
        }
        (Tson::Map(_, _, pairs), Shape::Map(key, val)) => {
            let pairs = pairs
                .into_iter()
                .map(|(k, v)| Some((coerce(k, key)?, coerce(v, val)?)))
                .collect::<Option<Vec<_>>>()?;
            Some(Tson::Map((**key).clone(), (**val).clone(), pairs))
        }
        _ => None,
    }
}

fn numeric(value: &Tson, target: &Shape) -> Option<Tson> {
    match target {
        Shape::Isize => cast_to!(value, Isize, isize),
        Shape::I8 => cast_to!(value, I8, i8),
        Shape::I16 => cast_to!(value, I16, i16),
        Shape::I32 => cast_to!(value, I32, i32),
        Shape::I64 => cast_to!(value, I64, i64),
        Shape::Usize => cast_to!(value, Usize, usize),
        Shape::U8 => cast_to!(value, U8, u8),
        Shape::U16 => cast_to!(value, U16, u16),
        Shape::U32 => cast_to!(value, U32, u32),
        Shape::U64 => cast_to!(value, U64, u64),
        Shape::F32 => cast_to!(value, F32, f32),
        Shape::F64 => cast_to!(value, F64, f64),
        _ => None,
    }
}

fn coerce_all(items: Vec<Tson>, elem: &Shape) -> Option<Vec<Tson>> {
    items.into_iter().map(|item| coerce(item, elem)).collect()
}

fn bytes_to_items(bs: &[u8]) -> Vec<Tson> { bs.iter().map(|&b| Tson::U8(b)).collect() }
