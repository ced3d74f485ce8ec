//! # TSON
//!
//! TSON (Tagged Serializable Object Notation) is a self-describing binary format. Values carry
//! their own type tags, so a consumer can reconstruct them without a compiled schema; record
//! types are resolved against a runtime [`Registry`](registry::Registry) instead.
//!
//! # Usage
//!
//! The trait [`TsonRep`] is used to specify how data is converted into [`Tson`]. For structs
//! with named fields it can be auto-derived, after which the type only needs to be registered.
//!
//! ```
//! use tson::prelude::*;
//!
//! #[derive(TsonRep, Clone, Debug, PartialEq)]
//! /// A reading from somewhere.
//! struct Reading {
//!     station: String,
//!     celsius: f32,
//!     samples: Vec<i32>,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register::<Reading>(100).unwrap();
//!
//! let reading = Reading {
//!     station: "north".to_string(),
//!     celsius: -3.5,
//!     samples: vec![1, 2, 3],
//! };
//!
//! // encode
//! let encoded = encode(&reading, &registry).unwrap();
//!
//! // and then decode it again
//! let decoded: Reading = decode(&encoded, &registry).unwrap().unwrap();
//!
//! assert_eq!(reading, decoded);
//! ```
//!
//! Values can also be built and inspected directly as [`Tson`], without any Rust type behind
//! them:
//!
//! ```
//! use tson::prelude::*;
//!
//! let registry = Registry::new();
//! let value = Tson::seq(Shape::Str, vec![Tson::from("a"), Tson::from("b")]);
//!
//! let encoded = encode_full(&value, &registry).unwrap();
//! assert_eq!(decode_full(&encoded, &registry).unwrap(), Some(value));
//! ```
//!
//! # An overview of TSON types
//!
//! * Scalars: `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`, and the platform-width `isize`
//!   and `usize`, which record the width they were written with.
//! * Strings: raw bytes, not validated as UTF-8 until converted to a [`String`].
//! * Arrays and sequences: homogeneous containers of fixed or resizable length. The two
//!   survive a round trip as distinct kinds.
//! * Maps: homogeneous key/value containers.
//! * Records: named fields, identified on the wire by a hash of the field name.
//!
//! # Schema evolution
//!
//! Fields are identified by the 32-bit FNV-1a hash of their name rather than by position. A
//! record written under one layout can be read under another: fields whose names match are
//! assigned (converted where needed, see [`coerce`]), fields the reader does not know are
//! skipped, and fields the writer did not send stay at their zero value.
//!
//! # Specification
//!
//! All integers on the wire are little-endian. Every value written *with a header* starts
//! with a `u16` tag:
//!
//! | Tag   | Kind              | Payload                                              |
//! | ---   | ---               | ---                                                  |
//! | 0     | inline            | none, the value is absent                            |
//! | 1     | bool              | 1 byte, nonzero is `true`                            |
//! | 2     | isize             | width byte (1, 2, 4 or 8), then the value            |
//! | 3..6  | i8, i16, i32, i64 | the value                                            |
//! | 7     | usize             | width byte, then the value                           |
//! | 8..11 | u8, u16, u32, u64 | the value                                            |
//! | 12,13 | f32, f64          | IEEE 754 bits                                        |
//! | 14    | array             | count, nested-tag list, elements                     |
//! | 15    | map               | count, key tag list, value tag list, pairs           |
//! | 16    | sequence          | count, nested-tag list, elements                     |
//! | 17    | string            | `u16` length, raw bytes                              |
//! | 18..  | record            | `u16` field count, then (`u32` name hash, value)*    |
//!
//! ## Containers
//!
//! Counts are `u16`. A *nested-tag list* is a `u16` length followed by that many tags
//! describing the element shape in pre-order (see [`shape`]). It is written once, by the
//! outermost container; every element below it is written *without* a header, since its type
//! is already known. Maps write the key list and then the value list, followed by `count`
//! key/value pairs.
//!
//! ## Records
//!
//! Each field whose value is its type's zero value is omitted, and is reconstructed as zero on
//! decode. This is the format's mechanism for optional fields. Every written field is its
//! name hash followed by the value *with* a header, so a reader can decode it without knowing
//! the field's declared type.

#![warn(
    deprecated_in_future,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![allow(clippy::cast_lossless)]

/// Procedural macros for autoderiving [`TsonRep`].
pub extern crate tson_macro;

// lets derived impls name `::tson` from inside this crate too
extern crate self as tson;

pub mod buffer;
pub mod coerce;
pub mod encoding;
pub mod errors;
pub mod prelude;
pub mod registry;
pub mod rep;
pub mod shape;
pub mod util;

use bytes::Bytes;
use rep::TsonRep;
use shape::Shape;
use std::fmt;

#[derive(Clone, Debug, Default)]
/// A record value: a type name and its fields.
///
/// Records are sparse. A field that is not present has its type's zero value, so two records
/// compare equal when they differ only in whether zero-valued fields are spelled out.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let sparse = Record::new("Foo").with("bar", 7i32);
/// let dense = Record::new("Foo").with("bar", 7i32).with("baz", "");
///
/// assert_eq!(sparse, dense);
/// ```
pub struct Record {
    /// Registered name of the record type.
    pub name: String,
    /// Fields, in the order they were inserted.
    pub fields: Vec<(String, Tson)>,
}

impl Record {
    /// Creates a record with no fields.
    pub fn new<S: Into<String>>(name: S) -> Record {
        Record {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, builder style.
    pub fn with<S: Into<String>, T: Into<Tson>>(mut self, field: S, value: T) -> Record {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning its previous value.
    pub fn insert<S: Into<String>, T: Into<Tson>>(&mut self, field: S, value: T) -> Option<Tson> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// The value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Tson> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Removes a field, returning its value.
    pub fn take(&mut self, field: &str) -> Option<Tson> {
        let ix = self.fields.iter().position(|(name, _)| name == field)?;
        Some(self.fields.remove(ix).1)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Indicates whether no fields are present.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Indicates whether every field holds its zero value.
    pub fn is_zero(&self) -> bool { self.fields.iter().all(|(_, value)| value.is_zero()) }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        fn covered(a: &Record, b: &Record) -> bool {
            a.fields.iter().all(|(name, value)| match b.get(name) {
                Some(theirs) => value == theirs,
                None => value.is_zero(),
            })
        }
        self.name == other.name && covered(self, other) && covered(other, self)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// [`Tson`] and its variants.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let b = Tson::Bool(true);
///
/// let val = match b {
///     Tson::Bool(b) => b,
///     _ => panic!(),
/// };
///
/// assert!(val);
/// ```
pub enum Tson {
    Bool(bool),
    /// Platform-width signed integer.
    Isize(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Platform-width unsigned integer.
    Usize(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Bytestring.
    ///
    /// ```
    /// use tson::prelude::{Tson::Str, *};
    ///
    /// let k_str = Str(Bytes::from_static(b"hello world"));
    /// ```
    Str(Bytes),
    /// Fixed-length container with its element shape.
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let arr = Tson::array(Shape::I32, vec![1i32.into(), 2i32.into()]);
    /// ```
    Array(Shape, Vec<Tson>),
    /// Resizable container with its element shape.
    Seq(Shape, Vec<Tson>),
    /// Key/value container with its key and value shapes.
    Map(Shape, Shape, Vec<(Tson, Tson)>),
    /// Record.
    Record(Record),
}

use Tson::*;

impl Tson {
    /// A fixed-length container of `elem` values.
    pub fn array(elem: Shape, items: Vec<Tson>) -> Tson { Array(elem, items) }

    /// A resizable container of `elem` values.
    pub fn seq(elem: Shape, items: Vec<Tson>) -> Tson { Seq(elem, items) }

    /// A map from `key` to `val` values.
    pub fn map(key: Shape, val: Shape, pairs: Vec<(Tson, Tson)>) -> Tson { Map(key, val, pairs) }

    /// Converts a bytestring literal to [`Tson`].
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let ks_foo = Tson::from_static(b"this is an example");
    /// ```
    pub fn from_static(bytes: &'static [u8]) -> Tson { Str(Bytes::from_static(bytes)) }

    /// The declared shape of this value.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let nested = Tson::seq(Shape::seq(Shape::U8), vec![]);
    /// assert_eq!(nested.shape(), Shape::seq(Shape::seq(Shape::U8)));
    /// ```
    pub fn shape(&self) -> Shape {
        match self {
            Bool(_) => Shape::Bool,
            Isize(_) => Shape::Isize,
            I8(_) => Shape::I8,
            I16(_) => Shape::I16,
            I32(_) => Shape::I32,
            I64(_) => Shape::I64,
            Usize(_) => Shape::Usize,
            U8(_) => Shape::U8,
            U16(_) => Shape::U16,
            U32(_) => Shape::U32,
            U64(_) => Shape::U64,
            F32(_) => Shape::F32,
            F64(_) => Shape::F64,
            Str(_) => Shape::Str,
            Array(elem, _) => Shape::array(elem.clone()),
            Seq(elem, _) => Shape::seq(elem.clone()),
            Map(key, val, _) => Shape::map(key.clone(), val.clone()),
            Record(r) => Shape::Record(r.name.clone()),
        }
    }

    /// Indicates whether this is its type's zero value.
    ///
    /// Floats are zero only when their bits are all zero, so `-0.0` is not. Sequences, maps,
    /// and strings are zero when empty; arrays and records when everything in them is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// assert!(Tson::from(0u8).is_zero());
    /// assert!(!Tson::from(-0.0f64).is_zero());
    /// assert!(Tson::array(Shape::I8, vec![0i8.into(), 0i8.into()]).is_zero());
    /// ```
    pub fn is_zero(&self) -> bool {
        match self {
            Bool(b) => !b,
            Isize(i) => *i == 0,
            I8(i) => *i == 0,
            I16(i) => *i == 0,
            I32(i) => *i == 0,
            I64(i) => *i == 0,
            Usize(u) => *u == 0,
            U8(u) => *u == 0,
            U16(u) => *u == 0,
            U32(u) => *u == 0,
            U64(u) => *u == 0,
            F32(f) => f.to_bits() == 0,
            F64(f) => f.to_bits() == 0,
            Str(bs) => bs.is_empty(),
            Array(_, items) => items.iter().all(Tson::is_zero),
            Seq(_, items) => items.is_empty(),
            Map(_, _, pairs) => pairs.is_empty(),
            Record(r) => r.is_zero(),
        }
    }

    /// The bytes of a string value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Str(bs) => Some(bs),
            _ => None,
        }
    }

    /// The record inside a record value.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Record(r) => Some(r),
            _ => None,
        }
    }

    /// Consumes the value, returning the record inside.
    pub fn into_record(self) -> Option<Record> {
        match self {
            Record(r) => Some(r),
            _ => None,
        }
    }

    /// Consumes an array or sequence, returning its elements.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let ks = vec![1u8, 2, 3].into_tson();
    /// assert_eq!(ks.into_vec().unwrap().len(), 3);
    /// ```
    pub fn into_vec(self) -> Option<Vec<Tson>> {
        match self {
            Array(_, items) | Seq(_, items) => Some(items),
            _ => None,
        }
    }

    /// Consumes a map, returning its pairs.
    pub fn into_pairs(self) -> Option<Vec<(Tson, Tson)>> {
        match self {
            Map(_, _, pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Consumes a [`Tson`] value, converting it to a value of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let n: u8 = 1u8.to_tson().into_rep().unwrap();
    /// assert_eq!(n, 1);
    /// ```
    pub fn into_rep<T: TsonRep>(self) -> Option<T> { T::from_tson(self) }
}

impl fmt::Display for Tson {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bool(b) => write!(f, "{}", b),
            Isize(i) => write!(f, "{}", i),
            I8(i) => write!(f, "{}", i),
            I16(i) => write!(f, "{}", i),
            I32(i) => write!(f, "{}", i),
            I64(i) => write!(f, "{}", i),
            Usize(u) => write!(f, "{}", u),
            U8(u) => write!(f, "{}", u),
            U16(u) => write!(f, "{}", u),
            U32(u) => write!(f, "{}", u),
            U64(u) => write!(f, "{}", u),
            F32(x) => write!(f, "{}", x),
            F64(x) => write!(f, "{}", x),
            Str(bs) => write!(f, "{:?}", String::from_utf8_lossy(bs)),
            Array(_, items) | Seq(_, items) => {
                write!(f, "[")?;
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Map(_, _, pairs) => {
                write!(f, "{{")?;
                for (ix, (k, v)) in pairs.iter().enumerate() {
                    if ix > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Record(r) => {
                write!(f, "{} {{", r.name)?;
                for (ix, (k, v)) in r.fields.iter().enumerate() {
                    if ix > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", k, v)?;
                }
                write!(f, " }}")
            }
        }
    }
}

from_fn!(Tson, bool, Bool);
from_fn!(Tson, isize, Isize);
from_fn!(Tson, i8, I8);
from_fn!(Tson, i16, I16);
from_fn!(Tson, i32, I32);
from_fn!(Tson, i64, I64);
from_fn!(Tson, usize, Usize);
from_fn!(Tson, u8, U8);
from_fn!(Tson, u16, U16);
from_fn!(Tson, u32, U32);
from_fn!(Tson, u64, U64);
from_fn!(Tson, f32, F32);
from_fn!(Tson, f64, F64);
from_fn!(Tson, Bytes, Str);
from_fn!(Tson, String, |s: String| Str(Bytes::from(s)));
from_fn!(Tson, Record, Record);

impl<'a> From<&'a str> for Tson {
    fn from(s: &'a str) -> Tson { Str(Bytes::copy_from_slice(s.as_bytes())) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_of_values() {
        assert_eq!(Tson::from(1isize).shape(), Shape::Isize);
        assert_eq!(Tson::from("x").shape(), Shape::Str);
        assert_eq!(
            Tson::map(Shape::Str, Shape::U8, vec![]).shape(),
            Shape::map(Shape::Str, Shape::U8)
        );
        assert_eq!(
            Tson::from(Record::new("Foo")).shape(),
            Shape::record("Foo")
        );
    }

    #[test]
    fn zero_values() {
        assert!(Tson::from(false).is_zero());
        assert!(Tson::from(0.0f32).is_zero());
        assert!(!Tson::from(-0.0f32).is_zero());
        assert!(Tson::from("").is_zero());
        assert!(!Tson::from(" ").is_zero());
        assert!(Tson::seq(Shape::I8, vec![]).is_zero());
        assert!(!Tson::seq(Shape::I8, vec![Tson::from(0i8)]).is_zero());
        assert!(Tson::array(Shape::I8, vec![Tson::from(0i8)]).is_zero());
        assert!(!Tson::array(Shape::I8, vec![Tson::from(3i8)]).is_zero());
        assert!(Tson::from(Record::new("Foo").with("bar", 0i32)).is_zero());
        assert!(!Tson::from(Record::new("Foo").with("bar", 1i32)).is_zero());
    }

    #[test]
    fn record_fields() {
        let mut r = Record::new("Foo").with("a", 1u8);
        assert_eq!(r.insert("a", 2u8), Some(Tson::U8(1)));
        assert_eq!(r.insert("b", true), None);
        assert_eq!(r.get("a"), Some(&Tson::U8(2)));
        assert_eq!(r.take("b"), Some(Tson::Bool(true)));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn record_equality_ignores_spelled_out_zeros() {
        let a = Record::new("Foo").with("x", 1i32);
        let b = Record::new("Foo").with("y", 0i64).with("x", 1i32);
        let c = Record::new("Foo").with("x", 2i32);
        let d = Record::new("Bar").with("x", 1i32);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn display() {
        let r = Record::new("Foo")
            .with("bar", 7i32)
            .with("tags", Tson::seq(Shape::Str, vec!["a".into()]));
        assert_eq!(Tson::from(r).to_string(), "Foo { bar: 7, tags: [\"a\"] }");
    }
}
