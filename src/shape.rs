//! Declared types.
//!
//! A [`Shape`] names the type a value is declared with: a scalar kind, a string, a container
//! of some element shape, or a registered record. Containers carry their element shape so
//! that elements can be written without per-element headers, and so that an empty container
//! still knows what it would contain.
//!
//! On the wire a shape is flattened into a *nested-tag list* in pre-order: a container's own
//! tag is followed by its element subtree, and a map's tag is followed by its key subtree then
//! its value subtree. Each tag has a fixed arity (0 for leaves, 1 for arrays and sequences, 2
//! for maps), so the list needs no further delimiters.
//!
//! # Example
//!
//! ```
//! use tson::{encoding::constants::*, prelude::*};
//!
//! let registry = Registry::new();
//! let shape = Shape::seq(Shape::map(Shape::Str, Shape::array(Shape::I32)));
//!
//! let tags = shape.tags(&registry).unwrap();
//! assert_eq!(
//!     tags.as_slice(),
//!     &[TAG_SEQ, TAG_MAP, TAG_STRING, TAG_ARRAY, TAG_I32]
//! );
//! assert_eq!(Shape::from_tags(&tags, &registry, 8).unwrap(), shape);
//! ```

use crate::{
    encoding::constants::*,
    errors::{Error, Result},
    registry::{Kind, Registry},
    Tson,
};
use smallvec::SmallVec;
use std::{fmt, slice::Iter, sync::Arc};

/// Inline storage for nested-tag lists, enough for most real nestings.
pub type TagList = SmallVec<[TypeId; 8]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// A declared type.
///
/// Element shapes are reference-counted, so every value decoded from one container shares
/// the shape built from its nested-tag list.
pub enum Shape {
    Bool,
    Isize,
    I8,
    I16,
    I32,
    I64,
    Usize,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    /// Fixed-length container.
    Array(Arc<Shape>),
    /// Resizable container.
    Seq(Arc<Shape>),
    /// Key and value shapes.
    Map(Arc<Shape>, Arc<Shape>),
    /// A registered record, by name.
    Record(String),
}

use Shape::*;

impl Shape {
    /// Fixed-length container of `elem`.
    pub fn array(elem: Shape) -> Shape { Array(Arc::new(elem)) }

    /// Resizable container of `elem`.
    pub fn seq(elem: Shape) -> Shape { Seq(Arc::new(elem)) }

    /// Map from `key` to `val`.
    pub fn map(key: Shape, val: Shape) -> Shape { Map(Arc::new(key), Arc::new(val)) }

    /// Record registered under `name`.
    pub fn record<S: Into<String>>(name: S) -> Shape { Record(name.into()) }

    /// The built-in tag for this shape, `None` for records.
    pub fn builtin_tag(&self) -> Option<TypeId> {
        let tag = match self {
            Bool => TAG_BOOL,
            Isize => TAG_ISIZE,
            I8 => TAG_I8,
            I16 => TAG_I16,
            I32 => TAG_I32,
            I64 => TAG_I64,
            Usize => TAG_USIZE,
            U8 => TAG_U8,
            U16 => TAG_U16,
            U32 => TAG_U32,
            U64 => TAG_U64,
            F32 => TAG_F32,
            F64 => TAG_F64,
            Str => TAG_STRING,
            Array(_) => TAG_ARRAY,
            Seq(_) => TAG_SEQ,
            Map(..) => TAG_MAP,
            Record(_) => return None,
        };
        Some(tag)
    }

    /// The leaf shape for a built-in scalar or string tag.
    pub fn leaf(tag: TypeId) -> Option<Shape> {
        let shape = match tag {
            TAG_BOOL => Bool,
            TAG_ISIZE => Isize,
            TAG_I8 => I8,
            TAG_I16 => I16,
            TAG_I32 => I32,
            TAG_I64 => I64,
            TAG_USIZE => Usize,
            TAG_U8 => U8,
            TAG_U16 => U16,
            TAG_U32 => U32,
            TAG_U64 => U64,
            TAG_F32 => F32,
            TAG_F64 => F64,
            TAG_STRING => Str,
            _ => return None,
        };
        Some(shape)
    }

    /// The tag written in a header for this shape.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnregisteredType`] for a record `registry` does not know.
    pub fn tag(&self, registry: &Registry) -> Result<TypeId> {
        match self {
            Record(name) => registry.resolve_by_name(name),
            _ => Ok(self.builtin_tag().unwrap_or(TAG_INLINE)),
        }
    }

    /// Flattens this shape into its nested-tag list.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnregisteredType`] if any record in the shape is unregistered.
    pub fn tags(&self, registry: &Registry) -> Result<TagList> {
        let mut out = TagList::new();
        self.push_tags(registry, &mut out)?;
        Ok(out)
    }

    fn push_tags(&self, registry: &Registry, out: &mut TagList) -> Result<()> {
        out.push(self.tag(registry)?);
        match self {
            Array(elem) | Seq(elem) => elem.push_tags(registry, out),
            Map(key, val) => {
                key.push_tags(registry, out)?;
                val.push_tags(registry, out)
            }
            _ => Ok(()),
        }
    }

    /// Rebuilds a shape from a nested-tag list, which must describe exactly one shape.
    ///
    /// # Arguments
    ///
    /// * `tags` - The nested-tag list.
    /// * `registry` - Resolves record ids.
    /// * `max_depth` - The deepest container nesting accepted.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidShape`] if the list is cut short, has leftover tags, or
    /// contains the inline tag; with [`Error::UnknownTypeId`] for an unregistered id; and with
    /// [`Error::DepthExceeded`] if containers nest deeper than `max_depth`.
    pub fn from_tags(tags: &[TypeId], registry: &Registry, max_depth: usize) -> Result<Shape> {
        let iter = &mut tags.iter();
        let shape = Self::parse(iter, registry, 0, max_depth)?;
        match iter.len() {
            0 => Ok(shape),
            n => Err(Error::InvalidShape(format!("{} unused tags", n))),
        }
    }

    fn parse(
        iter: &mut Iter<TypeId>,
        registry: &Registry,
        depth: usize,
        max_depth: usize,
    ) -> Result<Shape> {
        let tag = *iter
            .next()
            .ok_or_else(|| Error::InvalidShape("list ended early".to_string()))?;

        let mut child = || {
            if depth >= max_depth {
                Err(Error::DepthExceeded(max_depth))
            } else {
                Self::parse(iter, registry, depth + 1, max_depth).map(Arc::new)
            }
        };

        match tag {
            TAG_INLINE => Err(Error::InvalidShape("inline tag in list".to_string())),
            TAG_ARRAY => Ok(Array(child()?)),
            TAG_SEQ => Ok(Seq(child()?)),
            TAG_MAP => {
                let key = child()?;
                let val = child()?;
                Ok(Map(key, val))
            }
            tag => match Shape::leaf(tag) {
                Some(shape) => Ok(shape),
                None => match &registry.resolve_by_id(tag)?.kind {
                    Kind::Record(desc) => Ok(Record(desc.name.clone())),
                    _ => Err(Error::UnknownTypeId(tag)),
                },
            },
        }
    }

    /// Indicates whether `value` has exactly this shape.
    ///
    /// Containers are compared by their declared element shapes, records by name.
    pub fn conforms(&self, value: &Tson) -> bool {
        match (self, value) {
            (Bool, Tson::Bool(_))
            | (Isize, Tson::Isize(_))
            | (I8, Tson::I8(_))
            | (I16, Tson::I16(_))
            | (I32, Tson::I32(_))
            | (I64, Tson::I64(_))
            | (Usize, Tson::Usize(_))
            | (U8, Tson::U8(_))
            | (U16, Tson::U16(_))
            | (U32, Tson::U32(_))
            | (U64, Tson::U64(_))
            | (F32, Tson::F32(_))
            | (F64, Tson::F64(_))
            | (Str, Tson::Str(_)) => true,
            (Array(e), Tson::Array(s, _)) | (Seq(e), Tson::Seq(s, _)) => **e == *s,
            (Map(k, v), Tson::Map(sk, sv, _)) => **k == *sk && **v == *sv,
            (Record(name), Tson::Record(r)) => *name == r.name,
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bool => write!(f, "bool"),
            Isize => write!(f, "isize"),
            I8 => write!(f, "i8"),
            I16 => write!(f, "i16"),
            I32 => write!(f, "i32"),
            I64 => write!(f, "i64"),
            Usize => write!(f, "usize"),
            U8 => write!(f, "u8"),
            U16 => write!(f, "u16"),
            U32 => write!(f, "u32"),
            U64 => write!(f, "u64"),
            F32 => write!(f, "f32"),
            F64 => write!(f, "f64"),
            Str => write!(f, "str"),
            Array(e) => write!(f, "array<{}>", e),
            Seq(e) => write!(f, "seq<{}>", e),
            Map(k, v) => write!(f, "map<{}, {}>", k, v),
            Record(name) => write!(f, "{}", name),
        }
    }
}
