use crate::{registry::FieldDecl, shape::Shape, Record, Tson};
use bytes::Bytes;
use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};

/// A value representable as [`Tson`].
///
/// Besides converting to and from [`Tson`], a representation knows its declared [`Shape`],
/// which is what lets an empty `Vec<T>` still say what it contains, and its zero value, which
/// is what a record field becomes when it was omitted on the wire.
pub trait TsonRep: Sized {
    /// The declared shape of every value of this type.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// assert_eq!(<Vec<[u8; 4]>>::shape(), Shape::seq(Shape::array(Shape::U8)));
    /// ```
    fn shape() -> Shape;

    /// Converts value into [`Tson`].
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let k_num = 1i32.to_tson();
    /// ```
    fn to_tson(&self) -> Tson;

    /// Consumes value, converting it into [`Tson`].
    fn into_tson(self) -> Tson { self.to_tson() }

    /// Converts value from [`Tson`], returning `None` if `ks` does not represent a `Self`.
    ///
    /// # Arguments
    ///
    /// `ks: Tson` - The value to be converted from [`Tson`].
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// let k_str = "foo".to_string().into_tson();
    ///
    /// assert_eq!(String::from_tson(k_str).unwrap(), "foo");
    /// ```
    fn from_tson(ks: Tson) -> Option<Self>;

    /// The zero value of this type.
    fn zero() -> Self;
}

/// A record type: a [`TsonRep`] with named fields that can be registered.
///
/// This is usually derived along with [`TsonRep`].
pub trait TsonRecord: TsonRep {
    /// The name the type is registered and resolved under.
    const NAME: &'static str;

    /// Every serialized field, in declaration order.
    fn fields() -> Vec<FieldDecl>;
}

macro_rules! scalar_rep {
    ($t:ty, $variant:ident) => {
        impl TsonRep for $t {
            fn shape() -> Shape { Shape::$variant }

            fn to_tson(&self) -> Tson { Tson::$variant(*self) }

            fn from_tson(ks: Tson) -> Option<Self> {
                match ks {
                    Tson::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn zero() -> Self { <$t>::default() }
        }
    };
}

scalar_rep!(bool, Bool);
scalar_rep!(isize, Isize);
scalar_rep!(i8, I8);
scalar_rep!(i16, I16);
scalar_rep!(i32, I32);
scalar_rep!(i64, I64);
scalar_rep!(usize, Usize);
scalar_rep!(u8, U8);
scalar_rep!(u16, U16);
scalar_rep!(u32, U32);
scalar_rep!(u64, U64);
scalar_rep!(f32, F32);
scalar_rep!(f64, F64);

impl TsonRep for String {
    fn shape() -> Shape { Shape::Str }

    fn to_tson(&self) -> Tson { Tson::Str(Bytes::copy_from_slice(self.as_bytes())) }

    fn into_tson(self) -> Tson { Tson::Str(Bytes::from(self)) }

    fn from_tson(ks: Tson) -> Option<Self> {
        match ks {
            Tson::Str(bs) => String::from_utf8(bs.to_vec()).ok(),
            _ => None,
        }
    }

    fn zero() -> Self { String::new() }
}

impl TsonRep for Bytes {
    fn shape() -> Shape { Shape::Str }

    fn to_tson(&self) -> Tson { Tson::Str(self.clone()) }

    fn from_tson(ks: Tson) -> Option<Self> {
        match ks {
            Tson::Str(bs) => Some(bs),
            _ => None,
        }
    }

    fn zero() -> Self { Bytes::new() }
}

impl<T: TsonRep> TsonRep for Vec<T> {
    fn shape() -> Shape { Shape::seq(T::shape()) }

    fn to_tson(&self) -> Tson { Tson::Seq(T::shape(), self.iter().map(T::to_tson).collect()) }

    fn into_tson(self) -> Tson {
        Tson::Seq(T::shape(), self.into_iter().map(T::into_tson).collect())
    }

    fn from_tson(ks: Tson) -> Option<Self> {
        ks.into_vec()?.into_iter().map(T::from_tson).collect()
    }

    fn zero() -> Self { Vec::new() }
}

impl<T: TsonRep, const N: usize> TsonRep for [T; N] {
    fn shape() -> Shape { Shape::array(T::shape()) }

    fn to_tson(&self) -> Tson { Tson::Array(T::shape(), self.iter().map(T::to_tson).collect()) }

    fn into_tson(self) -> Tson {
        Tson::Array(T::shape(), self.into_iter().map(T::into_tson).collect())
    }

    fn from_tson(ks: Tson) -> Option<Self> {
        let items = ks.into_vec()?;
        if items.len() != N {
            return None;
        }
        let out: Vec<T> = items.into_iter().map(T::from_tson).collect::<Option<_>>()?;
        out.try_into().ok()
    }

    fn zero() -> Self { std::array::from_fn(|_| T::zero()) }
}

impl<K, V, S> TsonRep for HashMap<K, V, S>
where
    K: TsonRep + Eq + Hash,
    V: TsonRep,
    S: BuildHasher + Default,
{
    fn shape() -> Shape { Shape::map(K::shape(), V::shape()) }

    fn to_tson(&self) -> Tson {
        Tson::Map(
            K::shape(),
            V::shape(),
            self.iter().map(|(k, v)| (k.to_tson(), v.to_tson())).collect(),
        )
    }

    fn into_tson(self) -> Tson {
        Tson::Map(
            K::shape(),
            V::shape(),
            self.into_iter()
                .map(|(k, v)| (k.into_tson(), v.into_tson()))
                .collect(),
        )
    }

    fn from_tson(ks: Tson) -> Option<Self> {
        ks.into_pairs()?
            .into_iter()
            .map(|(k, v)| Some((K::from_tson(k)?, V::from_tson(v)?)))
            .collect()
    }

    fn zero() -> Self { HashMap::default() }
}

impl<K: TsonRep + Ord, V: TsonRep> TsonRep for BTreeMap<K, V> {
    fn shape() -> Shape { Shape::map(K::shape(), V::shape()) }

    fn to_tson(&self) -> Tson {
        Tson::Map(
            K::shape(),
            V::shape(),
            self.iter().map(|(k, v)| (k.to_tson(), v.to_tson())).collect(),
        )
    }

    fn into_tson(self) -> Tson {
        Tson::Map(
            K::shape(),
            V::shape(),
            self.into_iter()
                .map(|(k, v)| (k.into_tson(), v.into_tson()))
                .collect(),
        )
    }

    fn from_tson(ks: Tson) -> Option<Self> {
        ks.into_pairs()?
            .into_iter()
            .map(|(k, v)| Some((K::from_tson(k)?, V::from_tson(v)?)))
            .collect()
    }

    fn zero() -> Self { BTreeMap::new() }
}

impl<T: TsonRep> TsonRep for Box<T> {
    fn shape() -> Shape { T::shape() }

    fn to_tson(&self) -> Tson { T::to_tson(self) }

    fn into_tson(self) -> Tson { T::into_tson(*self) }

    fn from_tson(ks: Tson) -> Option<Self> { T::from_tson(ks).map(Box::new) }

    fn zero() -> Self { Box::new(T::zero()) }
}

/// `None` is written as `T`'s zero value, and a zero value reads back as `None`.
///
/// As a record field this is omitted entirely, which makes `Option` the natural way to
/// declare an optional field.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// assert_eq!(Option::<u32>::from_tson(Tson::U32(0)), Some(None));
/// assert_eq!(Option::<u32>::from_tson(Tson::U32(5)), Some(Some(5)));
/// assert!(None::<u32>.to_tson().is_zero());
/// ```
impl<T: TsonRep> TsonRep for Option<T> {
    fn shape() -> Shape { T::shape() }

    fn to_tson(&self) -> Tson {
        match self {
            Some(t) => t.to_tson(),
            None => T::zero().into_tson(),
        }
    }

    fn into_tson(self) -> Tson {
        match self {
            Some(t) => t.into_tson(),
            None => T::zero().into_tson(),
        }
    }

    fn from_tson(ks: Tson) -> Option<Self> {
        if ks.is_zero() {
            Some(None)
        } else {
            T::from_tson(ks).map(Some)
        }
    }

    fn zero() -> Self { None }
}

/// Removes field `name` from `record` as a `T`.
///
/// A missing field, or one that does not represent a `T`, yields `T`'s zero value. This is
/// what derived [`TsonRep::from_tson`] implementations use for each field.
///
/// # Example
///
/// ```
/// use tson::{prelude::*, rep::take_field};
///
/// let mut record = Record::new("Foo").with("bar", 7i32).with("baz", "oops");
///
/// let bar: i32 = take_field(&mut record, "bar");
/// let baz: i32 = take_field(&mut record, "baz");
/// let qux: i32 = take_field(&mut record, "qux");
///
/// assert_eq!((bar, baz, qux), (7, 0, 0));
/// ```
pub fn take_field<T: TsonRep>(record: &mut Record, name: &str) -> T {
    record
        .take(name)
        .and_then(T::from_tson)
        .unwrap_or_else(T::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(i64::from_tson(7i64.to_tson()), Some(7));
        assert_eq!(i64::from_tson(7i32.to_tson()), None);
        assert_eq!(f32::shape(), Shape::F32);
        assert_eq!(usize::zero(), 0);
    }

    #[test]
    fn strings_need_utf8() {
        assert_eq!(String::from_tson(Tson::from_static(b"ok")), Some("ok".to_string()));
        assert_eq!(String::from_tson(Tson::from_static(&[0xff, 0xfe])), None);
        assert_eq!(
            Bytes::from_tson(Tson::from_static(&[0xff])),
            Some(Bytes::from_static(&[0xff]))
        );
    }

    #[test]
    fn empty_vec_keeps_element_shape() {
        let empty: Vec<Vec<u16>> = vec![];
        assert_eq!(
            empty.to_tson(),
            Tson::Seq(Shape::seq(Shape::U16), vec![])
        );
    }

    #[test]
    fn fixed_arrays() {
        let arr = [[1i32, 2], [3, 4]];
        let ks = arr.to_tson();
        assert_eq!(ks.shape(), Shape::array(Shape::array(Shape::I32)));
        assert_eq!(<[[i32; 2]; 2]>::from_tson(ks.clone()), Some(arr));
        assert_eq!(<[[i32; 2]; 3]>::from_tson(ks), None);
        assert_eq!(<[u8; 3]>::zero(), [0, 0, 0]);
    }

    #[test]
    fn maps() {
        let mut m = HashMap::new();
        m.insert("a".to_string(), vec![1u8]);
        let back: HashMap<String, Vec<u8>> = HashMap::from_tson(m.to_tson()).unwrap();
        assert_eq!(back, m);

        let mut b = BTreeMap::new();
        b.insert(3u16, true);
        b.insert(1u16, false);
        let ks = b.clone().into_tson();
        assert_eq!(
            ks.clone().into_pairs().unwrap()[0],
            (Tson::U16(1), Tson::Bool(false))
        );
        assert_eq!(BTreeMap::from_tson(ks), Some(b));
    }

    #[test]
    fn options_are_zero_when_absent() {
        assert_eq!(None::<String>.to_tson(), Tson::from(""));
        assert_eq!(Option::<String>::from_tson(Tson::from("")), Some(None));
        assert_eq!(
            Option::<String>::from_tson(Tson::from("x")),
            Some(Some("x".to_string()))
        );
        assert_eq!(Option::<String>::from_tson(Tson::from(1u8)), None);
    }
}
