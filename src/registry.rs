//! The type registry.
//!
//! A [`Registry`] maps wire [`TypeId`]s to type descriptors and back. Built-in kinds occupy
//! ids `1..=17` and are installed by [`Registry::new`]; records are added with
//! [`Registry::register`] (for types deriving `TsonRep`) or [`Registry::register_record`]
//! (for layouts described at runtime).
//!
//! Registration happens once, before any encoding or decoding; afterwards the registry is
//! only read, so a single instance can be shared by reference across threads. Independent
//! registries may coexist, which is how a producer and a consumer with different record
//! layouts are modelled.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_record("Foo", 50, vec![FieldDecl::new("Bar", Shape::I32)])
//!     .unwrap();
//!
//! assert_eq!(registry.resolve_by_name("Foo").unwrap(), 50);
//! assert_eq!(
//!     registry.field_name(50, tson::util::field_hash("Bar")),
//!     Some("Bar")
//! );
//! ```

use crate::{
    encoding::constants::*,
    errors::{Error, Result},
    rep::TsonRecord,
    shape::Shape,
    util::field_hash,
};
use hashbrown::HashMap;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A field as declared by a record type.
pub struct FieldDecl {
    /// Wire name, the input to the field hash.
    pub name: String,
    /// Declared type of the field.
    pub shape: Shape,
}

impl FieldDecl {
    /// Declares a field.
    pub fn new<S: Into<String>>(name: S, shape: Shape) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            shape,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A registered field: its declaration plus its name hash.
pub struct FieldDescriptor {
    pub name: String,
    pub shape: Shape,
    pub hash: u32,
}

#[derive(Clone, Debug)]
/// The layout of a registered record.
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    by_hash: HashMap<u32, usize>,
}

impl RecordDescriptor {
    fn new(name: String, decls: Vec<FieldDecl>) -> Result<RecordDescriptor> {
        let mut by_hash = HashMap::with_capacity(decls.len());
        let mut fields = Vec::with_capacity(decls.len());

        for (ix, FieldDecl { name: field, shape }) in decls.into_iter().enumerate() {
            let hash = field_hash(&field);
            if let Some(&prev) = by_hash.get(&hash) {
                let first: &FieldDescriptor = &fields[prev];
                return Err(Error::FieldHashCollision {
                    record: name,
                    first: first.name.clone(),
                    second: field,
                    hash,
                });
            }
            by_hash.insert(hash, ix);
            fields.push(FieldDescriptor {
                name: field,
                shape,
                hash,
            });
        }

        Ok(RecordDescriptor {
            name,
            fields,
            by_hash,
        })
    }

    /// Looks up a field by its name hash.
    pub fn field_by_hash(&self, hash: u32) -> Option<&FieldDescriptor> {
        self.by_hash.get(&hash).map(|&ix| &self.fields[ix])
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_by_hash(field_hash(name))
            .filter(|field| field.name == name)
    }

    fn same_layout(&self, decls: &[FieldDecl]) -> bool {
        self.fields.len() == decls.len()
            && self
                .fields
                .iter()
                .zip(decls)
                .all(|(have, want)| have.name == want.name && have.shape == want.shape)
    }
}

#[derive(Clone, Debug)]
/// The structural kind of a registered type.
pub enum Kind {
    /// A fixed-width scalar.
    Scalar(Shape),
    Str,
    Array,
    Seq,
    Map,
    Record(RecordDescriptor),
}

#[derive(Clone, Debug)]
/// A registry entry.
pub struct TypeDescriptor {
    pub id: TypeId,
    pub kind: Kind,
}

impl TypeDescriptor {
    /// Human readable name of the type.
    pub fn name(&self) -> String {
        match &self.kind {
            Kind::Scalar(shape) => shape.to_string(),
            Kind::Str => "str".to_string(),
            Kind::Array => "array".to_string(),
            Kind::Seq => "seq".to_string(),
            Kind::Map => "map".to_string(),
            Kind::Record(desc) => desc.name.clone(),
        }
    }
}

#[derive(Clone, Debug)]
/// Bidirectional mapping between types and wire ids.
pub struct Registry {
    by_id: HashMap<TypeId, TypeDescriptor>,
    by_name: HashMap<String, TypeId>,
}

impl Default for Registry {
    fn default() -> Self { Self::new() }
}

impl Registry {
    /// Creates a registry holding only the built-in types.
    pub fn new() -> Registry {
        let mut by_id = HashMap::new();

        for tag in TAG_BOOL..=TAG_F64 {
            if let Some(shape) = Shape::leaf(tag) {
                by_id.insert(tag, TypeDescriptor {
                    id: tag,
                    kind: Kind::Scalar(shape),
                });
            }
        }
        for (tag, kind) in vec![
            (TAG_ARRAY, Kind::Array),
            (TAG_MAP, Kind::Map),
            (TAG_SEQ, Kind::Seq),
            (TAG_STRING, Kind::Str),
        ] {
            by_id.insert(tag, TypeDescriptor { id: tag, kind });
        }

        Registry {
            by_id,
            by_name: HashMap::new(),
        }
    }

    /// Registers the record type `T` under `id`.
    ///
    /// # Example
    ///
    /// ```
    /// use tson::prelude::*;
    ///
    /// #[derive(TsonRep, Clone, Debug, PartialEq)]
    /// struct Foo {
    ///     bar: i32,
    /// }
    ///
    /// let mut registry = Registry::new();
    /// registry.register::<Foo>(50).unwrap();
    ///
    /// // registering again under the same id is harmless
    /// registry.register::<Foo>(50).unwrap();
    ///
    /// // but not under another one
    /// assert!(registry.register::<Foo>(51).is_err());
    /// ```
    pub fn register<T: TsonRecord>(&mut self, id: TypeId) -> Result<()> {
        self.register_record(T::NAME, id, T::fields())
    }

    /// Registers a record layout under `id`.
    ///
    /// # Arguments
    ///
    /// * `name` - The record's type name, used to resolve it when encoding.
    /// * `id` - The wire id, must be above the built-in range.
    /// * `fields` - Every field that participates in serialization, in declaration order.
    ///
    /// # Errors
    ///
    /// * [`Error::ReservedTypeId`] if `id` belongs to a built-in.
    /// * [`Error::DuplicateTypeId`] if `id` already names a different record.
    /// * [`Error::AlreadyRegistered`] if `name` is already registered under another id.
    /// * [`Error::FieldHashCollision`] if two fields hash to the same value.
    pub fn register_record<S: Into<String>>(
        &mut self,
        name: S,
        id: TypeId,
        fields: Vec<FieldDecl>,
    ) -> Result<()> {
        let name = name.into();

        if id <= MAX_BUILTIN_ID {
            return Err(Error::ReservedTypeId(id));
        }

        if let Some(existing) = self.by_id.get(&id) {
            return match &existing.kind {
                Kind::Record(desc) if desc.name == name && desc.same_layout(&fields) => Ok(()),
                _ => Err(Error::DuplicateTypeId {
                    id,
                    existing: existing.name(),
                    name,
                }),
            };
        }

        if let Some(&existing) = self.by_name.get(&name) {
            return Err(Error::AlreadyRegistered { name, existing, id });
        }

        let desc = RecordDescriptor::new(name.clone(), fields)?;
        debug!(record = %name, id, fields = desc.fields.len(), "registered record");

        self.by_name.insert(name, id);
        self.by_id.insert(id, TypeDescriptor {
            id,
            kind: Kind::Record(desc),
        });
        Ok(())
    }

    /// Resolves a record name to its id, for writing headers.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnregisteredType`] if the record was never registered.
    pub fn resolve_by_name(&self, name: &str) -> Result<TypeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnregisteredType(name.to_string()))
    }

    /// Resolves an id to its descriptor, for reading headers.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownTypeId`] if nothing is registered under `id`.
    pub fn resolve_by_id(&self, id: TypeId) -> Result<&TypeDescriptor> {
        self.by_id.get(&id).ok_or(Error::UnknownTypeId(id))
    }

    /// The record registered under `id`.
    pub fn record(&self, id: TypeId) -> Result<&RecordDescriptor> {
        match &self.resolve_by_id(id)?.kind {
            Kind::Record(desc) => Ok(desc),
            _ => Err(Error::UnknownTypeId(id)),
        }
    }

    /// The id and layout of the record registered as `name`.
    pub fn record_by_name(&self, name: &str) -> Result<(TypeId, &RecordDescriptor)> {
        let id = self.resolve_by_name(name)?;
        Ok((id, self.record(id)?))
    }

    /// Maps a field hash of record `id` back to the field's name.
    ///
    /// Returns `None` for unknown records and unknown hashes alike; an unknown field is a
    /// normal outcome when the producer's layout differs from ours.
    pub fn field_name(&self, id: TypeId, hash: u32) -> Option<&str> {
        self.record(id)
            .ok()?
            .field_by_hash(hash)
            .map(|field| field.name.as_str())
    }

    /// The hash of field `name` of record `id`.
    pub fn field_hash(&self, id: TypeId, name: &str) -> Option<u32> {
        self.record(id).ok()?.field(name).map(|field| field.hash)
    }
}
