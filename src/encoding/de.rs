use super::*;
use crate::{coerce::coerce, registry::RecordDescriptor, shape::TagList};
use tracing::{debug, trace};

#[derive(Debug)]
/// Reads [`Tson`] values from their binary representation.
///
/// The decoder walks the input once. Headers are resolved against the registry; container
/// payloads are read according to the shape rebuilt from their nested-tag list, so elements
/// below the outermost container carry no tags of their own.
pub struct Decoder<'a, 'b> {
    buf: ByteBuffer<&'b [u8]>,
    registry: &'a Registry,
    config: Config,
    depth: usize,
}

impl<'a, 'b> Decoder<'a, 'b> {
    /// Creates a decoder over `data`.
    pub fn new(data: &'b [u8], registry: &'a Registry, config: Config) -> Self {
        Decoder {
            buf: ByteBuffer::wrap(data),
            registry,
            config,
            depth: 0,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize { self.buf.remaining() }

    /// Reads one value with a header.
    ///
    /// Returns `None` when the header is the inline tag, which marks an absent value.
    ///
    /// # Errors
    ///
    /// * [`Error::TruncatedInput`] if the input ends inside the value.
    /// * [`Error::UnknownTypeId`] if a header or nested-tag list names an unregistered id.
    /// * [`Error::InvalidWidth`] for a platform-width integer with a bad width selector.
    /// * [`Error::InvalidShape`] for a malformed nested-tag list.
    /// * [`Error::DepthExceeded`] if values nest deeper than [`Config::max_depth`].
    pub fn read_value(&mut self) -> Result<Option<Tson>> {
        let tag = self.buf.read_u16()?;
        match tag {
            TAG_INLINE => Ok(None),
            TAG_ARRAY | TAG_SEQ => {
                self.enter()?;
                let count = self.buf.read_u16()?;
                let elem = self.read_shape()?;
                let items = self.read_items(&elem, count)?;
                self.leave();
                Ok(Some(if tag == TAG_ARRAY {
                    Array(elem, items)
                } else {
                    Seq(elem, items)
                }))
            }
            TAG_MAP => {
                self.enter()?;
                let count = self.buf.read_u16()?;
                let key = self.read_shape()?;
                let val = self.read_shape()?;
                let pairs = self.read_pairs(&key, &val, count)?;
                self.leave();
                Ok(Some(Map(key, val, pairs)))
            }
            tag => match Shape::leaf(tag) {
                Some(shape) => self.read_body(&shape).map(Some),
                None => {
                    let registry = self.registry;
                    let desc = registry.record(tag)?;
                    self.read_record(desc).map(Some)
                }
            },
        }
    }

    /// Reads a header-less value of a known shape.
    fn read_body(&mut self, shape: &Shape) -> Result<Tson> {
        let ks = match shape {
            Shape::Bool => Bool(self.buf.read_bool()?),
            Shape::Isize => Isize(self.read_isize()?),
            Shape::I8 => I8(self.buf.read_i8()?),
            Shape::I16 => I16(self.buf.read_i16()?),
            Shape::I32 => I32(self.buf.read_i32()?),
            Shape::I64 => I64(self.buf.read_i64()?),
            Shape::Usize => Usize(self.read_usize()?),
            Shape::U8 => U8(self.buf.read_u8()?),
            Shape::U16 => U16(self.buf.read_u16()?),
            Shape::U32 => U32(self.buf.read_u32()?),
            Shape::U64 => U64(self.buf.read_u64()?),
            Shape::F32 => F32(self.buf.read_f32()?),
            Shape::F64 => F64(self.buf.read_f64()?),
            Shape::Str => {
                let len = self.buf.read_u16()? as usize;
                Str(Bytes::copy_from_slice(self.buf.read_bytes(len)?))
            }
            Shape::Array(elem) | Shape::Seq(elem) => {
                self.enter()?;
                let count = self.buf.read_u16()?;
                let items = self.read_items(elem, count)?;
                self.leave();
                if let Shape::Array(_) = shape {
                    Array((**elem).clone(), items)
                } else {
                    Seq((**elem).clone(), items)
                }
            }
            Shape::Map(key, val) => {
                self.enter()?;
                let count = self.buf.read_u16()?;
                let pairs = self.read_pairs(key, val, count)?;
                self.leave();
                Map((**key).clone(), (**val).clone(), pairs)
            }
            Shape::Record(name) => {
                let registry = self.registry;
                let (_, desc) = registry.record_by_name(name)?;
                self.read_record(desc)?
            }
        };
        Ok(ks)
    }

    fn read_items(&mut self, elem: &Shape, count: u16) -> Result<Vec<Tson>> {
        let mut items = Vec::with_capacity(self.capacity_for(count));
        for _ in 0..count {
            items.push(self.read_body(elem)?);
        }
        Ok(items)
    }

    fn read_pairs(&mut self, key: &Shape, val: &Shape, count: u16) -> Result<Vec<(Tson, Tson)>> {
        let mut pairs = Vec::with_capacity(self.capacity_for(count));
        for _ in 0..count {
            let k = self.read_body(key)?;
            let v = self.read_body(val)?;
            pairs.push((k, v));
        }
        Ok(pairs)
    }

    // every element takes at least one byte
    fn capacity_for(&self, count: u16) -> usize { (count as usize).min(self.buf.remaining()) }

    fn read_record(&mut self, desc: &'a RecordDescriptor) -> Result<Tson> {
        self.enter()?;
        let count = self.buf.read_u16()?;
        let mut record = crate::Record::new(desc.name.as_str());

        for _ in 0..count {
            let hash = self.buf.read_u32()?;
            // decoded even when unknown, so the cursor stays aligned
            let value = self.read_value()?;

            let field = match desc.field_by_hash(hash) {
                Some(field) => field,
                None => {
                    trace!(record = %desc.name, hash, "skipped unknown field");
                    continue;
                }
            };

            if let Some(value) = value {
                match coerce(value, &field.shape) {
                    Some(value) => {
                        record.insert(field.name.as_str(), value);
                    }
                    None => debug!(
                        record = %desc.name,
                        field = %field.name,
                        expected = %field.shape,
                        "dropped incompatible field"
                    ),
                }
            }
        }

        self.leave();
        Ok(Record(record))
    }

    fn read_shape(&mut self) -> Result<Shape> {
        let len = self.buf.read_u16()?;
        let mut tags = TagList::new();
        for _ in 0..len {
            tags.push(self.buf.read_u16()?);
        }
        let max_depth = self.config.max_depth;
        Shape::from_tags(&tags, self.registry, max_depth.saturating_sub(self.depth)).map_err(
            |e| match e {
                Error::DepthExceeded(_) => Error::DepthExceeded(max_depth),
                e => e,
            },
        )
    }

    fn read_isize(&mut self) -> Result<isize> {
        let width = self.buf.read_u8()?;
        let wide = match width {
            1 => self.buf.read_i8()? as i64,
            2 => self.buf.read_i16()? as i64,
            4 => self.buf.read_i32()? as i64,
            8 => self.buf.read_i64()?,
            w => return Err(Error::InvalidWidth(w)),
        };
        isize::try_from(wide).map_err(|_| Error::InvalidWidth(width))
    }

    fn read_usize(&mut self) -> Result<usize> {
        let width = self.buf.read_u8()?;
        let wide = match width {
            1 => self.buf.read_u8()? as u64,
            2 => self.buf.read_u16()? as u64,
            4 => self.buf.read_u32()? as u64,
            8 => self.buf.read_u64()?,
            w => return Err(Error::InvalidWidth(w)),
        };
        usize::try_from(wide).map_err(|_| Error::InvalidWidth(width))
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) { self.depth -= 1; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldDecl;

    fn decode_one(data: &[u8], reg: &Registry) -> Result<Option<Tson>> {
        Decoder::new(data, reg, Config::default()).read_value()
    }

    #[test]
    fn inline_tag_is_absent() {
        let reg = Registry::new();
        assert_eq!(decode_one(&[0, 0], &reg), Ok(None));
    }

    #[test]
    fn narrow_platform_ints() {
        let reg = Registry::new();
        assert_eq!(decode_one(&[2, 0, 1, 0xff], &reg), Ok(Some(Isize(-1))));
        assert_eq!(
            decode_one(&[7, 0, 2, 0x34, 0x12], &reg),
            Ok(Some(Usize(0x1234)))
        );
        assert_eq!(decode_one(&[7, 0, 3, 0, 0, 0], &reg), Err(Error::InvalidWidth(3)));
    }

    #[test]
    fn empty_nested_container_keeps_shape() {
        let reg = Registry::new();
        #[rustfmt::skip]
        let data = [
            14, 0,              // array
            0, 0,               // count
            2, 0, 16, 0, 3, 0,  // tag list: seq, i8
        ];
        assert_eq!(
            decode_one(&data, &reg),
            Ok(Some(Tson::array(Shape::seq(Shape::I8), vec![])))
        );
    }

    #[test]
    fn unknown_field_skipped_in_place() {
        let mut reg = Registry::new();
        reg.register_record("Foo", 50, vec![FieldDecl::new("b", Shape::U8)])
            .unwrap();

        let mut data = vec![50, 0, 2, 0];
        // field "a", unknown here: a string
        data.extend_from_slice(&crate::util::field_hash("a").to_le_bytes());
        data.extend_from_slice(&[17, 0, 3, 0, b'x', b'y', b'z']);
        // field "b"
        data.extend_from_slice(&crate::util::field_hash("b").to_le_bytes());
        data.extend_from_slice(&[8, 0, 9]);

        let ks = decode_one(&data, &reg).unwrap().unwrap();
        assert_eq!(ks, Tson::from(crate::Record::new("Foo").with("b", 9u8)));
    }

    #[test]
    fn incompatible_field_dropped() {
        let mut reg = Registry::new();
        reg.register_record("Foo", 50, vec![FieldDecl::new("b", Shape::U8)])
            .unwrap();

        let mut data = vec![50, 0, 1, 0];
        data.extend_from_slice(&crate::util::field_hash("b").to_le_bytes());
        data.extend_from_slice(&[1, 0, 1]);

        let r = decode_one(&data, &reg).unwrap().unwrap().into_record().unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn depth_limit() {
        let reg = Registry::new();
        #[rustfmt::skip]
        let data = [
            16, 0, 1, 0,
            3, 0, 16, 0, 16, 0, 8, 0,
            1, 0,
            1, 0, 5,
        ];
        let config = |max_depth| Config { max_depth };

        assert!(Decoder::new(&data, &reg, config(3)).read_value().is_ok());
        assert_eq!(
            Decoder::new(&data, &reg, config(2)).read_value(),
            Err(Error::DepthExceeded(2))
        );
    }

    #[test]
    fn truncated() {
        let reg = Registry::new();
        assert_eq!(
            decode_one(&[5, 0, 1, 2], &reg),
            Err(Error::TruncatedInput {
                needed: 4,
                remaining: 2
            })
        );
        assert!(matches!(
            decode_one(&[17, 0, 9, 0, b'a'], &reg),
            Err(Error::TruncatedInput { .. })
        ));
    }
}
