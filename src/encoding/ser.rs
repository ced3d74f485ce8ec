use super::*;

#[derive(Debug)]
/// Writes [`Tson`] values in their binary representation.
///
/// An encoder owns its output buffer and borrows the registry it resolves record names
/// against; it is used for exactly one top-level value, after which [`Encoder::finalize`]
/// hands back the bytes.
pub struct Encoder<'a> {
    out: ByteBuffer,
    registry: &'a Registry,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder resolving records against `registry`.
    pub fn new(registry: &'a Registry) -> Self { Self::with_capacity(registry, 0) }

    /// Creates an encoder whose buffer starts with room for `cap` bytes.
    pub fn with_capacity(registry: &'a Registry, cap: usize) -> Self {
        Encoder {
            out: ByteBuffer::with_capacity(cap),
            registry,
        }
    }

    /// Returns the output.
    pub fn finalize(self) -> Bytes { self.out.into_bytes() }

    /// Writes `ks` with a header: its tag, then its payload.
    ///
    /// # Errors
    ///
    /// * [`Error::UnregisteredType`] if `ks` or anything in it is a record the registry does
    ///   not know.
    /// * [`Error::UnknownField`] if a record holds a field its registered layout lacks.
    /// * [`Error::ElementMismatch`] if a container element does not have the container's
    ///   declared element shape.
    /// * [`Error::LengthExceeded`] if a count or string length does not fit in a `u16`.
    pub fn put(&mut self, ks: &Tson) -> Result<()> {
        let tag = ks.shape().tag(self.registry)?;
        self.out.write_u16(tag);
        self.put_body(ks, true)
    }

    fn put_body(&mut self, ks: &Tson, outer: bool) -> Result<()> {
        match ks {
            Bool(b) => self.out.write_bool(*b),
            Isize(i) => self.put_isize(*i),
            I8(i) => self.out.write_i8(*i),
            I16(i) => self.out.write_i16(*i),
            I32(i) => self.out.write_i32(*i),
            I64(i) => self.out.write_i64(*i),
            Usize(u) => self.put_usize(*u),
            U8(u) => self.out.write_u8(*u),
            U16(u) => self.out.write_u16(*u),
            U32(u) => self.out.write_u32(*u),
            U64(u) => self.out.write_u64(*u),
            F32(f) => self.out.write_f32(*f),
            F64(f) => self.out.write_f64(*f),
            Str(bs) => {
                self.put_len(bs.len())?;
                self.out.write_bytes(bs);
            }
            Array(elem, items) | Seq(elem, items) => {
                self.put_len(items.len())?;
                if outer {
                    self.put_tag_list(elem)?;
                }
                for item in items {
                    check_elem(elem, item)?;
                    self.put_body(item, false)?;
                }
            }
            Map(key, val, pairs) => {
                self.put_len(pairs.len())?;
                if outer {
                    self.put_tag_list(key)?;
                    self.put_tag_list(val)?;
                }
                for (k, v) in pairs {
                    check_elem(key, k)?;
                    check_elem(val, v)?;
                    self.put_body(k, false)?;
                    self.put_body(v, false)?;
                }
            }
            Record(r) => self.put_record(r)?,
        }
        Ok(())
    }

    fn put_isize(&mut self, i: isize) {
        self.out.write_u8(PLATFORM_WIDTH);
        match PLATFORM_WIDTH {
            2 => self.out.write_i16(i as i16),
            4 => self.out.write_i32(i as i32),
            _ => self.out.write_i64(i as i64),
        }
    }

    fn put_usize(&mut self, u: usize) {
        self.out.write_u8(PLATFORM_WIDTH);
        match PLATFORM_WIDTH {
            2 => self.out.write_u16(u as u16),
            4 => self.out.write_u32(u as u32),
            _ => self.out.write_u64(u as u64),
        }
    }

    fn put_len(&mut self, len: usize) -> Result<()> {
        if len > MAX_LEN {
            return Err(Error::LengthExceeded(len, MAX_LEN));
        }
        self.out.write_u16(len as u16);
        Ok(())
    }

    fn put_tag_list(&mut self, shape: &Shape) -> Result<()> {
        let tags = shape.tags(self.registry)?;
        self.put_len(tags.len())?;
        for tag in tags {
            self.out.write_u16(tag);
        }
        Ok(())
    }

    fn put_record(&mut self, r: &crate::Record) -> Result<()> {
        let (_, desc) = self.registry.record_by_name(&r.name)?;

        let count_at = self.out.position();
        self.out.write_u16(0);

        let mut count = 0;
        for (name, value) in &r.fields {
            let field = desc.field(name).ok_or_else(|| Error::UnknownField {
                record: r.name.clone(),
                field: name.clone(),
            })?;
            if value.is_zero() {
                continue;
            }
            self.out.write_u32(field.hash);
            self.put(value)?;
            count += 1;
        }

        let end = self.out.position();
        self.out.set_position(count_at);
        self.put_len(count)?;
        self.out.set_position(end);
        Ok(())
    }
}

fn check_elem(elem: &Shape, item: &Tson) -> Result<()> {
    if elem.conforms(item) {
        Ok(())
    } else {
        Err(Error::ElementMismatch {
            expected: elem.to_string(),
            found: item.shape().to_string(),
        })
    }
}
