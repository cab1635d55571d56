//! Composite nodes: records, arrays, byte blocks and alignment.

use std::marker::PhantomData;

use super::context::Context;
use super::format::padding_for;
use super::node::{Node, U16, U32};
use super::reader::Reader;
use super::writer::Writer;
use crate::util::{Error, Result};

/// A struct-like type with an ordered field layout.
///
/// Implementors decode/encode their fields in order, recording in `scope`
/// any value a later field depends on.
pub trait Record: Sized {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self>;

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()>;
}

/// Node for a [`Record`]; pushes a fresh scope for the record's fields.
pub struct Struct<T>(PhantomData<fn() -> T>);

impl<T> Struct<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Clone for Struct<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Struct<T> {}

impl<T> Default for Struct<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Node for Struct<T> {
    type Value = T;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<T> {
        let mut scope = ctx.record();
        T::decode_fields(r, &mut scope).map_err(|e| scope.attach(e))
    }

    fn encode(&self, value: &T, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        let mut scope = ctx.record();
        value.encode_fields(w, &mut scope).map_err(|e| scope.attach(e))
    }
}

/// Array whose element count comes from an already decoded field.
#[derive(Clone, Copy, Debug)]
pub struct FixedArray<N> {
    count: usize,
    element: N,
}

impl<N> FixedArray<N> {
    pub const fn new(count: usize, element: N) -> Self {
        Self { count, element }
    }
}

impl<N: Node> Node for FixedArray<N> {
    type Value = Vec<N::Value>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Vec<N::Value>> {
        // Every element takes at least one byte, so the remaining size bounds the count.
        let mut items = Vec::with_capacity(self.count.min(r.remaining()));
        for i in 0..self.count {
            let scope = ctx.element(i);
            items.push(self.element.decode(r, &scope).map_err(|e| scope.attach(e))?);
        }
        Ok(items)
    }

    fn encode(&self, value: &Vec<N::Value>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        if value.len() != self.count {
            return Err(Error::CountMismatch { expected: self.count, actual: value.len() });
        }
        encode_elements(&self.element, value, w, ctx)
    }
}

fn encode_elements<N: Node>(element: &N, items: &[N::Value], w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        let scope = ctx.element(i);
        element.encode(item, w, &scope).map_err(|e| scope.attach(e))?;
    }
    Ok(())
}

/// Integer node usable as an element-count prefix.
pub trait LengthPrefix: Node {
    fn to_count(value: &Self::Value) -> usize;

    fn from_count(count: usize) -> Result<Self::Value>;
}

impl LengthPrefix for U16 {
    fn to_count(value: &u16) -> usize {
        *value as usize
    }

    fn from_count(count: usize) -> Result<u16> {
        u16::try_from(count).map_err(|_| Error::ValueOutOfRange { value: count as u64, width: 2 })
    }
}

impl LengthPrefix for U32 {
    fn to_count(value: &u32) -> usize {
        *value as usize
    }

    fn from_count(count: usize) -> Result<u32> {
        u32::try_from(count).map_err(|_| Error::ValueOutOfRange { value: count as u64, width: 4 })
    }
}

/// Array preceded by its element count.
///
/// The prefix is rebuilt from the element list on encode.
#[derive(Clone, Copy, Debug)]
pub struct PrefixedArray<P, N> {
    prefix: P,
    element: N,
}

impl<P, N> PrefixedArray<P, N> {
    pub const fn new(prefix: P, element: N) -> Self {
        Self { prefix, element }
    }
}

impl<P: LengthPrefix, N: Node> Node for PrefixedArray<P, N> {
    type Value = Vec<N::Value>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Vec<N::Value>> {
        let count = P::to_count(&self.prefix.decode(r, ctx)?);
        FixedArray::new(count, &self.element).decode(r, ctx)
    }

    fn encode(&self, value: &Vec<N::Value>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        self.prefix.encode(&P::from_count(value.len())?, w, ctx)?;
        encode_elements(&self.element, value, w, ctx)
    }
}

impl<N: Node> Node for &N {
    type Value = N::Value;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<N::Value> {
        (**self).decode(r, ctx)
    }

    fn encode(&self, value: &N::Value, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        (**self).encode(value, w, ctx)
    }
}

/// Elements repeated until the enclosing window runs out.
///
/// An element that hits the end of the window is discarded and the cursor
/// restored to where it started; any other error propagates.
#[derive(Clone, Copy, Debug)]
pub struct Greedy<N> {
    element: N,
}

impl<N> Greedy<N> {
    pub const fn new(element: N) -> Self {
        Self { element }
    }
}

impl<N: Node> Node for Greedy<N> {
    type Value = Vec<N::Value>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Vec<N::Value>> {
        let mut items = Vec::new();
        while !r.is_exhausted() {
            let checkpoint = r.pos();
            let scope = ctx.element(items.len());
            match self.element.decode(r, &scope) {
                Ok(item) => items.push(item),
                Err(e) if matches!(e.root_cause(), Error::UnexpectedEof { .. }) => {
                    tracing::trace!("greedy array stops at {} elements, offset {:#x}", items.len(), r.offset());
                    r.rewind(checkpoint);
                    break;
                }
                Err(e) => return Err(scope.attach(e)),
            }
        }
        Ok(items)
    }

    fn encode(&self, value: &Vec<N::Value>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        encode_elements(&self.element, value, w, ctx)
    }
}

/// Inner node padded with zero bytes to a multiple of `boundary`,
/// measured from where the inner node starts.
#[derive(Clone, Copy, Debug)]
pub struct Aligned<N> {
    boundary: usize,
    inner: N,
}

impl<N> Aligned<N> {
    pub const fn new(boundary: usize, inner: N) -> Self {
        Self { boundary, inner }
    }
}

impl<N: Node> Node for Aligned<N> {
    type Value = N::Value;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<N::Value> {
        let start = r.pos();
        let value = self.inner.decode(r, ctx)?;
        let offset = r.offset();
        let padding = r.read_bytes(padding_for(r.pos() - start, self.boundary))?;
        ctx.root().options().check_padding(offset, padding)?;
        Ok(value)
    }

    fn encode(&self, value: &N::Value, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        let start = w.pos();
        self.inner.encode(value, w, ctx)?;
        w.write_zeros(padding_for(w.pos() - start, self.boundary))
    }
}

/// Opaque byte block of a known size.
#[derive(Clone, Copy, Debug)]
pub struct Bytes {
    len: usize,
}

impl Bytes {
    pub const fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Node for Bytes {
    type Value = Vec<u8>;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<Vec<u8>> {
        Ok(r.read_bytes(self.len)?.to_vec())
    }

    fn encode(&self, value: &Vec<u8>, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        if value.len() != self.len {
            return Err(Error::CountMismatch { expected: self.len, actual: value.len() });
        }
        w.write_bytes(value)
    }
}
