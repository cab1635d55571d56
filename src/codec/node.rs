//! Schema nodes and the primitive field codecs.
//!
//! A node is an immutable description of part of the binary layout. It holds
//! no decoded data: `decode` produces a value from a reader, `encode` writes a
//! value back, and both consult the [`Context`] for anything that depends on
//! previously decoded fields.

use half::f16;

use super::context::Context;
use super::reader::Reader;
use super::writer::Writer;
use crate::model::AssetId;
use crate::util::{AABox, Result, Vec2, Vec3, Vec4};

/// A bidirectional codec for one schema element.
pub trait Node {
    /// In-memory representation.
    type Value;

    /// Read a value at the reader's cursor.
    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Self::Value>;

    /// Write a value at the writer's position.
    fn encode(&self, value: &Self::Value, w: &mut Writer, ctx: &Context<'_>) -> Result<()>;
}

/// Unsigned byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct U8;

/// Big-endian u16.
#[derive(Clone, Copy, Debug, Default)]
pub struct U16;

/// Big-endian u32.
#[derive(Clone, Copy, Debug, Default)]
pub struct U32;

/// Big-endian IEEE half float.
#[derive(Clone, Copy, Debug, Default)]
pub struct F16;

/// Big-endian IEEE single float.
#[derive(Clone, Copy, Debug, Default)]
pub struct F32;

impl Node for U8 {
    type Value = u8;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<u8> {
        r.read_u8()
    }

    fn encode(&self, value: &u8, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_u8(*value)
    }
}

impl Node for U16 {
    type Value = u16;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<u16> {
        r.read_u16()
    }

    fn encode(&self, value: &u16, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_u16(*value)
    }
}

impl Node for U32 {
    type Value = u32;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<u32> {
        r.read_u32()
    }

    fn encode(&self, value: &u32, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_u32(*value)
    }
}

impl Node for F16 {
    type Value = f16;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<f16> {
        r.read_f16()
    }

    fn encode(&self, value: &f16, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f16(*value)
    }
}

impl Node for F32 {
    type Value = f32;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<f32> {
        r.read_f32()
    }

    fn encode(&self, value: &f32, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f32(*value)
    }
}

/// Two f32 components.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vector2;

/// Three f32 components.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vector3;

/// Four f32 components (RGBA color).
#[derive(Clone, Copy, Debug, Default)]
pub struct Color4;

/// Two half-float components.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalfVector2;

/// Min/max corners as six f32s.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBox;

/// 32-bit asset reference.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetId32;

impl Node for Vector2 {
    type Value = Vec2;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<Vec2> {
        Ok(Vec2::new(r.read_f32()?, r.read_f32()?))
    }

    fn encode(&self, value: &Vec2, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f32(value.x)?;
        w.write_f32(value.y)
    }
}

impl Node for Vector3 {
    type Value = Vec3;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<Vec3> {
        Ok(Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
    }

    fn encode(&self, value: &Vec3, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f32(value.x)?;
        w.write_f32(value.y)?;
        w.write_f32(value.z)
    }
}

impl Node for Color4 {
    type Value = Vec4;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<Vec4> {
        Ok(Vec4::new(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?))
    }

    fn encode(&self, value: &Vec4, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f32(value.x)?;
        w.write_f32(value.y)?;
        w.write_f32(value.z)?;
        w.write_f32(value.w)
    }
}

impl Node for HalfVector2 {
    type Value = [f16; 2];

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<[f16; 2]> {
        Ok([r.read_f16()?, r.read_f16()?])
    }

    fn encode(&self, value: &[f16; 2], w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_f16(value[0])?;
        w.write_f16(value[1])
    }
}

impl Node for BoundingBox {
    type Value = AABox;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<AABox> {
        let min = Vector3.decode(r, ctx)?;
        let max = Vector3.decode(r, ctx)?;
        Ok(AABox::new(min, max))
    }

    fn encode(&self, value: &AABox, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        Vector3.encode(&value.min, w, ctx)?;
        Vector3.encode(&value.max, w, ctx)
    }
}

impl Node for AssetId32 {
    type Value = AssetId;

    fn decode(&self, r: &mut Reader<'_>, _ctx: &Context<'_>) -> Result<AssetId> {
        Ok(AssetId(r.read_u32()?))
    }

    fn encode(&self, value: &AssetId, w: &mut Writer, _ctx: &Context<'_>) -> Result<()> {
        w.write_u32(value.0)
    }
}
