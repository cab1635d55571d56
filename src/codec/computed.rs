//! Computed u32 fields: counts and sizes rebuilt from the live structure.
//!
//! Decode and encode are deliberately asymmetric. `decode` returns the value
//! found in the stream, which is informational only; `encode` never sees a
//! stored value and writes whatever the caller derived from the model.
//! `verify` applies the configured stale-field policy once the derived value
//! is known on the decode side.

use super::context::Context;
use super::reader::Reader;
use super::writer::Writer;
use crate::util::{Error, Result};

/// A stored-looking u32 field whose authoritative value is derived.
#[derive(Clone, Copy, Debug)]
pub struct Computed {
    name: &'static str,
}

impl Computed {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Consume the placeholder and return the stored value.
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<u32> {
        r.read_u32()
    }

    /// Compare a stored value with the value derived from decoded data.
    pub fn verify(&self, stored: u32, derived: usize, ctx: &Context<'_>) -> Result<()> {
        ctx.root()
            .options()
            .check_computed(self.name, stored as u64, derived as u64)
    }

    /// Write the derived value.
    pub fn encode(&self, derived: usize, w: &mut Writer) -> Result<()> {
        let value = u32::try_from(derived).map_err(|_| Error::ValueOutOfRange {
            value: derived as u64,
            width: 4,
        })?;
        tracing::trace!("{} = {}", self.name, value);
        w.write_u32(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::context::Root;
    use crate::codec::options::CodecOptions;

    const COUNT: Computed = Computed::new("material_count");

    #[test]
    fn test_encode_ignores_stored() {
        let mut w = Writer::new();
        COUNT.encode(3, &mut w).unwrap();
        assert_eq!(w.as_bytes(), &[0, 0, 0, 3]);
    }

    #[test]
    fn test_verify_policy() {
        let data = 7u32.to_be_bytes();
        let mut r = Reader::new(&data);
        let stored = COUNT.decode(&mut r).unwrap();
        assert_eq!(stored, 7);

        let strict = CodecOptions::default();
        let root = Root::new(2, 0, &strict);
        let ctx = Context::new(&root);
        assert!(COUNT.verify(stored, 7, &ctx).is_ok());
        assert!(matches!(
            COUNT.verify(stored, 2, &ctx),
            Err(Error::StaleComputedField { field: "material_count", stored: 7, derived: 2 })
        ));

        let lenient = CodecOptions::default().lenient();
        let root = Root::new(2, 0, &lenient);
        let ctx = Context::new(&root);
        assert!(COUNT.verify(stored, 2, &ctx).is_ok());
    }

    #[test]
    fn test_encode_overflow() {
        if usize::BITS > 32 {
            let mut w = Writer::new();
            let err = COUNT.encode((u32::MAX as u64 + 1) as usize, &mut w).unwrap_err();
            assert!(matches!(err, Error::ValueOutOfRange { width: 4, .. }));
        }
    }
}
