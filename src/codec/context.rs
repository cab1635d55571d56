//! Decode/encode context: a chain of nested scopes.
//!
//! Every composite pushes a scope onto the chain. Scopes record the integer
//! fields later siblings depend on (flags, counts), and lookups walk from the
//! innermost scope outwards. Document-level state (version, flags, material
//! set 0) lives in a [`Root`] reachable from any scope in constant time, and
//! the surface header that selects a vertex layout is found through
//! [`Context::nearest_header`] instead of by name.

use smallvec::SmallVec;

use super::node::Node;
use super::options::CodecOptions;
use super::reader::Reader;
use super::writer::Writer;
use crate::model::{Material, SurfaceHeader};
use crate::util::{Error, Result};

/// Document-level state visible to every scope.
#[derive(Clone, Copy, Debug)]
pub struct Root<'a> {
    version: u32,
    flags: u32,
    materials: Option<&'a [Material]>,
    options: &'a CodecOptions,
}

impl<'a> Root<'a> {
    /// Root state known right after the fixed header.
    pub fn new(version: u32, flags: u32, options: &'a CodecOptions) -> Self {
        Self { version, flags, materials: None, options }
    }

    /// Same root, with material set 0 available for vertex layout resolution.
    pub fn with_materials<'b>(&self, materials: &'b [Material]) -> Root<'b>
    where
        'a: 'b,
    {
        Root {
            version: self.version,
            flags: self.flags,
            materials: Some(materials),
            options: self.options,
        }
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Check whether all bits of `mask` are set in the model flags.
    #[inline]
    pub fn has_flag(&self, mask: u32) -> bool {
        self.flags & mask == mask
    }

    #[inline]
    pub fn options(&self) -> &'a CodecOptions {
        self.options
    }

    /// Materials of material set 0.
    pub fn materials(&self) -> Result<&'a [Material]> {
        self.materials.ok_or(Error::FieldNotFound("material_sets"))
    }

    /// Material of set 0 by index.
    pub fn material(&self, index: u32) -> Result<&'a Material> {
        let materials = self.materials()?;
        materials.get(index as usize).ok_or(Error::MaterialIndex {
            index,
            count: materials.len(),
        })
    }
}

/// One scope in the context chain.
pub struct Context<'a> {
    root: &'a Root<'a>,
    parent: Option<&'a Context<'a>>,
    name: &'static str,
    index: Option<usize>,
    values: SmallVec<[(&'static str, u32); 4]>,
    header: Option<&'a SurfaceHeader>,
}

impl<'a> Context<'a> {
    /// Outermost scope of a document.
    pub fn new(root: &'a Root<'a>) -> Self {
        Self {
            root,
            parent: None,
            name: "cmdl",
            index: None,
            values: SmallVec::new(),
            header: None,
        }
    }

    fn scope<'b>(&'b self, name: &'static str, index: Option<usize>) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            root: self.root,
            parent: Some(self),
            name,
            index,
            values: SmallVec::new(),
            header: None,
        }
    }

    /// Named child scope.
    pub fn child<'b>(&'b self, name: &'static str) -> Context<'b>
    where
        'a: 'b,
    {
        self.scope(name, None)
    }

    /// Named, indexed child scope (`name[index]`).
    pub fn item<'b>(&'b self, name: &'static str, index: usize) -> Context<'b>
    where
        'a: 'b,
    {
        self.scope(name, Some(index))
    }

    /// Anonymous child scope for an array element (`[index]` on the parent's segment).
    pub fn element<'b>(&'b self, index: usize) -> Context<'b>
    where
        'a: 'b,
    {
        self.scope("", Some(index))
    }

    /// Anonymous child scope for a record's own fields.
    pub fn record<'b>(&'b self) -> Context<'b>
    where
        'a: 'b,
    {
        self.scope("", None)
    }

    /// Child scope carrying a surface header.
    pub fn with_header<'b>(&'b self, header: &'b SurfaceHeader) -> Context<'b>
    where
        'a: 'b,
    {
        let mut scope = self.scope("", None);
        scope.header = Some(header);
        scope
    }

    /// Document root.
    #[inline]
    pub fn root(&self) -> &'a Root<'a> {
        self.root
    }

    /// Record a field value in this scope.
    pub fn set(&mut self, name: &'static str, value: u32) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Resolve a field by name, searching this scope then each ancestor.
    ///
    /// A miss is a schema mistake, never a property of the input data.
    pub fn lookup(&self, name: &'static str) -> Result<u32> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if let Some((_, value)) = s.values.iter().find(|(n, _)| *n == name) {
                return Ok(*value);
            }
            scope = s.parent;
        }
        Err(Error::FieldNotFound(name))
    }

    /// Innermost scope that carries a surface header.
    pub fn nearest_header(&self) -> Result<&'a SurfaceHeader> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if let Some(header) = s.header {
                return Ok(header);
            }
            scope = s.parent;
        }
        Err(Error::FieldNotFound("header"))
    }

    /// Material governing the vertex layout of the enclosing surface.
    pub fn material(&self) -> Result<&'a Material> {
        let header = self.nearest_header()?;
        self.root.material(header.material_index)
    }

    /// Chain of composite names from the document root to this scope.
    pub fn path(&self) -> String {
        let mut chain = Vec::new();
        let mut scope = Some(self);
        while let Some(s) = scope {
            chain.push(s);
            scope = s.parent;
        }

        let mut out = String::new();
        for s in chain.iter().rev() {
            if !s.name.is_empty() {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(s.name);
            }
            if let Some(index) = s.index {
                out.push_str(&format!("[{}]", index));
            }
        }
        out
    }

    /// Tag an error with this scope's path.
    pub fn attach(&self, err: Error) -> Error {
        err.at(|| self.path())
    }

    /// Decode a named field in its own child scope.
    pub fn decode_field<N: Node>(&self, name: &'static str, node: &N, r: &mut Reader<'_>) -> Result<N::Value> {
        let scope = self.child(name);
        node.decode(r, &scope).map_err(|e| scope.attach(e))
    }

    /// Encode a named field in its own child scope.
    pub fn encode_field<N: Node>(
        &self,
        name: &'static str,
        node: &N,
        value: &N::Value,
        w: &mut Writer,
    ) -> Result<()> {
        let scope = self.child(name);
        node.encode(value, w, &scope).map_err(|e| scope.attach(e))
    }
}
