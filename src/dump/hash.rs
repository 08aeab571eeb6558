//! Structural fingerprints for schemas.
//!
//! A schema hash covers structure only: member names, their types and
//! operator signatures. The schema's own name, category and summary are
//! documentation and are left out, so two reflectors with the same shape
//! share a fingerprint. Named type references hash the referenced name.

use sha2::{Digest, Sha256};

use super::{FunctionSchema, TypeRef, TypeSchema};

/// A 256-bit schema fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaHash([u8; 32]);

impl SchemaHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First eight bytes as hex, for compact listings.
    pub fn short(&self) -> String {
        self.0[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Builder feeding tagged, length-prefixed parts into SHA-256.
pub struct SchemaHasher {
    hasher: Sha256,
}

impl SchemaHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.hasher.update([tag]);
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.hasher.update((s.len() as u32).to_le_bytes());
        self.hasher.update(s.as_bytes());
        self
    }

    pub fn child(mut self, hash: &SchemaHash) -> Self {
        self.hasher.update(hash.as_bytes());
        self
    }

    pub fn count(mut self, n: usize) -> Self {
        self.hasher.update((n as u32).to_le_bytes());
        self
    }

    pub fn finish(self) -> SchemaHash {
        let result = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        SchemaHash(bytes)
    }
}

impl Default for SchemaHasher {
    fn default() -> Self {
        Self::new()
    }
}

const TAG_ANY: u8 = 0x01;
const TAG_NIL: u8 = 0x02;
const TAG_BOOL: u8 = 0x03;
const TAG_NUMBER: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_NAMED: u8 = 0x10;
const TAG_ARRAY: u8 = 0x11;
const TAG_DICTIONARY: u8 = 0x12;
const TAG_OPTIONAL: u8 = 0x13;
const TAG_OR: u8 = 0x14;
const TAG_STRUCT: u8 = 0x15;
const TAG_TUPLE: u8 = 0x16;
const TAG_FUNCTION: u8 = 0x20;
const TAG_SCHEMA: u8 = 0x30;
const TAG_NONE: u8 = 0x00;

impl TypeRef {
    pub fn hash(&self) -> SchemaHash {
        let h = SchemaHasher::new();
        let h = match self {
            TypeRef::Any => h.tag(TAG_ANY),
            TypeRef::Nil => h.tag(TAG_NIL),
            TypeRef::Bool => h.tag(TAG_BOOL),
            TypeRef::Number => h.tag(TAG_NUMBER),
            TypeRef::String => h.tag(TAG_STRING),
            TypeRef::Named { name } => h.tag(TAG_NAMED).string(name),
            TypeRef::Array { element } => h.tag(TAG_ARRAY).child(&element.hash()),
            TypeRef::Dictionary { value } => h.tag(TAG_DICTIONARY).child(&value.hash()),
            TypeRef::Optional { inner } => h.tag(TAG_OPTIONAL).child(&inner.hash()),
            TypeRef::Or { options } => options
                .iter()
                .fold(h.tag(TAG_OR).count(options.len()), |h, o| h.child(&o.hash())),
            TypeRef::Struct { fields } => fields
                .iter()
                .fold(h.tag(TAG_STRUCT).count(fields.len()), |h, f| {
                    h.string(&f.name).child(&f.ty.hash())
                }),
            TypeRef::Tuple { elements } => elements
                .iter()
                .fold(h.tag(TAG_TUPLE).count(elements.len()), |h, e| {
                    h.child(&e.hash())
                }),
        };
        h.finish()
    }
}

impl FunctionSchema {
    pub fn hash(&self) -> SchemaHash {
        let mut h = SchemaHasher::new()
            .tag(TAG_FUNCTION)
            .count(self.params.len());
        for p in &self.params {
            h = h.child(&p.ty.hash());
        }
        h = h.count(self.returns.len());
        for r in &self.returns {
            h = h.child(&r.hash());
        }
        h.finish()
    }
}

impl TypeSchema {
    /// Structural fingerprint of the schema.
    pub fn hash(&self) -> SchemaHash {
        let mut h = SchemaHasher::new().tag(TAG_SCHEMA);
        h = match &self.underlying {
            Some(ty) => h.child(&ty.hash()),
            None => h.tag(TAG_NONE),
        };

        h = h.count(self.properties.len());
        for p in &self.properties {
            h = h
                .string(&p.name)
                .child(&p.ty.hash())
                .tag(p.read_only as u8);
        }

        h = h.count(self.methods.len());
        for m in &self.methods {
            h = h.string(&m.name).child(&m.hash());
        }

        h = h.count(self.constructors.len());
        for c in &self.constructors {
            h = h.string(&c.name).count(c.overloads.len());
            for overload in &c.overloads {
                h = h.child(&overload.hash());
            }
        }

        h = h.count(self.operators.len());
        for op in &self.operators {
            h = h.string(&op.op);
            h = match &op.operand {
                Some(rhs) => h.child(&rhs.hash()),
                None => h.tag(TAG_NONE),
            };
            h = h.child(&op.result.hash());
        }
        h.finish()
    }
}
