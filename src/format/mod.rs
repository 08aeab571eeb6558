//! Named formats and their option schemas.
//!
//! A format declares which options a [`FormatSelector`] may carry and which
//! types each option accepts. Selectors arriving from scripts are validated
//! against that table before the host sees them, see [`resolve`].

mod builtin;
mod resolve;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use thiserror::Error;
use tracing::debug;
use typebridge_types::{FormatSelector, Value};

use crate::engine::Context;
use crate::error::ReflectError;

pub use resolve::{resolve, serialize};

/// Encode a domain value under a resolved selector.
pub type EncodeFn = fn(&Context<'_>, &FormatSelector, &Value) -> Result<Vec<u8>, FormatError>;
/// Decode bytes under a resolved selector.
pub type DecodeFn = fn(&Context<'_>, &FormatSelector, &[u8]) -> Result<Value, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("format {format} cannot {operation}")]
    Unsupported {
        format: String,
        operation: &'static str,
    },

    #[error("format {format}: {reason}")]
    Malformed { format: String, reason: String },
}

impl FormatError {
    pub fn malformed(format: &str, reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            format: format.to_string(),
            reason: reason.into(),
        }
    }
}

/// A named format.
#[derive(Clone)]
pub struct Format {
    pub name: &'static str,
    pub media_types: &'static [&'static str],
    /// Declared options and the type names each accepts.
    pub options: &'static [(&'static str, &'static [&'static str])],
    /// Ignore undeclared option keys instead of rejecting them.
    pub allow_extra: bool,
    pub encode: Option<EncodeFn>,
    pub decode: Option<DecodeFn>,
}

impl Format {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            media_types: &[],
            options: &[],
            allow_extra: false,
            encode: None,
            decode: None,
        }
    }

    /// Accepted types for a declared option.
    pub fn accepts(&self, option: &str) -> Option<&'static [&'static str]> {
        self.options
            .iter()
            .find(|(name, _)| *name == option)
            .map(|(_, types)| *types)
    }

    pub fn encode(
        &self,
        ctx: &Context<'_>,
        selector: &FormatSelector,
        value: &Value,
    ) -> Result<Vec<u8>, FormatError> {
        let encode = self.encode.ok_or_else(|| FormatError::Unsupported {
            format: self.name.to_string(),
            operation: "encode",
        })?;
        encode(ctx, selector, value)
    }

    pub fn decode(
        &self,
        ctx: &Context<'_>,
        selector: &FormatSelector,
        bytes: &[u8],
    ) -> Result<Value, FormatError> {
        let decode = self.decode.ok_or_else(|| FormatError::Unsupported {
            format: self.name.to_string(),
            operation: "decode",
        })?;
        decode(ctx, selector, bytes)
    }
}

impl std::fmt::Debug for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("allow_extra", &self.allow_extra)
            .finish()
    }
}

/// Factory submitted by a format module.
pub struct FormatRegistration(pub fn() -> Format);

inventory::collect!(FormatRegistration);

static GLOBAL: LazyLock<Formats> = LazyLock::new(|| {
    let mut builder = FormatsBuilder::new();
    for registration in inventory::iter::<FormatRegistration> {
        builder = builder.register(registration.0);
    }
    match builder.build() {
        Ok(formats) => formats,
        Err(e) => panic!("global format registry: {e}"),
    }
});

/// Immutable table of formats, keyed by name.
#[derive(Debug, Default)]
pub struct Formats {
    formats: BTreeMap<&'static str, Format>,
}

impl Formats {
    pub fn builder() -> FormatsBuilder {
        FormatsBuilder::new()
    }

    pub fn global() -> &'static Formats {
        &GLOBAL
    }

    pub fn lookup(&self, name: &str) -> Option<&Format> {
        self.formats.get(name)
    }

    pub fn get(&self, name: &str) -> Result<&Format, ReflectError> {
        self.lookup(name)
            .ok_or_else(|| ReflectError::UnknownFormat(name.to_string()))
    }

    pub fn all(&self) -> impl Iterator<Item = &Format> {
        self.formats.values()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

#[derive(Default)]
pub struct FormatsBuilder {
    factories: Vec<fn() -> Format>,
}

impl FormatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, factory: fn() -> Format) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn build(self) -> Result<Formats, ReflectError> {
        let mut formats = BTreeMap::new();
        for factory in self.factories {
            let format = factory();
            let name = format.name;
            if formats.insert(name, format).is_some() {
                return Err(ReflectError::DuplicateType(name.to_string()));
            }
        }
        debug!(count = formats.len(), "built format registry");
        Ok(Formats { formats })
    }
}
