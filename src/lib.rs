//! typebridge: typed values across a scripting boundary
//!
//! A host application keeps its data in a closed, strongly-typed model
//! ([`typebridge_types::Value`]). An embedded scripting runtime sees the same
//! data as dynamic values ([`Dynamic`]): nil, booleans, numbers, strings,
//! tables and userdata. This crate converts between the two.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  reflect   - one Reflector per domain type   │
//! │  format    - named formats, option schemas   │
//! ├──────────────────────────────────────────────┤
//! │  engine    - Registry, Context, Variant,     │
//! │              member dispatch, cycle guard    │
//! │  dump      - TypeSchema + fingerprints       │
//! ├──────────────────────────────────────────────┤
//! │  typebridge-types  (domain value model)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every reflector registers itself at startup with
//! `inventory::submit!(Registration(factory))`; [`Registry::global`] collects
//! them once. A [`Context`] borrows a registry and a format table and carries
//! the per-call state: the cycle guard and the nesting depth.
//!
//! ```
//! use typebridge::{Context, Dynamic};
//! use typebridge_types::Value;
//!
//! let ctx = Context::global();
//! let pushed = ctx.push_variant(Value::Bool(true)).unwrap();
//! assert!(matches!(pushed, Dynamic::Bool(true)));
//! assert_eq!(ctx.pull_variant(&Dynamic::Number(2.0)).unwrap(), Value::Double(2.0));
//! ```

pub mod config;
pub mod dump;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod format;
pub mod reflect;

pub use config::{ConfigError, Limits};
pub use dump::{SchemaHash, TypeRef, TypeSchema};
pub use dynamic::{Dynamic, Table, UserData};
pub use engine::{Args, Context, Reflector, Registration, Registry, RegistryBuilder, VARIANT};
pub use error::{Direction, ReflectError, Result};
pub use format::{Format, FormatError, FormatRegistration, Formats, FormatsBuilder};
